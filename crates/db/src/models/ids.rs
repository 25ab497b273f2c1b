//! Natural key → surrogate id lookups.
//!
//! Foreign keys between migrated tables use the autoincrement `id`
//! columns; callers hold only the business identifiers (arn, name,
//! name+version), so every cross-entity reference goes through one of
//! these resolvers.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};

use crate::entities::{async_operation, collection, execution, granule, provider, rule};

pub async fn collection_id_by_name_version<C: ConnectionTrait>(
    db: &C,
    name: &str,
    version: &str,
) -> Result<Option<i64>, DbErr> {
    collection::Entity::find()
        .select_only()
        .column(collection::Column::Id)
        .filter(collection::Column::Name.eq(name))
        .filter(collection::Column::Version.eq(version))
        .into_tuple()
        .one(db)
        .await
}

pub async fn provider_id_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<i64>, DbErr> {
    provider::Entity::find()
        .select_only()
        .column(provider::Column::Id)
        .filter(provider::Column::Name.eq(name))
        .into_tuple()
        .one(db)
        .await
}

pub async fn async_operation_id_by_external_id<C: ConnectionTrait>(
    db: &C,
    external_id: &str,
) -> Result<Option<i64>, DbErr> {
    async_operation::Entity::find()
        .select_only()
        .column(async_operation::Column::Id)
        .filter(async_operation::Column::ExternalId.eq(external_id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn rule_id_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<i64>, DbErr> {
    rule::Entity::find()
        .select_only()
        .column(rule::Column::Id)
        .filter(rule::Column::Name.eq(name))
        .into_tuple()
        .one(db)
        .await
}

pub async fn execution_id_by_arn<C: ConnectionTrait>(
    db: &C,
    arn: &str,
) -> Result<Option<i64>, DbErr> {
    execution::Entity::find()
        .select_only()
        .column(execution::Column::Id)
        .filter(execution::Column::Arn.eq(arn))
        .into_tuple()
        .one(db)
        .await
}

pub async fn granule_id_by_granule_id<C: ConnectionTrait>(
    db: &C,
    granule_id: &str,
) -> Result<Option<i64>, DbErr> {
    granule::Entity::find()
        .select_only()
        .column(granule::Column::Id)
        .filter(granule::Column::GranuleId.eq(granule_id))
        .into_tuple()
        .one(db)
        .await
}
