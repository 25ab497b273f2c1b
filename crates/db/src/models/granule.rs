use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::entities::granule;

/// Granule ingest is handled by an external discovery pipeline; this model
/// exists so execution bookkeeping (the association table and its cleanup)
/// has rows to reference.
pub struct Granule;

impl Granule {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        granule_id: &str,
        collection_id: Option<i64>,
    ) -> Result<granule::Model, DbErr> {
        let now = Utc::now();
        let active = granule::ActiveModel {
            granule_id: Set(granule_id.to_string()),
            status: Set(None),
            collection_id: Set(collection_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn find_by_granule_id<C: ConnectionTrait>(
        db: &C,
        granule_id: &str,
    ) -> Result<Option<granule::Model>, DbErr> {
        granule::Entity::find()
            .filter(granule::Column::GranuleId.eq(granule_id))
            .one(db)
            .await
    }
}
