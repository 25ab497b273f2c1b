use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JsonValue, QueryFilter,
    Set,
};

use crate::{entities::rule, types::RuleType};

/// Insert record for a rule. The optional foreign keys are surrogate ids
/// resolved by the pipeline; a legacy reference that cannot be resolved
/// never reaches this layer.
#[derive(Debug, Clone)]
pub struct NewRule {
    pub name: String,
    pub workflow: String,
    pub enabled: bool,
    pub rule_type: RuleType,
    pub value: Option<String>,
    pub arn: Option<String>,
    pub log_event_arn: Option<String>,
    pub execution_name_prefix: Option<String>,
    pub payload: Option<JsonValue>,
    pub meta: Option<JsonValue>,
    pub tags: Option<JsonValue>,
    pub queue_url: Option<String>,
    pub collection_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Rule;

impl Rule {
    pub async fn create<C: ConnectionTrait>(db: &C, data: &NewRule) -> Result<rule::Model, DbErr> {
        let active = rule::ActiveModel {
            name: Set(data.name.clone()),
            workflow: Set(data.workflow.clone()),
            enabled: Set(data.enabled),
            rule_type: Set(data.rule_type),
            value: Set(data.value.clone()),
            arn: Set(data.arn.clone()),
            log_event_arn: Set(data.log_event_arn.clone()),
            execution_name_prefix: Set(data.execution_name_prefix.clone()),
            payload: Set(data.payload.clone()),
            meta: Set(data.meta.clone()),
            tags: Set(data.tags.clone()),
            queue_url: Set(data.queue_url.clone()),
            collection_id: Set(data.collection_id),
            provider_id: Set(data.provider_id),
            created_at: Set(data.created_at.into()),
            updated_at: Set(data.updated_at.into()),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<rule::Model>, DbErr> {
        rule::Entity::find()
            .filter(rule::Column::Name.eq(name))
            .one(db)
            .await
    }
}
