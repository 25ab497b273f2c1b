use sea_orm::{JsonValue, entity::prelude::*};

use crate::types::RuleType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
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
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
