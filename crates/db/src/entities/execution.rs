use sea_orm::{JsonValue, entity::prelude::*};

use crate::types::ExecutionStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "executions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub arn: String,
    pub workflow_name: Option<String>,
    pub url: Option<String>,
    pub status: ExecutionStatus,
    pub original_payload: Option<JsonValue>,
    pub final_payload: Option<JsonValue>,
    pub error: Option<JsonValue>,
    pub tasks: Option<JsonValue>,
    pub duration: Option<f64>,
    pub platform_version: Option<String>,
    pub timestamp: Option<DateTimeUtc>,
    pub parent_id: Option<i64>,
    pub collection_id: Option<i64>,
    pub async_operation_id: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
