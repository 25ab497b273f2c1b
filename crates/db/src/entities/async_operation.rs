use sea_orm::{JsonValue, entity::prelude::*};

use crate::types::AsyncOperationStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "async_operations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// UUID assigned by the legacy store; the natural key.
    pub external_id: String,
    pub description: String,
    pub operation_type: String,
    pub status: AsyncOperationStatus,
    pub output: Option<JsonValue>,
    pub task_arn: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
