use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JsonValue, QueryFilter,
    Set,
};

use crate::{entities::async_operation, types::AsyncOperationStatus};

#[derive(Debug, Clone)]
pub struct NewAsyncOperation {
    pub external_id: String,
    pub description: String,
    pub operation_type: String,
    pub status: AsyncOperationStatus,
    pub output: Option<JsonValue>,
    pub task_arn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct AsyncOperation;

impl AsyncOperation {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &NewAsyncOperation,
    ) -> Result<async_operation::Model, DbErr> {
        let active = async_operation::ActiveModel {
            external_id: Set(data.external_id.clone()),
            description: Set(data.description.clone()),
            operation_type: Set(data.operation_type.clone()),
            status: Set(data.status),
            output: Set(data.output.clone()),
            task_arn: Set(data.task_arn.clone()),
            created_at: Set(data.created_at.into()),
            updated_at: Set(data.updated_at.into()),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn find_by_external_id<C: ConnectionTrait>(
        db: &C,
        external_id: &str,
    ) -> Result<Option<async_operation::Model>, DbErr> {
        async_operation::Entity::find()
            .filter(async_operation::Column::ExternalId.eq(external_id))
            .one(db)
            .await
    }
}
