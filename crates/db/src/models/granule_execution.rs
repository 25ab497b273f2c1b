use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

use crate::entities::granule_execution;

pub struct GranuleExecution;

impl GranuleExecution {
    pub async fn link<C: ConnectionTrait>(
        db: &C,
        granule_id: i64,
        execution_id: i64,
    ) -> Result<granule_execution::Model, DbErr> {
        let active = granule_execution::ActiveModel {
            granule_id: Set(granule_id),
            execution_id: Set(execution_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn delete_by_execution<C: ConnectionTrait>(
        db: &C,
        execution_id: i64,
    ) -> Result<u64, DbErr> {
        let result = granule_execution::Entity::delete_many()
            .filter(granule_execution::Column::ExecutionId.eq(execution_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn count_by_execution<C: ConnectionTrait>(
        db: &C,
        execution_id: i64,
    ) -> Result<u64, DbErr> {
        granule_execution::Entity::find()
            .filter(granule_execution::Column::ExecutionId.eq(execution_id))
            .count(db)
            .await
    }
}
