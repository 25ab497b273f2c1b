use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JsonValue, QueryFilter,
    Set, TransactionSession, TransactionTrait,
};
use thiserror::Error;

use super::granule_execution::GranuleExecution;
use crate::{entities::execution, types::ExecutionStatus};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Execution not found")]
    NotFound,
    #[error("{field} must be a JSON object")]
    InvalidPayload { field: &'static str },
}

/// Full write record for an execution. Foreign keys are surrogate ids,
/// resolved by the caller before the write reaches this layer.
#[derive(Debug, Clone)]
pub struct NewExecution {
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
    pub timestamp: Option<DateTime<Utc>>,
    pub parent_id: Option<i64>,
    pub collection_id: Option<i64>,
    pub async_operation_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Execution;

impl Execution {
    pub async fn find_by_arn<C: ConnectionTrait>(
        db: &C,
        arn: &str,
    ) -> Result<Option<execution::Model>, DbErr> {
        execution::Entity::find()
            .filter(execution::Column::Arn.eq(arn))
            .one(db)
            .await
    }

    /// Idempotent, order-tolerant upsert keyed by arn.
    ///
    /// Workflow events are delivered at least once and out of order. With
    /// `write_constraints` enabled (the default for event consumers), a
    /// "running" record arriving after the stored row already reached a
    /// terminal status only refreshes the bookkeeping columns —
    /// `created_at`, `updated_at`, `timestamp`, `original_payload` — and
    /// leaves the terminal outcome untouched. Every other combination is a
    /// full last-writer-wins overwrite.
    pub async fn upsert<C: ConnectionTrait>(
        db: &C,
        data: &NewExecution,
        write_constraints: bool,
    ) -> Result<execution::Model, ExecutionError> {
        ensure_object_payload(&data.original_payload, "original_payload")?;
        ensure_object_payload(&data.final_payload, "final_payload")?;

        let existing = Self::find_by_arn(db, &data.arn).await?;
        let Some(existing) = existing else {
            return Ok(Self::insert(db, data).await?);
        };

        if write_constraints
            && data.status == ExecutionStatus::Running
            && existing.status.is_terminal()
        {
            tracing::debug!(
                arn = %data.arn,
                stored_status = %existing.status,
                "Late running event for terminal execution; applying constrained merge"
            );
            let mut active: execution::ActiveModel = existing.into();
            active.original_payload = Set(data.original_payload.clone());
            active.timestamp = Set(data.timestamp.map(Into::into));
            active.created_at = Set(data.created_at.into());
            active.updated_at = Set(data.updated_at.into());
            return Ok(active.update(db).await?);
        }

        let mut active: execution::ActiveModel = existing.into();
        active.workflow_name = Set(data.workflow_name.clone());
        active.url = Set(data.url.clone());
        active.status = Set(data.status);
        active.original_payload = Set(data.original_payload.clone());
        active.final_payload = Set(data.final_payload.clone());
        active.error = Set(data.error.clone());
        active.tasks = Set(data.tasks.clone());
        active.duration = Set(data.duration);
        active.platform_version = Set(data.platform_version.clone());
        active.timestamp = Set(data.timestamp.map(Into::into));
        active.parent_id = Set(data.parent_id);
        active.collection_id = Set(data.collection_id);
        active.async_operation_id = Set(data.async_operation_id);
        active.created_at = Set(data.created_at.into());
        active.updated_at = Set(data.updated_at.into());
        Ok(active.update(db).await?)
    }

    async fn insert<C: ConnectionTrait>(
        db: &C,
        data: &NewExecution,
    ) -> Result<execution::Model, DbErr> {
        let active = execution::ActiveModel {
            arn: Set(data.arn.clone()),
            workflow_name: Set(data.workflow_name.clone()),
            url: Set(data.url.clone()),
            status: Set(data.status),
            original_payload: Set(data.original_payload.clone()),
            final_payload: Set(data.final_payload.clone()),
            error: Set(data.error.clone()),
            tasks: Set(data.tasks.clone()),
            duration: Set(data.duration),
            platform_version: Set(data.platform_version.clone()),
            timestamp: Set(data.timestamp.map(Into::into)),
            parent_id: Set(data.parent_id),
            collection_id: Set(data.collection_id),
            async_operation_id: Set(data.async_operation_id),
            created_at: Set(data.created_at.into()),
            updated_at: Set(data.updated_at.into()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// Removes an execution and its granule associations as one atomic
    /// unit; either both disappear or neither does.
    pub async fn delete_by_arn<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        arn: &str,
    ) -> Result<(), ExecutionError> {
        let record = Self::find_by_arn(db, arn)
            .await?
            .ok_or(ExecutionError::NotFound)?;

        let txn = db.begin().await?;
        GranuleExecution::delete_by_execution(&txn, record.id).await?;
        execution::Entity::delete_by_id(record.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

fn ensure_object_payload(
    value: &Option<JsonValue>,
    field: &'static str,
) -> Result<(), ExecutionError> {
    match value {
        None => Ok(()),
        Some(JsonValue::Object(_)) => Ok(()),
        Some(_) => Err(ExecutionError::InvalidPayload { field }),
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;
    use serde_json::json;

    use super::*;
    use crate::models::granule::Granule;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    // Millisecond-precision base time; the legacy store carried epoch
    // millis, and sqlite roundtrips are only stable at that precision.
    fn base_time() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_609_459_200_000).unwrap()
    }

    fn base_record(arn: &str) -> NewExecution {
        let now = base_time();
        NewExecution {
            arn: arn.to_string(),
            workflow_name: Some("IngestGranule".to_string()),
            url: Some("https://console.example.com/executions/1".to_string()),
            status: ExecutionStatus::Completed,
            original_payload: Some(json!({ "original": "payload" })),
            final_payload: Some(json!({ "final": "payload" })),
            error: None,
            tasks: Some(json!({ "task1": { "key": "value" } })),
            duration: Some(120.5),
            platform_version: Some("9.0.0".to_string()),
            timestamp: Some(now),
            parent_id: None,
            collection_id: None,
            async_operation_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn upsert_inserts_when_no_row_exists() {
        let db = setup_db().await;
        let record = base_record("arn:states:execution:fresh");

        let stored = Execution::upsert(&db, &record, true).await.unwrap();
        assert_eq!(stored.arn, record.arn);
        assert_eq!(stored.status, ExecutionStatus::Completed);
        assert_eq!(stored.final_payload, record.final_payload);
    }

    #[tokio::test]
    async fn constrained_upsert_protects_terminal_outcome() {
        let db = setup_db().await;
        let completed = base_record("arn:states:execution:protected");
        Execution::upsert(&db, &completed, true).await.unwrap();

        let mut late_running = base_record("arn:states:execution:protected");
        late_running.status = ExecutionStatus::Running;
        late_running.workflow_name = Some("OtherWorkflow".to_string());
        late_running.url = Some("https://console.example.com/executions/2".to_string());
        late_running.original_payload = Some(json!({ "updatedOriginal": "payload" }));
        late_running.final_payload = None;
        late_running.tasks = None;
        late_running.duration = None;
        late_running.updated_at = base_time() + chrono::Duration::seconds(30);

        let stored = Execution::upsert(&db, &late_running, true).await.unwrap();

        // Terminal outcome and its fields survive the late running event.
        assert_eq!(stored.status, ExecutionStatus::Completed);
        assert_eq!(stored.workflow_name.as_deref(), Some("IngestGranule"));
        assert_eq!(
            stored.url.as_deref(),
            Some("https://console.example.com/executions/1")
        );
        assert_eq!(stored.final_payload, completed.final_payload);
        assert_eq!(stored.tasks, completed.tasks);
        assert_eq!(stored.duration, completed.duration);

        // The allow-listed columns do move forward.
        assert_eq!(
            stored.original_payload,
            Some(json!({ "updatedOriginal": "payload" }))
        );
        assert_eq!(stored.updated_at, late_running.updated_at);
    }

    #[tokio::test]
    async fn constrained_upsert_with_only_status_differing_changes_nothing() {
        let db = setup_db().await;
        let completed = base_record("arn:states:execution:noop");
        let before = Execution::upsert(&db, &completed, true).await.unwrap();

        let mut replay = completed.clone();
        replay.status = ExecutionStatus::Running;
        Execution::upsert(&db, &replay, true).await.unwrap();

        let after = Execution::find_by_arn(&db, &completed.arn)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn unconstrained_upsert_is_last_writer_wins() {
        let db = setup_db().await;
        let completed = base_record("arn:states:execution:overwrite");
        Execution::upsert(&db, &completed, true).await.unwrap();

        let mut replacement = base_record("arn:states:execution:overwrite");
        replacement.status = ExecutionStatus::Running;
        replacement.workflow_name = Some("OtherWorkflow".to_string());
        replacement.final_payload = None;
        replacement.tasks = None;

        let stored = Execution::upsert(&db, &replacement, false).await.unwrap();
        assert_eq!(stored.status, ExecutionStatus::Running);
        assert_eq!(stored.workflow_name.as_deref(), Some("OtherWorkflow"));
        assert_eq!(stored.final_payload, None);
        assert_eq!(stored.tasks, None);
    }

    #[tokio::test]
    async fn running_over_running_applies_fully_even_with_constraints() {
        let db = setup_db().await;
        let mut first = base_record("arn:states:execution:transient");
        first.status = ExecutionStatus::Running;
        first.final_payload = None;
        Execution::upsert(&db, &first, true).await.unwrap();

        let mut second = first.clone();
        second.workflow_name = Some("RetriedWorkflow".to_string());
        let stored = Execution::upsert(&db, &second, true).await.unwrap();
        assert_eq!(stored.workflow_name.as_deref(), Some("RetriedWorkflow"));
    }

    #[tokio::test]
    async fn array_payload_is_rejected_before_any_write() {
        let db = setup_db().await;
        let mut record = base_record("arn:states:execution:badpayload");
        record.original_payload = Some(json!(["not", "an", "object"]));

        let err = Execution::upsert(&db, &record, true).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::InvalidPayload {
                field: "original_payload"
            }
        ));
        assert!(
            Execution::find_by_arn(&db, &record.arn)
                .await
                .unwrap()
                .is_none()
        );

        // Same guard on the way into an existing row.
        let good = base_record("arn:states:execution:badpayload2");
        Execution::upsert(&db, &good, true).await.unwrap();
        let mut bad_update = good.clone();
        bad_update.final_payload = Some(json!([1, 2, 3]));
        let err = Execution::upsert(&db, &bad_update, false).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::InvalidPayload {
                field: "final_payload"
            }
        ));
        let stored = Execution::find_by_arn(&db, &good.arn)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.final_payload, good.final_payload);
    }

    #[tokio::test]
    async fn delete_removes_granule_links_atomically() {
        let db = setup_db().await;
        let record = base_record("arn:states:execution:todelete");
        let stored = Execution::upsert(&db, &record, true).await.unwrap();

        let granule_one = Granule::create(&db, "MOD09GQ.A2017025.h21v00.006.1", None)
            .await
            .unwrap();
        let granule_two = Granule::create(&db, "MOD09GQ.A2017025.h21v00.006.2", None)
            .await
            .unwrap();
        GranuleExecution::link(&db, granule_one.id, stored.id)
            .await
            .unwrap();
        GranuleExecution::link(&db, granule_two.id, stored.id)
            .await
            .unwrap();
        assert_eq!(
            GranuleExecution::count_by_execution(&db, stored.id)
                .await
                .unwrap(),
            2
        );

        Execution::delete_by_arn(&db, &record.arn).await.unwrap();

        assert!(
            Execution::find_by_arn(&db, &record.arn)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            GranuleExecution::count_by_execution(&db, stored.id)
                .await
                .unwrap(),
            0
        );

        let err = Execution::delete_by_arn(&db, &record.arn).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NotFound));
    }
}
