use db::{
    entities::async_operation,
    models::{async_operation::AsyncOperation, ids},
};
use legacy::LegacyStore;
use sea_orm::ConnectionTrait;
use serde_json::Value;

use super::{classify, log_progress, next_record, observe, string_key};
use crate::{error::Error, schema::async_operation_schema, summary::EntitySummary, transform};

pub async fn migrate_async_operation_record<C: ConnectionTrait>(
    db: &C,
    raw: &Value,
) -> Result<async_operation::Model, Error> {
    let fields = async_operation_schema().validate(raw)?;
    let record = transform::async_operation(fields)?;

    if ids::async_operation_id_by_external_id(db, &record.external_id)
        .await?
        .is_some()
    {
        return Err(Error::RecordAlreadyMigrated(record.external_id));
    }

    Ok(AsyncOperation::create(db, &record).await?)
}

pub async fn migrate_async_operations<C: ConnectionTrait>(
    store: &dyn LegacyStore,
    db: &C,
    table: &str,
    logging_interval: u64,
) -> Result<EntitySummary, Error> {
    let mut cursor = store.scan(table).await?;
    let mut summary = EntitySummary::default();

    while let Some(record) = next_record("async_operation", cursor.as_mut(), &mut summary).await? {
        let key = string_key(&record, "id");
        let outcome = classify(&key, migrate_async_operation_record(db, &record).await);
        observe("async_operation", &outcome, &mut summary);
        log_progress("async_operation", &summary, logging_interval);
    }

    Ok(summary)
}
