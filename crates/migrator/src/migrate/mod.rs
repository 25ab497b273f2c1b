//! Per-entity migration orchestrators.
//!
//! Each orchestrator drives the legacy cursor one record at a time,
//! classifies every outcome, and keeps going: a single bad record is a
//! counter and a log line, never the end of the run.

use legacy::{LegacyCursor, LegacyStoreError};
use serde_json::Value;

use crate::{error::Error, summary::EntitySummary};

mod async_operations;
mod collections;
mod executions;
mod providers;
mod rules;

pub use async_operations::{migrate_async_operation_record, migrate_async_operations};
pub use collections::{migrate_collection_record, migrate_collections};
pub use executions::migrate_executions;
pub use providers::{migrate_provider_record, migrate_providers};
pub use rules::{migrate_rule_record, migrate_rules};

/// Classified result of one record's trip through the pipeline.
#[derive(Debug)]
pub enum RecordOutcome {
    Success,
    Skipped { key: String },
    Failed { key: String, reason: Error },
}

pub(crate) fn classify<T>(key: &str, result: Result<T, Error>) -> RecordOutcome {
    match result {
        Ok(_) => RecordOutcome::Success,
        Err(Error::RecordAlreadyMigrated(key)) => RecordOutcome::Skipped { key },
        Err(reason) => RecordOutcome::Failed {
            key: key.to_string(),
            reason,
        },
    }
}

pub(crate) fn observe(entity: &'static str, outcome: &RecordOutcome, summary: &mut EntitySummary) {
    match outcome {
        RecordOutcome::Success => summary.success += 1,
        RecordOutcome::Skipped { key } => {
            summary.skipped += 1;
            tracing::info!(entity, key = %key, "Record already migrated; skipping");
        }
        RecordOutcome::Failed { key, reason } => {
            summary.failed += 1;
            tracing::error!(entity, key = %key, error = %reason, "Record migration failed");
        }
    }
}

/// Pulls the next record off the cursor, counting it as read. A malformed
/// record is classified as a failure and the scan continues; any other
/// cursor error aborts the entity's run.
pub(crate) async fn next_record(
    entity: &'static str,
    cursor: &mut dyn LegacyCursor,
    summary: &mut EntitySummary,
) -> Result<Option<Value>, Error> {
    loop {
        match cursor.peek().await {
            Ok(None) => return Ok(None),
            Ok(Some(value)) => {
                let record = value.clone();
                cursor.advance().await?;
                summary.read += 1;
                return Ok(Some(record));
            }
            Err(LegacyStoreError::MalformedRecord { table, line, source }) => {
                summary.read += 1;
                summary.failed += 1;
                tracing::error!(
                    entity,
                    table = %table,
                    line,
                    error = %source,
                    "Skipping malformed legacy record"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
}

pub(crate) fn log_progress(entity: &'static str, summary: &EntitySummary, interval: u64) {
    if interval > 0 && summary.read % interval == 0 {
        tracing::info!(
            entity,
            read = summary.read,
            success = summary.success,
            skipped = summary.skipped,
            failed = summary.failed,
            "Migration progress"
        );
    }
}

pub(crate) fn string_key(record: &Value, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string()
}
