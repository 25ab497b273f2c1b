use std::str::FromStr;

use chrono::{DateTime, Utc};
use db::{models::execution::NewExecution, types::ExecutionStatus};
use serde_json::{Map, Value};

use super::{
    optional_f64, optional_json, optional_string, optional_timestamp, required_string,
    timestamp_or_now,
};
use crate::error::Error;

/// Separator the legacy store used inside a composite collection
/// reference ("<name>___<version>").
const COLLECTION_REF_SEPARATOR: &str = "___";

/// Execution with its references still as natural keys; the parent chain
/// resolver and FK resolver complete it.
#[derive(Debug, Clone)]
pub struct ExecutionDraft {
    pub arn: String,
    pub workflow_name: Option<String>,
    pub url: Option<String>,
    pub status: ExecutionStatus,
    pub original_payload: Option<Value>,
    pub final_payload: Option<Value>,
    pub error: Option<Value>,
    pub tasks: Option<Value>,
    pub duration: Option<f64>,
    pub platform_version: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub parent_arn: Option<String>,
    pub collection_ref: Option<(String, String)>,
    pub async_operation_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExecutionDraft {
    pub fn into_new_execution(
        self,
        parent_id: Option<i64>,
        collection_id: Option<i64>,
        async_operation_id: Option<i64>,
    ) -> NewExecution {
        NewExecution {
            arn: self.arn,
            workflow_name: self.workflow_name,
            url: self.url,
            status: self.status,
            original_payload: self.original_payload,
            final_payload: self.final_payload,
            error: self.error,
            tasks: self.tasks,
            duration: self.duration,
            platform_version: self.platform_version,
            timestamp: self.timestamp,
            parent_id,
            collection_id,
            async_operation_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub fn execution(fields: Map<String, Value>) -> Result<ExecutionDraft, Error> {
    let status = required_string(&fields, "status")?;

    let collection_ref = match optional_string(&fields, "collectionId") {
        None => None,
        Some(composite) => Some(split_collection_ref(&composite)?),
    };

    Ok(ExecutionDraft {
        arn: required_string(&fields, "arn")?,
        workflow_name: optional_string(&fields, "type"),
        url: optional_string(&fields, "execution"),
        // Statuses outside the closed set come out of old engine versions;
        // they map to Unknown rather than failing the record.
        status: ExecutionStatus::from_str(&status).unwrap_or(ExecutionStatus::Unknown),
        original_payload: optional_json(&fields, "originalPayload"),
        final_payload: optional_json(&fields, "finalPayload"),
        error: optional_json(&fields, "error"),
        tasks: optional_json(&fields, "tasks"),
        duration: optional_f64(&fields, "duration"),
        platform_version: optional_string(&fields, "platformVersion"),
        timestamp: optional_timestamp(&fields, "timestamp")?,
        parent_arn: optional_string(&fields, "parentArn"),
        collection_ref,
        async_operation_ref: optional_string(&fields, "asyncOperationId"),
        created_at: timestamp_or_now(&fields, "createdAt")?,
        updated_at: timestamp_or_now(&fields, "updatedAt")?,
    })
}

fn split_collection_ref(composite: &str) -> Result<(String, String), Error> {
    match composite.split_once(COLLECTION_REF_SEPARATOR) {
        Some((name, version)) if !name.is_empty() && !version.is_empty() => {
            Ok((name.to_string(), version.to_string()))
        }
        _ => Err(Error::InvalidField {
            field: "collectionId".to_string(),
            reason: format!("'{composite}' is not a <name>___<version> reference"),
        }),
    }
}
