use db::models::async_operation::NewAsyncOperation;
use serde_json::{Map, Value, json};

use super::{enum_field, optional_string, required_string, timestamp_or_now};
use crate::error::Error;

pub fn async_operation(fields: Map<String, Value>) -> Result<NewAsyncOperation, Error> {
    let status = required_string(&fields, "status")?;
    Ok(NewAsyncOperation {
        external_id: required_string(&fields, "id")?,
        description: required_string(&fields, "description")?,
        operation_type: required_string(&fields, "operationType")?,
        status: enum_field("status", &status)?,
        output: optional_string(&fields, "output").map(wrap_output),
        task_arn: optional_string(&fields, "taskArn"),
        created_at: timestamp_or_now(&fields, "createdAt")?,
        updated_at: timestamp_or_now(&fields, "updatedAt")?,
    })
}

/// The legacy store kept `output` as a serialized string of whatever the
/// job produced. The relational column is a JSON object, so the parsed
/// value (or the raw string when it is not valid JSON) is wrapped under an
/// `output` key.
fn wrap_output(raw: String) -> Value {
    let parsed = serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw));
    json!({ "output": parsed })
}
