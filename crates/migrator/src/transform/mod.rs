//! Pure per-entity mappings from the validated legacy shape to the
//! relational shape. No store access happens here; natural-key references
//! come out as drafts for the resolver to turn into surrogate ids.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::Error;

mod async_operation;
mod collection;
mod execution;
mod provider;
mod rule;

pub use async_operation::async_operation;
pub use collection::collection;
pub use execution::{ExecutionDraft, execution};
pub use provider::provider;
pub use rule::{RuleDraft, rule};

pub(crate) fn required_string(fields: &Map<String, Value>, name: &'static str) -> Result<String, Error> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidField {
            field: name.to_string(),
            reason: "missing after validation".to_string(),
        })
}

pub(crate) fn optional_string(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn optional_bool(fields: &Map<String, Value>, name: &str) -> Option<bool> {
    fields.get(name).and_then(Value::as_bool)
}

pub(crate) fn optional_i32(fields: &Map<String, Value>, name: &'static str) -> Result<Option<i32>, Error> {
    match fields.get(name).and_then(Value::as_i64) {
        None => Ok(None),
        Some(value) => i32::try_from(value).map(Some).map_err(|_| Error::InvalidField {
            field: name.to_string(),
            reason: format!("{value} is out of range"),
        }),
    }
}

pub(crate) fn optional_f64(fields: &Map<String, Value>, name: &str) -> Option<f64> {
    fields.get(name).and_then(Value::as_f64)
}

pub(crate) fn optional_json(fields: &Map<String, Value>, name: &str) -> Option<Value> {
    fields.get(name).cloned()
}

/// Coerces a date-like legacy value — epoch milliseconds or an RFC 3339
/// string — to a timestamp.
pub(crate) fn optional_timestamp(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<DateTime<Utc>>, Error> {
    let Some(value) = fields.get(name) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis as i64))
            .and_then(|millis| DateTime::from_timestamp_millis(millis)),
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|fixed| fixed.with_timezone(&Utc)),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| Error::InvalidField {
        field: name.to_string(),
        reason: format!("'{value}' is not a valid timestamp"),
    })
}

pub(crate) fn timestamp_or_now(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<DateTime<Utc>, Error> {
    Ok(optional_timestamp(fields, name)?.unwrap_or_else(Utc::now))
}

pub(crate) fn enum_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, Error> {
    T::from_str(value).map_err(|_| Error::InvalidField {
        field: field.to_string(),
        reason: format!("unrecognized value '{value}'"),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn epoch_millis_and_rfc3339_both_coerce() {
        let map = fields(json!({
            "createdAt": 1_609_459_200_000_i64,
            "updatedAt": "2021-01-01T00:00:00Z",
        }));
        let created = optional_timestamp(&map, "createdAt").unwrap().unwrap();
        let updated = optional_timestamp(&map, "updatedAt").unwrap().unwrap();
        assert_eq!(created, updated);
    }

    #[test]
    fn unparseable_timestamp_is_an_invalid_field() {
        let map = fields(json!({ "createdAt": "last tuesday" }));
        assert!(matches!(
            optional_timestamp(&map, "createdAt").unwrap_err(),
            Error::InvalidField { .. }
        ));
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let map = fields(json!({}));
        let before = Utc::now();
        let value = timestamp_or_now(&map, "createdAt").unwrap();
        assert!(value >= before);
    }
}
