//! Declared per-entity schemas for raw legacy records.
//!
//! The legacy store enforced nothing, so every record is validated once at
//! the pipeline boundary: required fields present, declared types match,
//! declared defaults filled, unrecognized attributes dropped. Later stages
//! only ever see the declared shape.

use serde_json::{Map, Value, json};

use crate::error::{Error, Violation, ViolationKind, ViolationList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Number,
    Object,
    Array,
    /// Date-like value: epoch milliseconds or an RFC 3339 string. The
    /// transformer coerces both to a timestamp.
    Timestamp,
    /// Free-form payloads the legacy store never constrained.
    Any,
}

impl FieldKind {
    fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Any => "any",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Number => value.is_number(),
            FieldKind::Object => value.is_object(),
            FieldKind::Array => value.is_array(),
            FieldKind::Timestamp => value.is_number() || value.is_string(),
            FieldKind::Any => true,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
}

fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
        default: None,
    }
}

fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
        default: None,
    }
}

fn with_default(name: &'static str, kind: FieldKind, default: Value) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
        default: Some(default),
    }
}

#[derive(Debug, Clone)]
pub struct RecordSchema {
    pub entity: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Applies the schema: declared defaults fill absent optional fields,
    /// a `null` counts as absent, and only declared fields survive into
    /// the output. All violations are collected before failing.
    pub fn validate(&self, record: &Value) -> Result<Map<String, Value>, Error> {
        let Some(source) = record.as_object() else {
            return Err(Error::SchemaValidation {
                entity: self.entity,
                violations: ViolationList(vec![Violation {
                    field: "$".to_string(),
                    problem: ViolationKind::WrongType {
                        expected: "object",
                        found: type_name(record),
                    },
                }]),
            });
        };

        let mut output = Map::new();
        let mut violations = Vec::new();

        for spec in &self.fields {
            match source.get(spec.name) {
                Some(value) if !value.is_null() => {
                    if spec.kind.matches(value) {
                        output.insert(spec.name.to_string(), value.clone());
                    } else {
                        violations.push(Violation {
                            field: spec.name.to_string(),
                            problem: ViolationKind::WrongType {
                                expected: spec.kind.name(),
                                found: type_name(value),
                            },
                        });
                    }
                }
                _ => {
                    if let Some(default) = &spec.default {
                        output.insert(spec.name.to_string(), default.clone());
                    } else if spec.required {
                        violations.push(Violation {
                            field: spec.name.to_string(),
                            problem: ViolationKind::MissingRequired,
                        });
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(output)
        } else {
            Err(Error::SchemaValidation {
                entity: self.entity,
                violations: ViolationList(violations),
            })
        }
    }
}

pub fn collection_schema() -> RecordSchema {
    RecordSchema {
        entity: "collection",
        fields: vec![
            required("name", FieldKind::String),
            required("version", FieldKind::String),
            optional("process", FieldKind::String),
            optional("url_path", FieldKind::String),
            with_default("duplicateHandling", FieldKind::String, json!("error")),
            required("granuleId", FieldKind::String),
            required("granuleIdExtraction", FieldKind::String),
            required("sampleFileName", FieldKind::String),
            required("files", FieldKind::Array),
            with_default("reportToEms", FieldKind::Boolean, json!(true)),
            optional("ignoreFilesConfigForDiscovery", FieldKind::Boolean),
            optional("meta", FieldKind::Object),
            optional("tags", FieldKind::Array),
            optional("createdAt", FieldKind::Timestamp),
            optional("updatedAt", FieldKind::Timestamp),
        ],
    }
}

pub fn provider_schema() -> RecordSchema {
    RecordSchema {
        entity: "provider",
        fields: vec![
            required("id", FieldKind::String),
            with_default("protocol", FieldKind::String, json!("http")),
            required("host", FieldKind::String),
            optional("port", FieldKind::Integer),
            optional("username", FieldKind::String),
            optional("password", FieldKind::String),
            optional("encrypted", FieldKind::Boolean),
            optional("globalConnectionLimit", FieldKind::Integer),
            optional("privateKey", FieldKind::String),
            optional("cmKeyId", FieldKind::String),
            optional("certificateUri", FieldKind::String),
            optional("createdAt", FieldKind::Timestamp),
            optional("updatedAt", FieldKind::Timestamp),
        ],
    }
}

pub fn async_operation_schema() -> RecordSchema {
    RecordSchema {
        entity: "async operation",
        fields: vec![
            required("id", FieldKind::String),
            required("description", FieldKind::String),
            required("operationType", FieldKind::String),
            required("status", FieldKind::String),
            optional("output", FieldKind::String),
            optional("taskArn", FieldKind::String),
            optional("createdAt", FieldKind::Timestamp),
            optional("updatedAt", FieldKind::Timestamp),
        ],
    }
}

pub fn rule_schema() -> RecordSchema {
    RecordSchema {
        entity: "rule",
        fields: vec![
            required("name", FieldKind::String),
            required("workflow", FieldKind::String),
            with_default("state", FieldKind::String, json!("ENABLED")),
            required("rule", FieldKind::Object),
            optional("collection", FieldKind::Object),
            optional("provider", FieldKind::String),
            optional("executionNamePrefix", FieldKind::String),
            optional("logEventArn", FieldKind::String),
            optional("payload", FieldKind::Any),
            optional("meta", FieldKind::Object),
            optional("tags", FieldKind::Array),
            optional("queueUrl", FieldKind::String),
            optional("createdAt", FieldKind::Timestamp),
            optional("updatedAt", FieldKind::Timestamp),
        ],
    }
}

pub fn execution_schema() -> RecordSchema {
    RecordSchema {
        entity: "execution",
        fields: vec![
            required("arn", FieldKind::String),
            required("status", FieldKind::String),
            optional("name", FieldKind::String),
            optional("execution", FieldKind::String),
            optional("type", FieldKind::String),
            optional("error", FieldKind::Object),
            optional("tasks", FieldKind::Object),
            optional("originalPayload", FieldKind::Any),
            optional("finalPayload", FieldKind::Any),
            optional("duration", FieldKind::Number),
            optional("platformVersion", FieldKind::String),
            optional("timestamp", FieldKind::Timestamp),
            optional("parentArn", FieldKind::String),
            optional("collectionId", FieldKind::String),
            optional("asyncOperationId", FieldKind::String),
            optional("createdAt", FieldKind::Timestamp),
            optional("updatedAt", FieldKind::Timestamp),
        ],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ViolationKind;

    #[test]
    fn fills_defaults_and_drops_unrecognized_fields() {
        let record = json!({
            "name": "MOD09GQ",
            "version": "006",
            "granuleId": "^MOD09GQ\\..*$",
            "granuleIdExtraction": "(MOD09GQ\\..*)",
            "sampleFileName": "MOD09GQ.A2017025.h21v00.006.hdf",
            "files": [{ "regex": "^.*\\.hdf$" }],
            "dataType": "only-in-the-legacy-store",
        });

        let fields = collection_schema().validate(&record).unwrap();
        assert_eq!(fields["duplicateHandling"], json!("error"));
        assert_eq!(fields["reportToEms"], json!(true));
        assert!(!fields.contains_key("dataType"));
        assert!(!fields.contains_key("meta"));
    }

    #[test]
    fn collects_all_violations() {
        let record = json!({
            "version": "006",
            "granuleId": 42,
            "granuleIdExtraction": "(MOD09GQ\\..*)",
            "files": [],
        });

        let err = collection_schema().validate(&record).unwrap_err();
        let Error::SchemaValidation { entity, violations } = err else {
            panic!("expected schema validation error");
        };
        assert_eq!(entity, "collection");
        assert!(violations.0.contains(&crate::error::Violation {
            field: "name".to_string(),
            problem: ViolationKind::MissingRequired,
        }));
        assert!(violations.0.contains(&crate::error::Violation {
            field: "granuleId".to_string(),
            problem: ViolationKind::WrongType {
                expected: "string",
                found: "number",
            },
        }));
        assert!(violations.0.contains(&crate::error::Violation {
            field: "sampleFileName".to_string(),
            problem: ViolationKind::MissingRequired,
        }));
    }

    #[test]
    fn null_counts_as_absent() {
        let record = json!({
            "id": "prov-1",
            "host": "data.example.com",
            "port": null,
            "username": null,
        });

        let fields = provider_schema().validate(&record).unwrap();
        assert!(!fields.contains_key("port"));
        assert!(!fields.contains_key("username"));
        assert_eq!(fields["protocol"], json!("http"));
    }

    #[test]
    fn non_object_record_is_rejected() {
        let err = rule_schema().validate(&json!(["not", "a", "rule"])).unwrap_err();
        assert!(matches!(err, Error::SchemaValidation { .. }));
    }
}
