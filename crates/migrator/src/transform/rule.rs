use chrono::{DateTime, Utc};
use db::{models::rule::NewRule, types::RuleType};
use serde_json::{Map, Value};

use super::{enum_field, optional_json, optional_string, required_string, timestamp_or_now};
use crate::error::Error;

/// Rule with its legacy references still as natural keys. The resolver
/// turns them into surrogate ids (or fails the record).
#[derive(Debug, Clone)]
pub struct RuleDraft {
    pub name: String,
    pub workflow: String,
    pub enabled: bool,
    pub rule_type: RuleType,
    pub value: Option<String>,
    pub arn: Option<String>,
    pub log_event_arn: Option<String>,
    pub execution_name_prefix: Option<String>,
    pub payload: Option<Value>,
    pub meta: Option<Value>,
    pub tags: Option<Value>,
    pub queue_url: Option<String>,
    pub collection_ref: Option<(String, String)>,
    pub provider_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RuleDraft {
    pub fn into_new_rule(self, collection_id: Option<i64>, provider_id: Option<i64>) -> NewRule {
        NewRule {
            name: self.name,
            workflow: self.workflow,
            enabled: self.enabled,
            rule_type: self.rule_type,
            value: self.value,
            arn: self.arn,
            log_event_arn: self.log_event_arn,
            execution_name_prefix: self.execution_name_prefix,
            payload: self.payload,
            meta: self.meta,
            tags: self.tags,
            queue_url: self.queue_url,
            collection_id,
            provider_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub fn rule(fields: Map<String, Value>) -> Result<RuleDraft, Error> {
    // The legacy trigger lives in a nested `rule` object: { type, value, arn }.
    let trigger = fields
        .get("rule")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::InvalidField {
            field: "rule".to_string(),
            reason: "missing after validation".to_string(),
        })?;
    let trigger_type = trigger
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidField {
            field: "rule.type".to_string(),
            reason: "trigger type is required".to_string(),
        })?;

    let collection_ref = match fields.get("collection").and_then(Value::as_object) {
        None => None,
        Some(reference) => {
            let name = reference.get("name").and_then(Value::as_str);
            let version = reference.get("version").and_then(Value::as_str);
            match (name, version) {
                (Some(name), Some(version)) => Some((name.to_string(), version.to_string())),
                _ => {
                    return Err(Error::InvalidField {
                        field: "collection".to_string(),
                        reason: "reference needs both name and version".to_string(),
                    });
                }
            }
        }
    };

    let state = required_string(&fields, "state")?;

    Ok(RuleDraft {
        name: required_string(&fields, "name")?,
        workflow: required_string(&fields, "workflow")?,
        // Legacy tri-state: "ENABLED" means enabled, anything else does not.
        enabled: state == "ENABLED",
        rule_type: enum_field::<RuleType>("rule.type", trigger_type)?,
        value: trigger.get("value").and_then(Value::as_str).map(str::to_string),
        arn: trigger.get("arn").and_then(Value::as_str).map(str::to_string),
        log_event_arn: optional_string(&fields, "logEventArn"),
        execution_name_prefix: optional_string(&fields, "executionNamePrefix"),
        payload: optional_json(&fields, "payload"),
        meta: optional_json(&fields, "meta"),
        tags: optional_json(&fields, "tags"),
        queue_url: optional_string(&fields, "queueUrl"),
        collection_ref,
        provider_ref: optional_string(&fields, "provider"),
        created_at: timestamp_or_now(&fields, "createdAt")?,
        updated_at: timestamp_or_now(&fields, "updatedAt")?,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::rule_schema;

    fn transform(record: Value) -> Result<RuleDraft, Error> {
        rule(rule_schema().validate(&record).unwrap())
    }

    #[test]
    fn flattens_trigger_and_derives_enabled() {
        let draft = transform(json!({
            "name": "daily-ingest",
            "workflow": "IngestGranule",
            "state": "ENABLED",
            "rule": { "type": "scheduled", "value": "rate(1 day)" },
            "collection": { "name": "MOD09GQ", "version": "006" },
            "provider": "modis-sftp",
            "meta": { "retries": 3 },
        }))
        .unwrap();

        assert!(draft.enabled);
        assert_eq!(draft.rule_type, RuleType::Scheduled);
        assert_eq!(draft.value.as_deref(), Some("rate(1 day)"));
        assert_eq!(draft.arn, None);
        assert_eq!(
            draft.collection_ref,
            Some(("MOD09GQ".to_string(), "006".to_string()))
        );
        assert_eq!(draft.provider_ref.as_deref(), Some("modis-sftp"));
    }

    #[test]
    fn disabled_state_maps_to_false() {
        let draft = transform(json!({
            "name": "paused",
            "workflow": "IngestGranule",
            "state": "DISABLED",
            "rule": { "type": "onetime" },
        }))
        .unwrap();
        assert!(!draft.enabled);
        assert_eq!(draft.collection_ref, None);
        assert_eq!(draft.provider_ref, None);
    }

    #[test]
    fn trigger_without_type_is_rejected() {
        let err = transform(json!({
            "name": "broken",
            "workflow": "IngestGranule",
            "state": "ENABLED",
            "rule": { "value": "rate(1 day)" },
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));
    }

    #[test]
    fn partial_collection_reference_is_rejected() {
        let err = transform(json!({
            "name": "broken",
            "workflow": "IngestGranule",
            "state": "ENABLED",
            "rule": { "type": "onetime" },
            "collection": { "name": "MOD09GQ" },
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));
    }
}
