use db::models::collection::NewCollection;
use serde_json::{Map, Value};

use super::{
    enum_field, optional_bool, optional_json, optional_string, required_string, timestamp_or_now,
};
use crate::error::Error;

pub fn collection(fields: Map<String, Value>) -> Result<NewCollection, Error> {
    let duplicate_handling = required_string(&fields, "duplicateHandling")?;
    Ok(NewCollection {
        name: required_string(&fields, "name")?,
        version: required_string(&fields, "version")?,
        process: optional_string(&fields, "process"),
        url_path: optional_string(&fields, "url_path"),
        duplicate_handling: enum_field("duplicateHandling", &duplicate_handling)?,
        granule_id_validation_regex: required_string(&fields, "granuleId")?,
        granule_id_extraction_regex: required_string(&fields, "granuleIdExtraction")?,
        files: fields
            .get("files")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        report_to_ems: optional_bool(&fields, "reportToEms").unwrap_or(true),
        sample_file_name: required_string(&fields, "sampleFileName")?,
        ignore_files_config_for_discovery: optional_bool(&fields, "ignoreFilesConfigForDiscovery"),
        meta: optional_json(&fields, "meta"),
        tags: optional_json(&fields, "tags"),
        created_at: timestamp_or_now(&fields, "createdAt")?,
        updated_at: timestamp_or_now(&fields, "updatedAt")?,
    })
}
