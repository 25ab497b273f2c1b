use db::models::provider::NewProvider;
use serde_json::{Map, Value};

use super::{
    enum_field, optional_bool, optional_i32, optional_string, required_string, timestamp_or_now,
};
use crate::error::Error;

/// Credential fields pass through as the legacy store held them; the
/// re-encryption step in the pipeline normalizes them before persistence.
pub fn provider(fields: Map<String, Value>) -> Result<NewProvider, Error> {
    let protocol = required_string(&fields, "protocol")?;
    Ok(NewProvider {
        name: required_string(&fields, "id")?,
        protocol: enum_field("protocol", &protocol)?,
        host: required_string(&fields, "host")?,
        port: optional_i32(&fields, "port")?,
        username: optional_string(&fields, "username"),
        password: optional_string(&fields, "password"),
        encrypted: optional_bool(&fields, "encrypted"),
        global_connection_limit: optional_i32(&fields, "globalConnectionLimit")?,
        private_key: optional_string(&fields, "privateKey"),
        cm_key_id: optional_string(&fields, "cmKeyId"),
        certificate_uri: optional_string(&fields, "certificateUri"),
        created_at: timestamp_or_now(&fields, "createdAt")?,
        updated_at: timestamp_or_now(&fields, "updatedAt")?,
    })
}
