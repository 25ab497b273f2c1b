use std::collections::HashMap;
use std::path::PathBuf;

use secrets::{KeyCipher, LegacyKeyCipher, Reencryptor};

use crate::error::Error;

pub const DATABASE_URL: &str = "STRATUS_DATABASE_URL";
pub const LEGACY_DATA_DIR: &str = "STRATUS_LEGACY_DATA_DIR";
pub const COLLECTIONS_TABLE: &str = "STRATUS_COLLECTIONS_TABLE";
pub const PROVIDERS_TABLE: &str = "STRATUS_PROVIDERS_TABLE";
pub const ASYNC_OPERATIONS_TABLE: &str = "STRATUS_ASYNC_OPERATIONS_TABLE";
pub const RULES_TABLE: &str = "STRATUS_RULES_TABLE";
pub const EXECUTIONS_TABLE: &str = "STRATUS_EXECUTIONS_TABLE";
pub const CREDENTIAL_KEY_ID: &str = "STRATUS_CREDENTIAL_KEY_ID";
pub const CREDENTIAL_KEY: &str = "STRATUS_CREDENTIAL_KEY";
pub const LEGACY_CREDENTIAL_KEY: &str = "STRATUS_LEGACY_CREDENTIAL_KEY";
pub const LOGGING_INTERVAL: &str = "STRATUS_LOGGING_INTERVAL";

const DEFAULT_LOGGING_INTERVAL: u64 = 1000;

/// Environment-driven configuration for one migration run. Legacy table
/// names are required: the engine refuses to guess which tables to drain.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub database_url: String,
    pub legacy_data_dir: PathBuf,
    pub collections_table: String,
    pub providers_table: String,
    pub async_operations_table: String,
    pub rules_table: String,
    pub executions_table: String,
    pub credential_key_id: String,
    pub credential_key: String,
    pub legacy_credential_key: Option<String>,
    pub logging_interval: u64,
}

impl RunConfig {
    /// Builds the configuration from process environment with entries in
    /// `overrides` taking precedence.
    pub fn from_env(overrides: &HashMap<String, String>) -> Result<Self, Error> {
        let get = |name: &str| {
            overrides
                .get(name)
                .cloned()
                .or_else(|| std::env::var(name).ok())
                .filter(|value| !value.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or_else(|| Error::Config(name.to_string()));

        let logging_interval = match get(LOGGING_INTERVAL) {
            None => DEFAULT_LOGGING_INTERVAL,
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("{LOGGING_INTERVAL} must be an integer")))?,
        };

        Ok(RunConfig {
            database_url: require(DATABASE_URL)?,
            legacy_data_dir: PathBuf::from(require(LEGACY_DATA_DIR)?),
            collections_table: require(COLLECTIONS_TABLE)?,
            providers_table: require(PROVIDERS_TABLE)?,
            async_operations_table: require(ASYNC_OPERATIONS_TABLE)?,
            rules_table: require(RULES_TABLE)?,
            executions_table: require(EXECUTIONS_TABLE)?,
            credential_key_id: require(CREDENTIAL_KEY_ID)?,
            credential_key: require(CREDENTIAL_KEY)?,
            legacy_credential_key: get(LEGACY_CREDENTIAL_KEY),
            logging_interval,
        })
    }

    pub fn reencryptor(&self) -> Reencryptor {
        Reencryptor::new(
            KeyCipher::from_passphrase(&self.credential_key_id, &self.credential_key),
            self.legacy_credential_key
                .as_deref()
                .map(LegacyKeyCipher::from_passphrase),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_overrides() -> HashMap<String, String> {
        [
            (DATABASE_URL, "sqlite::memory:"),
            (LEGACY_DATA_DIR, "/var/data/legacy"),
            (COLLECTIONS_TABLE, "prod-CollectionsTable"),
            (PROVIDERS_TABLE, "prod-ProvidersTable"),
            (ASYNC_OPERATIONS_TABLE, "prod-AsyncOperationsTable"),
            (RULES_TABLE, "prod-RulesTable"),
            (EXECUTIONS_TABLE, "prod-ExecutionsTable"),
            (CREDENTIAL_KEY_ID, "catalog-credentials"),
            (CREDENTIAL_KEY, "target passphrase"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
    }

    #[test]
    fn overrides_satisfy_all_required_settings() {
        let config = RunConfig::from_env(&full_overrides()).unwrap();
        assert_eq!(config.collections_table, "prod-CollectionsTable");
        assert_eq!(config.logging_interval, DEFAULT_LOGGING_INTERVAL);
        assert_eq!(config.legacy_credential_key, None);
    }

    #[test]
    fn missing_required_setting_names_the_variable() {
        let mut overrides = full_overrides();
        overrides.remove(RULES_TABLE);
        // Keep the process env out of the picture for this variable.
        assert!(std::env::var(RULES_TABLE).is_err());

        let err = RunConfig::from_env(&overrides).unwrap_err();
        match err {
            Error::Config(name) => assert_eq!(name, RULES_TABLE),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn logging_interval_parses_or_fails_loudly() {
        let mut overrides = full_overrides();
        overrides.insert(LOGGING_INTERVAL.to_string(), "250".to_string());
        assert_eq!(
            RunConfig::from_env(&overrides).unwrap().logging_interval,
            250
        );

        overrides.insert(LOGGING_INTERVAL.to_string(), "often".to_string());
        assert!(matches!(
            RunConfig::from_env(&overrides).unwrap_err(),
            Error::Config(_)
        ));
    }
}
