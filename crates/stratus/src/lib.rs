//! Entry point for a one-shot catalog migration run.

use std::collections::HashMap;

use db::{DbErr, DbService};
use legacy::JsonlStore;
use migrator::{MigrationSummary, RunConfig, run_migration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StratusError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Migration(#[from] migrator::Error),
}

/// Runs a full migration. Entries in `env_overrides` win over process
/// environment. The relational session is released on every exit path;
/// failing to obtain it at all is the one error that aborts the run
/// before any record is touched.
pub async fn run(
    env_overrides: HashMap<String, String>,
) -> Result<MigrationSummary, StratusError> {
    let config = RunConfig::from_env(&env_overrides)?;

    let service = DbService::connect(&config.database_url).await?;
    let store = JsonlStore::new(&config.legacy_data_dir);
    let kms = config.reencryptor();

    let result = run_migration(&service.conn, &store, &kms, &config).await;
    if let Err(err) = service.close().await {
        tracing::warn!(error = %err, "Failed to close the relational session cleanly");
    }

    Ok(result?)
}
