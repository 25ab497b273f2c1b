use legacy::LegacyStore;
use sea_orm::ConnectionTrait;
use secrets::Reencryptor;

use crate::{
    config::RunConfig,
    error::Error,
    migrate::{
        migrate_async_operations, migrate_collections, migrate_executions, migrate_providers,
        migrate_rules,
    },
    summary::MigrationSummary,
};

/// Drives a full migration in dependency order: collections and providers
/// first (rules reference them), then async operations, rules, and finally
/// executions (which reference collections, async operations, and each
/// other).
pub async fn run_migration<C: ConnectionTrait>(
    db: &C,
    store: &dyn LegacyStore,
    kms: &Reencryptor,
    config: &RunConfig,
) -> Result<MigrationSummary, Error> {
    let interval = config.logging_interval;

    tracing::info!("Starting catalog migration");
    let collections =
        migrate_collections(store, db, &config.collections_table, interval).await?;
    tracing::info!(%collections, "Collections done");

    let providers =
        migrate_providers(store, db, kms, &config.providers_table, interval).await?;
    tracing::info!(%providers, "Providers done");

    let async_operations =
        migrate_async_operations(store, db, &config.async_operations_table, interval).await?;
    tracing::info!(%async_operations, "Async operations done");

    let rules = migrate_rules(store, db, &config.rules_table, interval).await?;
    tracing::info!(%rules, "Rules done");

    let executions = migrate_executions(store, db, &config.executions_table, interval).await?;
    tracing::info!(%executions, "Executions done");

    Ok(MigrationSummary {
        collections,
        providers,
        async_operations,
        rules,
        executions,
    })
}
