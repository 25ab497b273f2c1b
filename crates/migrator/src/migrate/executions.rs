use legacy::LegacyStore;
use sea_orm::ConnectionTrait;

use super::{classify, log_progress, next_record, observe, string_key};
use crate::{error::Error, parents::ExecutionMigrator, summary::EntitySummary};

pub async fn migrate_executions<C: ConnectionTrait>(
    store: &dyn LegacyStore,
    db: &C,
    table: &str,
    logging_interval: u64,
) -> Result<EntitySummary, Error> {
    let mut cursor = store.scan(table).await?;
    let mut summary = EntitySummary::default();
    let migrator = ExecutionMigrator::new(db, store, table);

    while let Some(record) = next_record("execution", cursor.as_mut(), &mut summary).await? {
        let key = string_key(&record, "arn");
        let outcome = classify(&key, migrator.migrate_record(&record).await);
        observe("execution", &outcome, &mut summary);
        log_progress("execution", &summary, logging_interval);
    }

    Ok(summary)
}
