use db::{
    entities::collection,
    models::{collection::Collection, ids},
};
use legacy::LegacyStore;
use sea_orm::ConnectionTrait;
use serde_json::Value;

use super::{classify, log_progress, next_record, observe, string_key};
use crate::{error::Error, schema::collection_schema, summary::EntitySummary, transform};

pub async fn migrate_collection_record<C: ConnectionTrait>(
    db: &C,
    raw: &Value,
) -> Result<collection::Model, Error> {
    let fields = collection_schema().validate(raw)?;
    let record = transform::collection(fields)?;

    if ids::collection_id_by_name_version(db, &record.name, &record.version)
        .await?
        .is_some()
    {
        return Err(Error::RecordAlreadyMigrated(format!(
            "{} {}",
            record.name, record.version
        )));
    }

    Ok(Collection::create(db, &record).await?)
}

pub async fn migrate_collections<C: ConnectionTrait>(
    store: &dyn LegacyStore,
    db: &C,
    table: &str,
    logging_interval: u64,
) -> Result<EntitySummary, Error> {
    let mut cursor = store.scan(table).await?;
    let mut summary = EntitySummary::default();

    while let Some(record) = next_record("collection", cursor.as_mut(), &mut summary).await? {
        let key = format!(
            "{} {}",
            string_key(&record, "name"),
            string_key(&record, "version")
        );
        let outcome = classify(&key, migrate_collection_record(db, &record).await);
        observe("collection", &outcome, &mut summary);
        log_progress("collection", &summary, logging_interval);
    }

    Ok(summary)
}
