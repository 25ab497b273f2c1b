use db::{
    entities::provider,
    models::{
        ids,
        provider::{NewProvider, Provider},
    },
};
use legacy::LegacyStore;
use sea_orm::ConnectionTrait;
use secrets::Reencryptor;
use serde_json::Value;

use super::{classify, log_progress, next_record, observe, string_key};
use crate::{error::Error, schema::provider_schema, summary::EntitySummary, transform};

pub async fn migrate_provider_record<C: ConnectionTrait>(
    db: &C,
    kms: &Reencryptor,
    raw: &Value,
) -> Result<provider::Model, Error> {
    let fields = provider_schema().validate(raw)?;
    let mut record = transform::provider(fields)?;
    normalize_credentials(&mut record, kms)?;

    if ids::provider_id_by_name(db, &record.name).await?.is_some() {
        return Err(Error::RecordAlreadyMigrated(record.name));
    }

    Ok(Provider::create(db, &record).await?)
}

/// Re-encrypts any present credential to the target scheme. If either
/// credential went through encryption the provider is flagged encrypted
/// for both.
fn normalize_credentials(record: &mut NewProvider, kms: &Reencryptor) -> Result<(), Error> {
    let already_encrypted = record.encrypted.unwrap_or(false);
    let mut touched = false;

    if let Some(username) = record.username.take() {
        record.username = Some(kms.reencrypt(&username, already_encrypted)?);
        touched = true;
    }
    if let Some(password) = record.password.take() {
        record.password = Some(kms.reencrypt(&password, already_encrypted)?);
        touched = true;
    }
    if touched {
        record.encrypted = Some(true);
    }
    Ok(())
}

pub async fn migrate_providers<C: ConnectionTrait>(
    store: &dyn LegacyStore,
    db: &C,
    kms: &Reencryptor,
    table: &str,
    logging_interval: u64,
) -> Result<EntitySummary, Error> {
    let mut cursor = store.scan(table).await?;
    let mut summary = EntitySummary::default();

    while let Some(record) = next_record("provider", cursor.as_mut(), &mut summary).await? {
        let key = string_key(&record, "id");
        let outcome = classify(&key, migrate_provider_record(db, kms, &record).await);
        observe("provider", &outcome, &mut summary);
        log_progress("provider", &summary, logging_interval);
    }

    Ok(summary)
}
