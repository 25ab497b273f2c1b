use db::{
    entities::rule,
    models::{ids, rule::Rule},
};
use legacy::LegacyStore;
use sea_orm::ConnectionTrait;
use serde_json::Value;

use super::{classify, log_progress, next_record, observe, string_key};
use crate::{
    error::Error, resolve::FkResolver, schema::rule_schema, summary::EntitySummary, transform,
};

pub async fn migrate_rule_record<C: ConnectionTrait>(
    db: &C,
    raw: &Value,
) -> Result<rule::Model, Error> {
    let fields = rule_schema().validate(raw)?;
    let draft = transform::rule(fields)?;

    let resolver = FkResolver::new(db, "rules");
    let collection_id = resolver.collection(draft.collection_ref.as_ref()).await?;
    let provider_id = resolver.provider(draft.provider_ref.as_deref()).await?;

    if ids::rule_id_by_name(db, &draft.name).await?.is_some() {
        return Err(Error::RecordAlreadyMigrated(draft.name));
    }

    let record = draft.into_new_rule(collection_id, provider_id);
    Ok(Rule::create(db, &record).await?)
}

pub async fn migrate_rules<C: ConnectionTrait>(
    store: &dyn LegacyStore,
    db: &C,
    table: &str,
    logging_interval: u64,
) -> Result<EntitySummary, Error> {
    let mut cursor = store.scan(table).await?;
    let mut summary = EntitySummary::default();

    while let Some(record) = next_record("rule", cursor.as_mut(), &mut summary).await? {
        let key = string_key(&record, "name");
        let outcome = classify(&key, migrate_rule_record(db, &record).await);
        observe("rule", &outcome, &mut summary);
        log_progress("rule", &summary, logging_interval);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use legacy::MemoryStore;
    use sea_orm::{Database, EntityTrait, PaginatorTrait};
    use sea_orm_migration::MigratorTrait;
    use serde_json::json;

    use super::*;
    use crate::migrate::{migrate_collection_record, migrate_provider_record};
    use secrets::{KeyCipher, Reencryptor};

    const TABLE: &str = "legacy-rules";

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_dependencies(db: &sea_orm::DatabaseConnection) {
        migrate_collection_record(
            db,
            &json!({
                "name": "MOD09GQ",
                "version": "006",
                "granuleId": "^MOD09GQ\\..*$",
                "granuleIdExtraction": "(MOD09GQ\\..*)",
                "sampleFileName": "MOD09GQ.hdf",
                "files": [],
            }),
        )
        .await
        .unwrap();

        let kms = Reencryptor::new(
            KeyCipher::from_passphrase("catalog-credentials", "target passphrase"),
            None,
        );
        migrate_provider_record(
            db,
            &kms,
            &json!({ "id": "modis-sftp", "protocol": "sftp", "host": "data.example.com" }),
        )
        .await
        .unwrap();
    }

    fn valid_rule(name: &str) -> Value {
        json!({
            "name": name,
            "workflow": "IngestGranule",
            "state": "ENABLED",
            "rule": { "type": "onetime" },
            "collection": { "name": "MOD09GQ", "version": "006" },
            "provider": "modis-sftp",
        })
    }

    #[tokio::test]
    async fn resolves_foreign_keys_to_surrogate_ids() {
        let db = setup_db().await;
        seed_dependencies(&db).await;

        let stored = migrate_rule_record(&db, &valid_rule("daily-ingest"))
            .await
            .unwrap();
        assert!(stored.collection_id.is_some());
        assert!(stored.provider_id.is_some());
        assert!(stored.enabled);
    }

    #[tokio::test]
    async fn unresolvable_reference_fails_the_record() {
        let db = setup_db().await;
        // No collections migrated yet.
        let err = migrate_rule_record(&db, &valid_rule("too-early"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RecordDoesNotExist(_)));
    }

    #[tokio::test]
    async fn reference_free_rule_migrates_with_null_fks() {
        let db = setup_db().await;
        let stored = migrate_rule_record(
            &db,
            &json!({
                "name": "standalone",
                "workflow": "CleanupWorkflow",
                "state": "DISABLED",
                "rule": { "type": "scheduled", "value": "rate(1 hour)" },
            }),
        )
        .await
        .unwrap();
        assert_eq!(stored.collection_id, None);
        assert_eq!(stored.provider_id, None);
        assert!(!stored.enabled);
    }

    #[tokio::test]
    async fn one_valid_one_invalid_yields_one_row() {
        let db = setup_db().await;
        seed_dependencies(&db).await;

        let mut invalid = valid_rule("broken");
        invalid.as_object_mut().unwrap().remove("workflow");
        let store =
            MemoryStore::new().with_table(TABLE, vec![valid_rule("daily-ingest"), invalid]);

        let summary = migrate_rules(&store, &db, TABLE, 0).await.unwrap();
        assert_eq!(
            summary,
            EntitySummary {
                read: 2,
                success: 1,
                skipped: 0,
                failed: 1
            }
        );
        assert_eq!(rule::Entity::find().count(&db).await.unwrap(), 1);
    }
}
