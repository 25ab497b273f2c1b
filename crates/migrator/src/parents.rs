//! Single-record execution pipeline, including ancestor resolution.
//!
//! An execution referencing an unmigrated parent cannot be written until
//! the whole ancestor chain exists, so the chain is walked up through the
//! legacy store and persisted top-down. The walk is an explicit worklist
//! with a visited set keyed by arn: an ancestry cycle (corrupt data —
//! the workflow engine can only produce acyclic parentage) becomes a
//! classified failure instead of an unbounded walk.

use std::collections::HashSet;

use db::{
    entities::execution,
    models::{execution::Execution, ids},
};
use legacy::LegacyStore;
use sea_orm::ConnectionTrait;
use serde_json::Value;

use crate::{
    error::Error,
    resolve::FkResolver,
    schema::execution_schema,
    transform::{self, ExecutionDraft},
};

pub struct ExecutionMigrator<'a, C> {
    db: &'a C,
    store: &'a dyn LegacyStore,
    table: &'a str,
}

impl<'a, C: ConnectionTrait> ExecutionMigrator<'a, C> {
    pub fn new(db: &'a C, store: &'a dyn LegacyStore, table: &'a str) -> Self {
        Self { db, store, table }
    }

    /// Runs the full pipeline for one legacy execution record, migrating
    /// any unmigrated ancestors first.
    pub async fn migrate_record(&self, raw: &Value) -> Result<execution::Model, Error> {
        let draft = prepare(raw)?;

        let mut visited = HashSet::new();
        visited.insert(draft.arn.clone());

        let parent_id = match draft.parent_arn.as_deref() {
            None => None,
            Some(parent_arn) => Some(self.ensure_ancestor(parent_arn, &mut visited).await?),
        };

        self.persist(draft, parent_id).await
    }

    /// Returns the surrogate id of `arn`, migrating it (and transitively
    /// its own ancestors) from the legacy store when necessary.
    async fn ensure_ancestor(
        &self,
        arn: &str,
        visited: &mut HashSet<String>,
    ) -> Result<i64, Error> {
        // Unmigrated ancestors, child-to-root order.
        let mut chain: Vec<ExecutionDraft> = Vec::new();
        // Surrogate id of the first already-migrated ancestor, if the walk
        // reached one before running out of parents.
        let mut anchor: Option<i64> = None;

        let mut next = Some(arn.to_string());
        while let Some(current) = next {
            if let Some(id) = ids::execution_id_by_arn(self.db, &current).await? {
                anchor = Some(id);
                break;
            }
            if !visited.insert(current.clone()) {
                return Err(Error::Cycle(current));
            }
            let raw = self
                .store
                .fetch(self.table, "arn", &current)
                .await?
                .ok_or_else(|| {
                    Error::RecordDoesNotExist(format!(
                        "Parent execution '{current}' does not exist in the legacy store"
                    ))
                })?;
            let draft = prepare(&raw)?;
            next = draft.parent_arn.clone();
            chain.push(draft);
        }

        let mut parent_id = anchor;
        for draft in chain.into_iter().rev() {
            tracing::debug!(arn = %draft.arn, "Migrating unmigrated ancestor execution");
            let model = self.persist(draft, parent_id).await?;
            parent_id = Some(model.id);
        }

        parent_id.ok_or_else(|| {
            Error::RecordDoesNotExist(format!("Parent execution '{arn}' could not be resolved"))
        })
    }

    /// Resolves the remaining references and writes the row, honoring the
    /// one-time-migration conflict rule: an existing row is only replaced
    /// when the incoming record is strictly newer.
    async fn persist(
        &self,
        draft: ExecutionDraft,
        parent_id: Option<i64>,
    ) -> Result<execution::Model, Error> {
        let resolver = FkResolver::new(self.db, "executions");
        let collection_id = resolver.collection(draft.collection_ref.as_ref()).await?;
        let async_operation_id = resolver
            .async_operation(draft.async_operation_ref.as_deref())
            .await?;

        if let Some(existing) = Execution::find_by_arn(self.db, &draft.arn).await? {
            if draft.updated_at <= existing.updated_at {
                return Err(Error::RecordAlreadyMigrated(draft.arn));
            }
        }

        let record = draft.into_new_execution(parent_id, collection_id, async_operation_id);
        Ok(Execution::upsert(self.db, &record, false).await?)
    }
}

fn prepare(raw: &Value) -> Result<ExecutionDraft, Error> {
    let fields = execution_schema().validate(raw)?;
    transform::execution(fields)
}

#[cfg(test)]
mod tests {
    use legacy::MemoryStore;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;
    use serde_json::json;

    use super::*;

    const TABLE: &str = "legacy-executions";

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn record(arn: &str, parent: Option<&str>) -> Value {
        let mut value = json!({
            "arn": arn,
            "status": "completed",
            "type": "IngestGranule",
            "createdAt": 1_609_459_200_000_i64,
            "updatedAt": 1_609_459_200_000_i64,
        });
        if let Some(parent) = parent {
            value["parentArn"] = json!(parent);
        }
        value
    }

    #[tokio::test]
    async fn leaf_migration_creates_whole_ancestor_chain() {
        let db = setup_db().await;
        let store = MemoryStore::new().with_table(
            TABLE,
            vec![
                record("arn:root", None),
                record("arn:middle", Some("arn:root")),
            ],
        );
        let migrator = ExecutionMigrator::new(&db, &store, TABLE);

        let leaf = migrator
            .migrate_record(&record("arn:leaf", Some("arn:middle")))
            .await
            .unwrap();

        let root = Execution::find_by_arn(&db, "arn:root").await.unwrap().unwrap();
        let middle = Execution::find_by_arn(&db, "arn:middle")
            .await
            .unwrap()
            .unwrap();

        // Depth 2 ancestry: three rows, each child pointing at its
        // immediate parent, not the root.
        assert_eq!(root.parent_id, None);
        assert_eq!(middle.parent_id, Some(root.id));
        assert_eq!(leaf.parent_id, Some(middle.id));
    }

    #[tokio::test]
    async fn already_migrated_parent_is_reused() {
        let db = setup_db().await;
        let store = MemoryStore::new().with_table(TABLE, vec![record("arn:parent", None)]);
        let migrator = ExecutionMigrator::new(&db, &store, TABLE);

        let parent = migrator.migrate_record(&record("arn:parent", None)).await.unwrap();
        let child = migrator
            .migrate_record(&record("arn:child", Some("arn:parent")))
            .await
            .unwrap();

        assert_eq!(child.parent_id, Some(parent.id));
    }

    #[tokio::test]
    async fn missing_parent_fails_the_child() {
        let db = setup_db().await;
        let store = MemoryStore::new().with_table(TABLE, vec![]);
        let migrator = ExecutionMigrator::new(&db, &store, TABLE);

        let err = migrator
            .migrate_record(&record("arn:orphan", Some("arn:gone")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RecordDoesNotExist(_)));
        assert!(
            Execution::find_by_arn(&db, "arn:orphan")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn invalid_parent_fails_the_child() {
        let db = setup_db().await;
        // Parent is missing its required status.
        let store = MemoryStore::new().with_table(TABLE, vec![json!({ "arn": "arn:parent" })]);
        let migrator = ExecutionMigrator::new(&db, &store, TABLE);

        let err = migrator
            .migrate_record(&record("arn:child", Some("arn:parent")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SchemaValidation { .. }));
        assert!(
            Execution::find_by_arn(&db, "arn:child")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn ancestry_cycle_is_reported_not_walked_forever() {
        let db = setup_db().await;
        let store = MemoryStore::new().with_table(
            TABLE,
            vec![
                record("arn:a", Some("arn:b")),
                record("arn:b", Some("arn:a")),
            ],
        );
        let migrator = ExecutionMigrator::new(&db, &store, TABLE);

        let err = migrator
            .migrate_record(&record("arn:a", Some("arn:b")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cycle(_)));
        assert!(Execution::find_by_arn(&db, "arn:a").await.unwrap().is_none());
        assert!(Execution::find_by_arn(&db, "arn:b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn re_migration_skips_unless_strictly_newer() {
        let db = setup_db().await;
        let store = MemoryStore::new().with_table(TABLE, vec![]);
        let migrator = ExecutionMigrator::new(&db, &store, TABLE);

        migrator.migrate_record(&record("arn:same", None)).await.unwrap();

        // Same updated_at: skip signal, row untouched.
        let err = migrator
            .migrate_record(&record("arn:same", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RecordAlreadyMigrated(_)));

        // Strictly newer updated_at: last-writer-wins refresh.
        let mut newer = record("arn:same", None);
        newer["updatedAt"] = json!(1_609_459_300_000_i64);
        newer["status"] = json!("failed");
        migrator.migrate_record(&newer).await.unwrap();

        let stored = Execution::find_by_arn(&db, "arn:same").await.unwrap().unwrap();
        assert_eq!(stored.status, db::types::ExecutionStatus::Failed);
    }
}
