//! Read-side contract for the legacy schemaless key-value store.
//!
//! The migration engine consumes tables it does not own through two small
//! interfaces: a sequential cursor (`peek`/`advance`) that never
//! materializes a whole table, and a point lookup by natural key used when
//! an execution's ancestor has to be pulled in on demand.

use serde_json::Value;
use thiserror::Error;

mod jsonl;
mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum LegacyStoreError {
    #[error("Legacy table '{0}' is not available")]
    TableUnavailable(String),
    #[error("Malformed record in legacy table '{table}' at line {line}: {source}")]
    MalformedRecord {
        table: String,
        line: usize,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Sequential, memory-bounded enumerator over one legacy table.
///
/// `peek` exposes the next record without consuming it (None once the
/// table is exhausted); `advance` consumes it. Processing is strictly
/// one record at a time.
#[async_trait::async_trait]
pub trait LegacyCursor: Send + std::fmt::Debug {
    async fn peek(&mut self) -> Result<Option<&Value>, LegacyStoreError>;
    async fn advance(&mut self) -> Result<(), LegacyStoreError>;
}

#[async_trait::async_trait]
pub trait LegacyStore: Send + Sync {
    /// Opens a cursor over `table` positioned at the first record.
    async fn scan(&self, table: &str) -> Result<Box<dyn LegacyCursor>, LegacyStoreError>;

    /// Looks up a single record by its natural-key attribute.
    async fn fetch(
        &self,
        table: &str,
        key_field: &str,
        key: &str,
    ) -> Result<Option<Value>, LegacyStoreError>;
}
