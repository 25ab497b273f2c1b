use std::collections::HashMap;

use serde_json::Value;

use crate::{LegacyCursor, LegacyStore, LegacyStoreError};

/// In-memory legacy store used by tests and local tooling.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str, records: Vec<Value>) -> Self {
        self.tables.insert(table.to_string(), records);
        self
    }

    pub fn insert(&mut self, table: &str, record: Value) {
        self.tables.entry(table.to_string()).or_default().push(record);
    }
}

#[derive(Debug)]
struct MemoryCursor {
    records: Vec<Value>,
    position: usize,
}

#[async_trait::async_trait]
impl LegacyCursor for MemoryCursor {
    async fn peek(&mut self) -> Result<Option<&Value>, LegacyStoreError> {
        Ok(self.records.get(self.position))
    }

    async fn advance(&mut self) -> Result<(), LegacyStoreError> {
        if self.position < self.records.len() {
            self.position += 1;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LegacyStore for MemoryStore {
    async fn scan(&self, table: &str) -> Result<Box<dyn LegacyCursor>, LegacyStoreError> {
        let records = self
            .tables
            .get(table)
            .ok_or_else(|| LegacyStoreError::TableUnavailable(table.to_string()))?
            .clone();
        Ok(Box::new(MemoryCursor {
            records,
            position: 0,
        }))
    }

    async fn fetch(
        &self,
        table: &str,
        key_field: &str,
        key: &str,
    ) -> Result<Option<Value>, LegacyStoreError> {
        let records = self
            .tables
            .get(table)
            .ok_or_else(|| LegacyStoreError::TableUnavailable(table.to_string()))?;
        Ok(records
            .iter()
            .find(|record| record.get(key_field).and_then(Value::as_str) == Some(key))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn peek_does_not_consume_and_advance_does() {
        let store = MemoryStore::new().with_table(
            "collections",
            vec![json!({ "name": "a" }), json!({ "name": "b" })],
        );

        let mut cursor = store.scan("collections").await.unwrap();
        assert_eq!(cursor.peek().await.unwrap().unwrap()["name"], "a");
        assert_eq!(cursor.peek().await.unwrap().unwrap()["name"], "a");
        cursor.advance().await.unwrap();
        assert_eq!(cursor.peek().await.unwrap().unwrap()["name"], "b");
        cursor.advance().await.unwrap();
        assert!(cursor.peek().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_finds_by_key_field() {
        let store = MemoryStore::new().with_table(
            "executions",
            vec![json!({ "arn": "arn:1" }), json!({ "arn": "arn:2" })],
        );

        let found = store.fetch("executions", "arn", "arn:2").await.unwrap();
        assert_eq!(found.unwrap()["arn"], "arn:2");
        assert!(
            store
                .fetch("executions", "arn", "arn:3")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn unknown_table_is_an_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.scan("missing").await.unwrap_err(),
            LegacyStoreError::TableUnavailable(_)
        ));
    }
}
