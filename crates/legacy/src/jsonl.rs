use std::path::PathBuf;

use serde_json::Value;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader, Lines},
};

use crate::{LegacyCursor, LegacyStore, LegacyStoreError};

/// Legacy store exported as JSON-lines dumps: one `<table>.jsonl` file per
/// table, one record per line. Records stream through a buffered reader so
/// arbitrarily large tables never load into memory at once.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    data_dir: PathBuf,
}

impl JsonlStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{table}.jsonl"))
    }

    async fn open(&self, table: &str) -> Result<Lines<BufReader<File>>, LegacyStoreError> {
        let path = self.table_path(table);
        if !path.exists() {
            return Err(LegacyStoreError::TableUnavailable(table.to_string()));
        }
        let file = File::open(&path).await?;
        Ok(BufReader::new(file).lines())
    }
}

#[derive(Debug)]
struct JsonlCursor {
    table: String,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    peeked: Option<Value>,
    exhausted: bool,
}

impl JsonlCursor {
    async fn fill(&mut self) -> Result<(), LegacyStoreError> {
        while self.peeked.is_none() && !self.exhausted {
            match self.lines.next_line().await? {
                None => self.exhausted = true,
                Some(line) => {
                    self.line_number += 1;
                    if line.trim().is_empty() {
                        continue;
                    }
                    let record = serde_json::from_str(&line).map_err(|source| {
                        LegacyStoreError::MalformedRecord {
                            table: self.table.clone(),
                            line: self.line_number,
                            source,
                        }
                    })?;
                    self.peeked = Some(record);
                }
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LegacyCursor for JsonlCursor {
    async fn peek(&mut self) -> Result<Option<&Value>, LegacyStoreError> {
        self.fill().await?;
        Ok(self.peeked.as_ref())
    }

    async fn advance(&mut self) -> Result<(), LegacyStoreError> {
        self.fill().await?;
        self.peeked = None;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LegacyStore for JsonlStore {
    async fn scan(&self, table: &str) -> Result<Box<dyn LegacyCursor>, LegacyStoreError> {
        let lines = self.open(table).await?;
        Ok(Box::new(JsonlCursor {
            table: table.to_string(),
            lines,
            line_number: 0,
            peeked: None,
            exhausted: false,
        }))
    }

    async fn fetch(
        &self,
        table: &str,
        key_field: &str,
        key: &str,
    ) -> Result<Option<Value>, LegacyStoreError> {
        let mut cursor = self.scan(table).await?;
        while let Some(record) = cursor.peek().await? {
            if record.get(key_field).and_then(Value::as_str) == Some(key) {
                return Ok(Some(record.clone()));
            }
            cursor.advance().await?;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("legacy-jsonl-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn streams_records_in_file_order() {
        let dir = scratch_dir();
        std::fs::write(
            dir.join("rules.jsonl"),
            "{\"name\":\"rule-a\"}\n\n{\"name\":\"rule-b\"}\n",
        )
        .unwrap();

        let store = JsonlStore::new(&dir);
        let mut cursor = store.scan("rules").await.unwrap();
        assert_eq!(cursor.peek().await.unwrap().unwrap()["name"], "rule-a");
        cursor.advance().await.unwrap();
        assert_eq!(cursor.peek().await.unwrap().unwrap()["name"], "rule-b");
        cursor.advance().await.unwrap();
        assert!(cursor.peek().await.unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn malformed_line_reports_table_and_line() {
        let dir = scratch_dir();
        std::fs::write(
            dir.join("providers.jsonl"),
            "{\"id\":\"p1\"}\nnot-json\n",
        )
        .unwrap();

        let store = JsonlStore::new(&dir);
        let mut cursor = store.scan("providers").await.unwrap();
        assert!(cursor.peek().await.unwrap().is_some());
        cursor.advance().await.unwrap();
        let err = cursor.peek().await.unwrap_err();
        match err {
            LegacyStoreError::MalformedRecord { table, line, .. } => {
                assert_eq!(table, "providers");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn fetch_scans_without_loading_everything() {
        let dir = scratch_dir();
        let mut body = String::new();
        for index in 0..500 {
            body.push_str(&format!("{{\"arn\":\"arn:{index}\"}}\n"));
        }
        std::fs::write(dir.join("executions.jsonl"), body).unwrap();

        let store = JsonlStore::new(&dir);
        let found = store
            .fetch("executions", "arn", "arn:499")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["arn"], "arn:499");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
