//! Key-ordered system store
//!
//! The runtime's persistent store is a narrow collaborator: named tables
//! holding JSON records under string keys, listed back in key order. The
//! file-backed implementation keeps one directory per table and one JSON
//! file per key.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::errors::AdminError;

/// Narrow interface over the runtime's persistent key-ordered store.
#[async_trait]
pub trait SystemStore: Send + Sync {
    /// Create a table if it does not already exist.
    async fn create_table(&self, table: &str) -> Result<(), AdminError>;

    /// Save a record under a key; an identical key silently overwrites.
    async fn save(&self, table: &str, key: &str, record: Value) -> Result<(), AdminError>;

    /// Remove a record; returns whether a record existed under the key.
    async fn delete(&self, table: &str, key: &str) -> Result<bool, AdminError>;

    /// List all records of a table in key order.
    async fn list(&self, table: &str) -> Result<Vec<Value>, AdminError>;
}

/// File-backed store: a directory per table, a JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn table_dir(&self, table: &str) -> PathBuf {
        self.base_dir.join(table)
    }

    fn record_path(&self, table: &str, key: &str) -> PathBuf {
        // Keys contain characters that are awkward on some filesystems
        // (e.g. ':' in timestamps); keep them filename-safe.
        let file_name: String = key
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '#',
                c => c,
            })
            .collect();
        self.table_dir(table).join(format!("{}.json", file_name))
    }
}

#[async_trait]
impl SystemStore for FileStore {
    async fn create_table(&self, table: &str) -> Result<(), AdminError> {
        fs::create_dir_all(self.table_dir(table)).await?;
        Ok(())
    }

    async fn save(&self, table: &str, key: &str, record: Value) -> Result<(), AdminError> {
        let path = self.record_path(table, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(&record)?;
        let mut file = fs::File::create(&path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        Ok(())
    }

    async fn delete(&self, table: &str, key: &str) -> Result<bool, AdminError> {
        let path = self.record_path(table, key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, table: &str) -> Result<Vec<Value>, AdminError> {
        let dir = self.table_dir(table);
        if fs::metadata(&dir).await.is_err() {
            return Ok(Vec::new());
        }

        let mut file_names = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.ends_with(".json") {
                file_names.push(name.to_string());
            }
        }
        file_names.sort();

        let mut records = Vec::with_capacity(file_names.len());
        for name in file_names {
            let contents = fs::read_to_string(dir.join(&name)).await?;
            records.push(serde_json::from_str(&contents)?);
        }
        Ok(records)
    }
}

/// In-memory store used by tests and as an ephemeral backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SystemStore for MemoryStore {
    async fn create_table(&self, table: &str) -> Result<(), AdminError> {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default();
        Ok(())
    }

    async fn save(&self, table: &str, key: &str, record: Value) -> Result<(), AdminError> {
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), record);
        Ok(())
    }

    async fn delete(&self, table: &str, key: &str) -> Result<bool, AdminError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(table)
            .map(|records| records.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn list(&self, table: &str) -> Result<Vec<Value>, AdminError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }
}
