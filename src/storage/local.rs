//! Local filesystem record store.
//!
//! Keeps every record in a single JSON file. Reads page through the file with
//! an offset cursor; updates are read-modify-write under a lock and land
//! atomically (write to temp, then rename).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{FieldNames, RawRecord, RecordUpdate};
use crate::storage::{RecordPage, RecordStore, page_of};

/// JSON-file backed record store.
pub struct LocalStore {
    path: PathBuf,
    page_size: usize,
    fields: FieldNames,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Create a store over the given records file.
    pub fn new(path: impl Into<PathBuf>, page_size: usize, fields: FieldNames) -> Self {
        Self {
            path: path.into(),
            page_size,
            fields,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records. A missing file is a setup error.
    async fn read_all(&self) -> Result<Vec<RawRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::store(format!(
                    "records file not found at {}",
                    self.path.display()
                )));
            }
            Err(e) => return Err(AppError::Io(e)),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write all records atomically.
    async fn write_all(&self, records: &[RawRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn query(&self, cursor: Option<String>) -> Result<RecordPage> {
        let records = self.read_all().await?;
        page_of(&records, cursor.as_deref(), self.page_size)
    }

    async fn update(&self, id: &str, update: &RecordUpdate) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_all().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::store(format!("record {id} not found")))?;
        update.apply(record, &self.fields);

        self.write_all(&records).await
    }
}
