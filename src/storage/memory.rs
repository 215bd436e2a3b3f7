//! In-memory record store.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{FieldNames, RawRecord, RecordUpdate};
use crate::storage::{RecordPage, RecordStore, page_of};

/// Record store held in memory. Every successful write is also kept in an
/// append-only log so callers can inspect what a run wrote.
pub struct MemoryStore {
    records: Mutex<Vec<RawRecord>>,
    writes: Mutex<Vec<(String, RecordUpdate)>>,
    page_size: usize,
    fields: FieldNames,
}

impl MemoryStore {
    pub fn new(records: Vec<RawRecord>, page_size: usize, fields: FieldNames) -> Self {
        Self {
            records: Mutex::new(records),
            writes: Mutex::new(Vec::new()),
            page_size,
            fields,
        }
    }

    /// Current state of all records.
    pub fn records(&self) -> Vec<RawRecord> {
        lock(&self.records).clone()
    }

    /// Writes applied so far, in order.
    pub fn writes(&self) -> Vec<(String, RecordUpdate)> {
        lock(&self.writes).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query(&self, cursor: Option<String>) -> Result<RecordPage> {
        page_of(&lock(&self.records), cursor.as_deref(), self.page_size)
    }

    async fn update(&self, id: &str, update: &RecordUpdate) -> Result<()> {
        {
            let mut records = lock(&self.records);
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::store(format!("record {id} not found")))?;
            update.apply(record, &self.fields);
        }
        lock(&self.writes).push((id.to_string(), update.clone()));
        Ok(())
    }
}
