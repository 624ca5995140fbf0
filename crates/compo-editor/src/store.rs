//! Persistence seam for projects and templates.
//!
//! The editor talks to storage only through [`RecordStore`]. Backends
//! (IndexedDB, files, a server) live outside this crate; [`InMemoryStore`]
//! backs tests and hosts without persistence.

use compo_core::{DocumentError, Project, Template};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record `{0}` not found")]
    NotFound(String),

    #[error("storage backend failed: {0}")]
    Io(String),

    #[error("stored record `{id}` is malformed: {source}")]
    Malformed {
        id: String,
        #[source]
        source: DocumentError,
    },
}

/// Something that can be stored and found by name.
pub trait Record: Clone {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Record for Project {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Record for Template {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub trait RecordStore<R: Record> {
    /// Insert or replace by id.
    fn save(&mut self, record: R) -> Result<(), StoreError>;
    fn load(&self, id: &str) -> Result<R, StoreError>;
    fn load_all(&self) -> Result<Vec<R>, StoreError>;
    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
    /// Case-insensitive substring match on the record name.
    fn search(&self, query: &str) -> Result<Vec<R>, StoreError>;
}

/// Records kept in a map, ordered by id.
#[derive(Debug, Clone)]
pub struct InMemoryStore<R> {
    records: BTreeMap<String, R>,
}

impl<R> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<R> InMemoryStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    fn save(&mut self, record: R) -> Result<(), StoreError> {
        self.records.insert(record.id().to_string(), record);
        Ok(())
    }

    fn load(&self, id: &str) -> Result<R, StoreError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn load_all(&self) -> Result<Vec<R>, StoreError> {
        Ok(self.records.values().cloned().collect())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn search(&self, query: &str) -> Result<Vec<R>, StoreError> {
        let needle = query.to_lowercase();
        Ok(self
            .records
            .values()
            .filter(|r| r.name().to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
