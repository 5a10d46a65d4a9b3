//! Embedded JSON-snapshot store for mock definitions.
//!
//! Two tables (responses, requests) with generated 1-based ids and a foreign
//! key `request.response_id -> response.id`. The whole data set is small and
//! is rewritten as one JSON document on every commit; on startup a missing
//! data file simply means an empty store.
//!
//! The store itself does no locking. The repository owns the store behind a
//! single lock and calls [`DefinitionStore::persist`] once per mutating
//! operation, so each operation commits atomically from the callers' view.

use crate::repository::{HttpMethod, RequestDefinition, ResponseDefinition};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Errors from the durable layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unable to read data file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to write data file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("data file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unable to delete data file {path}: {source}")]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct Tables {
    next_response_id: u32,
    next_request_id: u32,
    responses: Vec<ResponseDefinition>,
    requests: Vec<RequestDefinition>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            next_response_id: 1,
            next_request_id: 1,
            responses: Vec::new(),
            requests: Vec::new(),
        }
    }
}

/// Durable table of response and request definitions.
pub struct DefinitionStore {
    /// Backing file; `None` keeps the store purely in memory.
    path: Option<PathBuf>,
    tables: Tables,
}

impl DefinitionStore {
    /// Open a store backed by `path`, loading the existing snapshot if any.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tables = if path.exists() {
            let json = fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            let tables: Tables =
                serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?;
            info!(
                "Loaded {} responses and {} requests from {:?}",
                tables.responses.len(),
                tables.requests.len(),
                path
            );
            tables
        } else {
            debug!("Data file {:?} does not exist, starting fresh", path);
            Tables::default()
        };
        Ok(Self {
            path: Some(path),
            tables,
        })
    }

    /// Create a store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tables: Tables::default(),
        }
    }

    /// Write the current tables back to the data file.
    ///
    /// Called by the repository once at the end of every mutating operation.
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        serde_json::to_string_pretty(&self.tables)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
            .and_then(|json| fs::write(path, json))
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })
    }

    /// Delete the backing data file. Missing file counts as success.
    pub fn delete_data_file(&self) -> Result<(), StoreError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(path).map_err(|source| StoreError::Delete {
            path: path.clone(),
            source,
        })?;
        info!("Deleted data file {:?}", path);
        Ok(())
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ========================================================================
    // Responses
    // ========================================================================

    pub fn responses(&self) -> &[ResponseDefinition] {
        &self.tables.responses
    }

    /// Insert a response, assigning the next id. Does not persist.
    pub fn insert_response(
        &mut self,
        status_code: u16,
        body: String,
        mime_type: String,
    ) -> ResponseDefinition {
        let def = ResponseDefinition {
            id: self.tables.next_response_id,
            status_code,
            body,
            mime_type,
        };
        self.tables.next_response_id += 1;
        self.tables.responses.push(def.clone());
        def
    }

    pub fn response_mut(&mut self, id: u32) -> Option<&mut ResponseDefinition> {
        self.tables.responses.iter_mut().find(|r| r.id == id)
    }

    /// Remove a response by id, returning whether it was present.
    pub fn remove_response(&mut self, id: u32) -> bool {
        let before = self.tables.responses.len();
        self.tables.responses.retain(|r| r.id != id);
        self.tables.responses.len() != before
    }

    // ========================================================================
    // Requests
    // ========================================================================

    pub fn requests(&self) -> &[RequestDefinition] {
        &self.tables.requests
    }

    /// Insert a request, assigning the next id. Does not persist.
    pub fn insert_request(
        &mut self,
        route: String,
        method: HttpMethod,
        query: String,
        body: String,
        response_id: u32,
    ) -> RequestDefinition {
        let def = RequestDefinition {
            id: self.tables.next_request_id,
            route,
            method,
            query,
            body,
            response_id,
        };
        self.tables.next_request_id += 1;
        self.tables.requests.push(def.clone());
        def
    }

    pub fn request_mut(&mut self, id: u32) -> Option<&mut RequestDefinition> {
        self.tables.requests.iter_mut().find(|r| r.id == id)
    }

    pub fn requests_mut(&mut self) -> impl Iterator<Item = &mut RequestDefinition> {
        self.tables.requests.iter_mut()
    }

    /// Remove a request by id, returning whether it was present.
    pub fn remove_request(&mut self, id: u32) -> bool {
        let before = self.tables.requests.len();
        self.tables.requests.retain(|r| r.id != id);
        self.tables.requests.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_one_based_and_monotonic() {
        let mut store = DefinitionStore::in_memory();
        let first = store.insert_response(200, String::new(), String::new());
        let second = store.insert_response(404, "gone".into(), "text/plain".into());
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        // Ids are never reused after a delete.
        assert!(store.remove_response(2));
        let third = store.insert_response(500, String::new(), String::new());
        assert_eq!(third.id, 3);
    }

    #[test]
    fn test_remove_missing_row_reports_absence() {
        let mut store = DefinitionStore::in_memory();
        assert!(!store.remove_response(7));
        assert!(!store.remove_request(7));
    }

    #[test]
    fn test_persist_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mock-data.json");

        {
            let mut store = DefinitionStore::open(&path).unwrap();
            let response = store.insert_response(200, "{}".into(), "application/json".into());
            store.insert_request(
                "orders".into(),
                HttpMethod::Get,
                String::new(),
                String::new(),
                response.id,
            );
            store.persist().unwrap();
        }

        let reloaded = DefinitionStore::open(&path).unwrap();
        assert_eq!(reloaded.responses().len(), 1);
        assert_eq!(reloaded.requests().len(), 1);
        assert_eq!(reloaded.requests()[0].route, "orders");
        assert_eq!(reloaded.requests()[0].response_id, 1);

        // Id counters survive the round trip.
        let mut reloaded = reloaded;
        let next = reloaded.insert_response(204, String::new(), String::new());
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_delete_data_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mock-data.json");

        let store = DefinitionStore::open(&path).unwrap();
        // Nothing persisted yet, so the file does not exist.
        store.delete_data_file().unwrap();

        store.persist().unwrap();
        assert!(path.exists());
        store.delete_data_file().unwrap();
        assert!(!path.exists());
        store.delete_data_file().unwrap();
    }

    #[test]
    fn test_in_memory_store_has_no_file() {
        let store = DefinitionStore::in_memory();
        assert!(store.data_file().is_none());
        store.persist().unwrap();
        store.delete_data_file().unwrap();
    }
}
