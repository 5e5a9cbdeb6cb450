//! Flat persistence for tracked resources.
//!
//! The store is a plain key space with no transactions; callers serialize
//! their read-modify-write cycles (see `TermService`).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::models::term::TrackedResource;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait TermStore: Send + Sync {
    /// All resources, in insertion order.
    async fn load(&self) -> Result<Vec<TrackedResource>, StoreError>;

    /// Replaces the stored sequence.
    async fn save(&self, terms: &[TrackedResource]) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<TrackedResource>, StoreError> {
        Ok(self.load().await?.into_iter().find(|t| t.id == id))
    }
}

#[derive(Serialize, Deserialize)]
struct DataFile {
    terms: Vec<TrackedResource>,
}

#[derive(Serialize)]
struct DataFileRef<'a> {
    terms: &'a [TrackedResource],
}

/// Stores everything in one pretty-printed JSON document: `{"terms": [...]}`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates `{"terms": []}` if the file is missing. Run once at startup,
    /// before any request can reach the store; an existing file is left alone.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                info!("Creating empty store at {}", self.path.display());
                self.write_document(&[]).await
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn write_document(&self, terms: &[TrackedResource]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&DataFileRef { terms })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }
}

#[async_trait]
impl TermStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<TrackedResource>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            // Read-only: the first save creates the file.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                error!("Failed to read store {}: {e}", self.path.display());
                return Err(self.io_error(e));
            }
        };

        let data: DataFile = serde_json::from_str(&raw).map_err(|e| {
            error!("Store {} is corrupt: {e}", self.path.display());
            StoreError::Json(e)
        })?;
        Ok(data.terms)
    }

    async fn save(&self, terms: &[TrackedResource]) -> Result<(), StoreError> {
        self.write_document(terms).await.map_err(|e| {
            error!("Failed to write store {}: {e}", self.path.display());
            e
        })
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use tokio::sync::Mutex;

    use super::*;

    /// In-process store for service and router tests.
    #[derive(Default)]
    pub struct MemoryStore {
        terms: Mutex<Vec<TrackedResource>>,
    }

    #[async_trait]
    impl TermStore for MemoryStore {
        async fn load(&self) -> Result<Vec<TrackedResource>, StoreError> {
            Ok(self.terms.lock().await.clone())
        }

        async fn save(&self, terms: &[TrackedResource]) -> Result<(), StoreError> {
            *self.terms.lock().await = terms.to_vec();
            Ok(())
        }
    }
}
