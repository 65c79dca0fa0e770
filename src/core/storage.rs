// src/core/storage.rs

//! Persistence of scan results.
//!
//! The pipeline only produces documents; where they end up is decided by the
//! caller through the `DocumentStore` trait. Two stores ship with the crate:
//! an in-memory one and a JSON-lines file.

use crate::core::models::Document;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record at {path}:{line}: {source}")]
    CorruptRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Selects documents for `find` and `delete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFilter {
    All,
    Id(Uuid),
    Domain(String),
}

impl DocumentFilter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            DocumentFilter::All => true,
            DocumentFilter::Id(id) => doc.id == *id,
            DocumentFilter::Domain(domain) => doc.domain.eq_ignore_ascii_case(domain),
        }
    }
}

/// A document store the scan results are handed to.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, doc: Document) -> Result<(), StoreError>;

    async fn insert_many(&self, docs: Vec<Document>) -> Result<(), StoreError>;

    async fn find(&self, filter: &DocumentFilter) -> Result<Vec<Document>, StoreError>;

    /// Deletes every matching document and returns how many were removed.
    async fn delete(&self, filter: &DocumentFilter) -> Result<u64, StoreError>;
}

// --- In-memory store ---

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, doc: Document) -> Result<(), StoreError> {
        self.docs.write().await.push(doc);
        Ok(())
    }

    async fn insert_many(&self, docs: Vec<Document>) -> Result<(), StoreError> {
        self.docs.write().await.extend(docs);
        Ok(())
    }

    async fn find(&self, filter: &DocumentFilter) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| filter.matches(d)).cloned().collect())
    }

    async fn delete(&self, filter: &DocumentFilter) -> Result<u64, StoreError> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }
}

// --- JSON-lines file store ---

/// One JSON document per line in a single file.
///
/// Inserts append; `delete` rewrites the file without the removed lines.
/// All access goes through one lock so concurrent callers never interleave.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesStore {
    /// Opens (and creates, if needed) the store at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| io_error(&path, e))?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        debug!(path = %path.display(), "Opened JSON-lines store.");
        Ok(Self { path, lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes every stored document.
    pub async fn truncate(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        fs::write(&self.path, b"").await.map_err(|e| io_error(&self.path, e))?;
        info!(path = %self.path.display(), "Store emptied.");
        Ok(())
    }

    async fn append(&self, docs: &[Document]) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        for doc in docs {
            serde_json::to_writer(&mut buf, doc)?;
            buf.push(b'\n');
        }
        let _guard = self.lock.lock().await;
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        file.write_all(&buf).await.map_err(|e| io_error(&self.path, e))?;
        file.flush().await.map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Document>, StoreError> {
        let raw = fs::read_to_string(&self.path).await.map_err(|e| io_error(&self.path, e))?;
        raw.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|source| StoreError::CorruptRecord {
                    path: self.path.clone(),
                    line: idx + 1,
                    source,
                })
            })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for JsonLinesStore {
    async fn insert_one(&self, doc: Document) -> Result<(), StoreError> {
        self.append(std::slice::from_ref(&doc)).await
    }

    async fn insert_many(&self, docs: Vec<Document>) -> Result<(), StoreError> {
        self.append(&docs).await
    }

    async fn find(&self, filter: &DocumentFilter) -> Result<Vec<Document>, StoreError> {
        let _guard = self.lock.lock().await;
        let docs = self.read_all().await?;
        Ok(docs.into_iter().filter(|d| filter.matches(d)).collect())
    }

    async fn delete(&self, filter: &DocumentFilter) -> Result<u64, StoreError> {
        let _guard = self.lock.lock().await;
        let docs = self.read_all().await?;
        let before = docs.len();
        let kept: Vec<Document> = docs.into_iter().filter(|d| !filter.matches(d)).collect();
        let removed = (before - kept.len()) as u64;

        let mut buf = Vec::new();
        for doc in &kept {
            serde_json::to_writer(&mut buf, doc)?;
            buf.push(b'\n');
        }
        fs::write(&self.path, buf).await.map_err(|e| io_error(&self.path, e))?;
        debug!(removed, remaining = kept.len(), "Deleted documents from store.");
        Ok(removed)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io { path: path.to_path_buf(), source }
}
