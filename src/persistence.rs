//! Chain document persistence for HashLedger
//!
//! The whole chain lives in one JSON document. Every save replaces that
//! document in full; readers never see a half-written file.

use crate::blockchain::{Block, Chain};
use crate::error::{LedgerError, Result};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

/// Append locks shared by every store opened on the same document path.
///
/// Entries live for the rest of the process, one per distinct path ever
/// opened. A process serves a handful of documents at most.
static APPEND_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn append_lock_for(path: &Path) -> Arc<Mutex<()>> {
    APPEND_LOCKS
        .lock()
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Abstraction for chain document backends. `save` must be all-or-nothing
/// from the point of view of a concurrent `load`.
pub trait LedgerStore: Send + Sync {
    /// Read and decode the full chain. A missing document is a storage error.
    fn load(&self) -> Result<Chain>;

    /// Replace the document with `blocks`.
    fn save(&self, blocks: &[Block]) -> Result<()>;

    fn exists(&self) -> Result<bool>;

    /// Lock that serializes writers of this document within the process.
    fn append_lock(&self) -> Arc<Mutex<()>>;

    /// Human readable location used in errors and logs.
    fn location(&self) -> String;
}

pub fn encode_chain(blocks: &[Block]) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(blocks).map_err(LedgerError::Encode)
}

pub fn decode_chain(location: &str, bytes: &[u8]) -> Result<Chain> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::decode(location, e))
}

/// Chain stored as a pretty-printed JSON array on the local filesystem.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| LedgerError::storage(path.display().to_string(), e))?
                .join(path)
        };
        let lock = append_lock_for(&path);
        Ok(JsonFileStore { path, lock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> Result<&Path> {
        self.path.parent().ok_or_else(|| {
            LedgerError::storage(
                self.location(),
                io::Error::new(io::ErrorKind::InvalidInput, "document path has no parent directory"),
            )
        })
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Chain> {
        let bytes = fs::read(&self.path).map_err(|e| LedgerError::storage(self.location(), e))?;
        let blocks = decode_chain(&self.location(), &bytes)?;
        debug!(path = %self.path.display(), blocks = blocks.len(), "chain.load");
        Ok(blocks)
    }

    fn save(&self, blocks: &[Block]) -> Result<()> {
        let bytes = encode_chain(blocks)?;
        let dir = self.parent_dir()?;
        let storage_err = |e: io::Error| LedgerError::storage(self.location(), e);

        fs::create_dir_all(dir).map_err(storage_err)?;

        // Write next to the target so the rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(dir).map_err(storage_err)?;
        tmp.write_all(&bytes).map_err(storage_err)?;
        tmp.as_file().sync_all().map_err(storage_err)?;
        tmp.persist(&self.path).map_err(|e| storage_err(e.error))?;

        debug!(path = %self.path.display(), blocks = blocks.len(), bytes = bytes.len(), "chain.save");
        Ok(())
    }

    fn exists(&self) -> Result<bool> {
        self.path
            .try_exists()
            .map_err(|e| LedgerError::storage(self.location(), e))
    }

    fn append_lock(&self) -> Arc<Mutex<()>> {
        self.lock.clone()
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory document, useful for tests and ephemeral runs.
///
/// Holds the encoded bytes rather than blocks so loads go through the same
/// decoding path as the file store.
#[derive(Clone)]
pub struct InMemoryStore {
    document: Arc<RwLock<Option<Vec<u8>>>>,
    lock: Arc<Mutex<()>>,
}

impl InMemoryStore {
    /// Store holding an empty chain.
    pub fn new() -> Self {
        Self::with_document(b"[]".to_vec())
    }

    /// Store with no document at all, as on a first run.
    pub fn uninitialized() -> Self {
        InMemoryStore {
            document: Arc::new(RwLock::new(None)),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Store holding arbitrary raw bytes.
    pub fn with_document(bytes: Vec<u8>) -> Self {
        InMemoryStore {
            document: Arc::new(RwLock::new(Some(bytes))),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn raw_document(&self) -> Option<Vec<u8>> {
        self.document.read().clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryStore {
    fn load(&self) -> Result<Chain> {
        let document = self.document.read();
        match document.as_deref() {
            Some(bytes) => decode_chain(&self.location(), bytes),
            None => Err(LedgerError::storage(
                self.location(),
                io::Error::new(io::ErrorKind::NotFound, "chain document does not exist"),
            )),
        }
    }

    fn save(&self, blocks: &[Block]) -> Result<()> {
        let bytes = encode_chain(blocks)?;
        *self.document.write() = Some(bytes);
        Ok(())
    }

    fn exists(&self) -> Result<bool> {
        Ok(self.document.read().is_some())
    }

    fn append_lock(&self) -> Arc<Mutex<()>> {
        self.lock.clone()
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
