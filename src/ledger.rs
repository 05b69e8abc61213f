//! Ledger operations: lookup, tip retrieval, append and verification.
//!
//! Every operation reloads the chain from the store; nothing is cached
//! between calls. Appends against one document are serialized by the
//! store's append lock, so two writers can never link to the same tail.

use crate::blockchain::{link, verify_chain, Block, BlockDraft, Chain, ChainReport};
use crate::error::{LedgerError, Result};
use crate::persistence::{JsonFileStore, LedgerStore};
use crate::stamp::{Clock, IdGenerator, SystemClock, UuidGenerator};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl LedgerService {
    /// Service over `store` using the wall clock and random UUIDs.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self::with_sources(store, Arc::new(SystemClock), Arc::new(UuidGenerator))
    }

    pub fn with_sources(
        store: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        LedgerService { store, clock, ids }
    }

    /// Service over the JSON document at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Arc::new(JsonFileStore::open(path)?)))
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Create an empty chain document unless one already exists.
    /// Returns `true` when a document was written.
    pub fn init(&self) -> Result<bool> {
        let lock = self.store.append_lock();
        let _guard = lock.lock();

        if self.store.exists()? {
            return Ok(false);
        }
        self.store.save(&[])?;
        info!(location = %self.store.location(), "ledger.init");
        Ok(true)
    }

    pub fn list_all(&self) -> Result<Chain> {
        self.store.load()
    }

    pub fn find_by_id(&self, id: &str) -> Result<Block> {
        self.store
            .load()?
            .into_iter()
            .find(|block| block.id == id)
            .ok_or_else(|| LedgerError::NotFound { id: id.to_string() })
    }

    /// The tip of the chain, `None` when the chain is empty.
    pub fn last_block(&self) -> Result<Option<Block>> {
        Ok(self.store.load()?.pop())
    }

    pub fn tip_hash(&self) -> Result<Option<String>> {
        Ok(self.last_block()?.map(|block| block.digest()))
    }

    /// Link `draft` to the current tip, persist the extended chain and
    /// return it.
    pub fn append(&self, draft: BlockDraft) -> Result<Chain> {
        draft.validate()?;

        let lock = self.store.append_lock();
        let _guard = lock.lock();

        let mut blocks = self.store.load()?;

        let id = self.ids.new_id();
        if blocks.iter().any(|block| block.id == id) {
            return Err(LedgerError::DuplicateId { id });
        }

        // Link against the tail as loaded, before the new block joins the chain.
        let block = link(blocks.last(), draft, id, self.clock.now());
        debug!(id = %block.id, previous_hash = %block.previous_hash, "ledger.link");

        blocks.push(block);
        self.store.save(&blocks)?;

        info!(
            location = %self.store.location(),
            height = blocks.len(),
            "ledger.append"
        );
        Ok(blocks)
    }

    /// Check every link and id in the persisted chain.
    pub fn verify(&self) -> Result<ChainReport> {
        let blocks = self.store.load()?;
        Ok(verify_chain(&blocks))
    }
}
