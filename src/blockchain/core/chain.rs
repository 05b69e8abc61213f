use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// `previous_hash` carried by the first block of every chain.
pub const GENESIS_PREVIOUS_HASH: &str = "";

/// Ordered blocks, canonical order = append order.
pub type Chain = Vec<Block>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub name: String,
    pub amount: f64,
    /// RFC 3339 creation time.
    pub timestamp: String,
    /// Lowercase hex SHA-256 of the preceding block, empty for genesis.
    pub previous_hash: String,
}

impl Block {
    pub fn digest(&self) -> String {
        digest(self)
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}

/// Caller-supplied payload of a block that has not been linked yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDraft {
    pub name: String,
    pub amount: f64,
}

impl BlockDraft {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        BlockDraft {
            name: name.into(),
            amount,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::InvalidDraft("name must not be empty".to_string()));
        }
        if !self.amount.is_finite() {
            return Err(LedgerError::InvalidDraft(format!(
                "amount must be a finite number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// SHA-256 over the block's canonical encoding, as lowercase hex.
///
/// Fields are fed in declaration order. Every string is prefixed with its
/// byte length so that shifting bytes between adjacent fields changes the
/// digest; the amount is hashed through its IEEE-754 bit pattern.
pub fn digest(block: &Block) -> String {
    let mut hasher = Sha256::new();
    update_str(&mut hasher, &block.id);
    update_str(&mut hasher, &block.name);
    hasher.update(block.amount.to_bits().to_le_bytes());
    update_str(&mut hasher, &block.timestamp);
    update_str(&mut hasher, &block.previous_hash);
    hex::encode(hasher.finalize())
}

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

/// Build the block that follows `previous`.
///
/// `previous` must be the tail exactly as loaded, before the new block is
/// pushed onto the working chain.
pub fn link(previous: Option<&Block>, draft: BlockDraft, id: String, timestamp: String) -> Block {
    let previous_hash = previous
        .map(digest)
        .unwrap_or_else(|| GENESIS_PREVIOUS_HASH.to_string());

    Block {
        id,
        name: draft.name,
        amount: draft.amount,
        timestamp,
        previous_hash,
    }
}
