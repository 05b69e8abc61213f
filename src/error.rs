//! Error types for HashLedger

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// No block in the chain carries the requested id.
    #[error("Block not found: {id}")]
    NotFound { id: String },

    /// The backing document could not be read or written.
    #[error("Storage error at {location}: {source}")]
    Storage {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing document exists but is not a well-formed chain.
    #[error("Corrupt chain document at {location}: {source}")]
    Decode {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    /// The id source handed out an id that is already in the chain.
    #[error("Block id already in chain: {id}")]
    DuplicateId { id: String },

    #[error("Failed to encode chain: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid block draft: {0}")]
    InvalidDraft(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub fn storage(location: impl Into<String>, source: std::io::Error) -> Self {
        LedgerError::Storage {
            location: location.into(),
            source,
        }
    }

    pub fn decode(location: impl Into<String>, source: serde_json::Error) -> Self {
        LedgerError::Decode {
            location: location.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
