//! HashLedger - a single-file ledger where every block commits to its predecessor
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Chain
//! - [`blockchain`] - Block structure, digest, linking and chain verification
//! - [`ledger`] - Ledger operations (list, lookup, tip, append, verify)
//!
//! ## State Management
//! - [`persistence`] - Chain document stores (JSON file, in-memory)
//! - [`stamp`] - Id and timestamp sources for new blocks
//!
//! ## Integration
//! - [`api`] - REST API (feature `api`)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - CLI utilities

#![forbid(unsafe_code)]

// ============================================================================
// Core Chain
// ============================================================================
pub mod blockchain;
pub mod ledger;

// ============================================================================
// State Management
// ============================================================================
pub mod persistence;
pub mod stamp;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;

pub use blockchain::{Block, BlockDraft, Chain};
pub use error::{LedgerError, Result};
pub use ledger::LedgerService;
