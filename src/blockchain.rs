// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// block linking (`chain`) and whole-chain verification (`validation`).

pub mod core;
pub use self::core::*;
