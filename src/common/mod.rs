//! Shared identifiers and collaborator interfaces
//!
//! Fixed-width identifiers used across the arena and the traits through which
//! the core talks to the ledger and the notice sink.

pub mod types;
pub mod traits;
