//! dbmend - maintenance toolkit for Django deployments on PostgreSQL.
//!
//! Repairs primary-key sequences that have fallen behind their tables and
//! resets generated Django migration files, keeping protected apps intact.

pub use dbmend_core::{MendConfig, MendError, Result};
pub use dbmend_runtime::{Database, MigrationReset, SequenceRepairer};
