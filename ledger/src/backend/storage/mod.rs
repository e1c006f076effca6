//! # Storage Module
//!
//! Persistence for the fee ledger. The domain layer only sees the traits in
//! [`traits`]; a [`Connection`] hands out the concrete repositories.
//!
//! - [`csv`]: a data directory of CSV and YAML files
//! - [`memory`]: process-local state for tests and embedding

pub mod csv;
pub mod memory;
pub mod traits;

pub use self::csv::{CsvConnection, LedgerConfig, PublishMode, SiblingPolicy};
pub use self::memory::MemoryConnection;
pub use self::traits::{CatalogStorage, ChallanStorage, Connection, RosterStorage};
