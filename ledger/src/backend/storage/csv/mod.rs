//! # File Storage Module
//!
//! File-backed storage for a single school's data directory. The roster is a
//! CSV file maintained by the school office; catalogs, configuration and the
//! challan ledger are YAML.
//!
//! ```text
//! data/
//! ├── ledger_config.yaml
//! ├── students.csv
//! ├── fee_structures.yaml
//! ├── discounts.yaml
//! └── challans.yaml
//! ```
//!
//! Every rewrite goes through a temp file and a rename, and read-modify-write
//! cycles hold the connection's file lock.

pub mod catalog_repository;
pub mod challan_repository;
pub mod config_repository;
pub mod connection;
pub mod roster_repository;

#[cfg(test)]
pub mod test_utils;

pub use catalog_repository::CatalogRepository;
pub use challan_repository::ChallanRepository;
pub use config_repository::{ConfigRepository, LedgerConfig, PublishMode, SiblingPolicy};
pub use connection::CsvConnection;
pub use roster_repository::RosterRepository;
