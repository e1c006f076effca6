//! # Domain Module
//!
//! Business rules of the fee ledger, independent of storage and transport.
//!
//! ## Module Organization
//!
//! - **models**: challans, fee structures, discounts, students, money helpers
//! - **catalog_service**: fee structure and discount lookups
//! - **sibling_service**: guardian-based sibling detection
//! - **challan_generator**: pure line-item and discount computation
//! - **challan_service**: issuing, payments, overdue sweeps, cancellation
//! - **publish_service**: one-way bridge into the student-facing read set
//! - **collection_service**: class and school collection summaries
//! - **export_service**: CSV renditions of the above
//!
//! Data flows one way: catalogs feed the generator, the lifecycle service
//! stores what it generates, and the publish bridge and collection
//! aggregator only ever read challans.

pub mod catalog_service;
pub mod challan_generator;
pub mod challan_service;
pub mod collection_service;
pub mod commands;
pub mod errors;
pub mod export_service;
pub mod models;
pub mod publish_service;
pub mod sibling_service;

pub use catalog_service::CatalogService;
pub use challan_service::ChallanService;
pub use collection_service::CollectionService;
pub use errors::{LedgerError, LedgerResult};
pub use export_service::ExportService;
pub use publish_service::{PublishService, PublishedChallan, PublishedChallanStore, PublishedStatus};
pub use sibling_service::{detect_siblings, SiblingIndex, SiblingService};
