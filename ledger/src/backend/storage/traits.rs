//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;

use crate::backend::domain::models::{BillingPeriod, Challan, Discount, FeeStructure, Student};

/// Trait defining the interface for challan storage operations
///
/// Challans are never deleted; cancellation is a status, not a removal.
pub trait ChallanStorage: Send + Sync {
    /// Store a newly issued challan
    fn store_challan(&self, challan: &Challan) -> Result<()>;

    /// Replace an existing challan (status transitions, payments)
    fn update_challan(&self, challan: &Challan) -> Result<()>;

    /// Retrieve a specific challan by ID
    fn get_challan(&self, challan_id: &str) -> Result<Option<Challan>>;

    /// Retrieve a specific challan by its human-readable number
    fn get_challan_by_number(&self, challan_no: &str) -> Result<Option<Challan>>;

    /// All challans in issue order
    fn list_challans(&self) -> Result<Vec<Challan>>;

    /// All challans of one student in issue order
    fn list_challans_for_student(&self, student_id: &str) -> Result<Vec<Challan>>;

    /// Allocate the next challan sequence number for a billing period.
    /// Sequence numbers are never reused.
    fn next_sequence(&self, period: BillingPeriod) -> Result<u32>;
}

/// Trait defining the interface for the student roster
pub trait RosterStorage: Send + Sync {
    /// All students in roster order
    fn list_students(&self) -> Result<Vec<Student>>;

    /// Retrieve a specific student by ID
    fn get_student(&self, student_id: &str) -> Result<Option<Student>>;

    /// Insert or replace a student
    fn store_student(&self, student: &Student) -> Result<()>;
}

/// Trait defining the interface for the fee and discount catalog
pub trait CatalogStorage: Send + Sync {
    fn list_fee_structures(&self) -> Result<Vec<FeeStructure>>;

    /// Insert or replace the structure with the same id
    fn store_fee_structure(&self, structure: &FeeStructure) -> Result<()>;

    fn list_discounts(&self) -> Result<Vec<Discount>>;

    /// Insert or replace the discount with the same id
    fn store_discount(&self, discount: &Discount) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type (in-memory, files)
/// and provides factory methods for creating repositories.
pub trait Connection: Send + Sync + Clone {
    type ChallanRepository: ChallanStorage + Clone;
    type RosterRepository: RosterStorage + Clone;
    type CatalogRepository: CatalogStorage + Clone;

    fn create_challan_repository(&self) -> Self::ChallanRepository;
    fn create_roster_repository(&self) -> Self::RosterRepository;
    fn create_catalog_repository(&self) -> Self::CatalogRepository;
}
