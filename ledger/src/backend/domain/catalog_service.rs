//! Fee structure and discount catalog lookups.
//!
//! Structures and discounts are authored by administration; this service
//! validates them on the way in and refuses to invent defaults on the way
//! out. A class without a structure is a `NotFound`, never a zero-fee bill.

use log::{info, warn};

use crate::backend::domain::errors::{LedgerError, LedgerResult};
use crate::backend::domain::models::{Discount, FeeStructure};
use crate::backend::storage::{CatalogStorage, Connection};

#[derive(Clone)]
pub struct CatalogService<C: Connection> {
    catalog_repository: C::CatalogRepository,
}

impl<C: Connection> CatalogService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            catalog_repository: connection.create_catalog_repository(),
        }
    }

    pub fn get_fee_structure(&self, class_name: &str, academic_year: &str) -> LedgerResult<FeeStructure> {
        self.catalog_repository
            .list_fee_structures()?
            .into_iter()
            .find(|s| s.matches(class_name, academic_year))
            .ok_or_else(|| {
                LedgerError::not_found("Fee structure", format!("{} / {}", class_name, academic_year))
            })
    }

    pub fn list_fee_structures(&self) -> LedgerResult<Vec<FeeStructure>> {
        Ok(self.catalog_repository.list_fee_structures()?)
    }

    /// Store a structure after recomputing its total from the items
    pub fn save_fee_structure(&self, structure: FeeStructure) -> LedgerResult<FeeStructure> {
        let mut rebuilt = FeeStructure::new(structure.class_name, structure.academic_year, structure.items);
        if !structure.id.is_empty() {
            rebuilt.id = structure.id;
        }
        if let Err(reason) = rebuilt.validate() {
            return Err(LedgerError::InvalidFeeStructure {
                structure_id: rebuilt.id,
                reason,
            });
        }
        self.catalog_repository.store_fee_structure(&rebuilt)?;
        info!("Saved fee structure {} (total {})", rebuilt.id, rebuilt.total_amount);
        Ok(rebuilt)
    }

    pub fn list_discounts(&self) -> LedgerResult<Vec<Discount>> {
        Ok(self.catalog_repository.list_discounts()?)
    }

    /// Discounts applied without being asked for. Invalid entries are left
    /// out with a warning rather than applied.
    pub fn list_auto_apply_discounts(&self) -> LedgerResult<Vec<Discount>> {
        Ok(self
            .catalog_repository
            .list_discounts()?
            .into_iter()
            .filter(|d| d.auto_apply)
            .filter(|d| match d.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Ignoring auto-apply discount {}: {}", d.id, e);
                    false
                }
            })
            .collect())
    }

    pub fn get_discount(&self, discount_id: &str) -> LedgerResult<Discount> {
        self.catalog_repository
            .list_discounts()?
            .into_iter()
            .find(|d| d.id == discount_id)
            .ok_or_else(|| LedgerError::not_found("Discount", discount_id))
    }

    pub fn save_discount(&self, discount: Discount) -> LedgerResult<Discount> {
        discount.validate().map_err(|source| LedgerError::InvalidDiscount {
            discount_id: discount.id.clone(),
            source,
        })?;
        self.catalog_repository.store_discount(&discount)?;
        info!("Saved discount {} ({})", discount.id, discount.name);
        Ok(discount)
    }
}
