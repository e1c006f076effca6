//! # YAML Catalog Repository
//!
//! Fee structures live in `fee_structures.yaml`, discounts in
//! `discounts.yaml`. Both are authored by administration and loaded on
//! every read.
//!
//! ```yaml
//! - class_name: Class 5
//!   academic_year: 2026-2027
//!   items:
//!     - { id: tuition, name: Tuition Fee, amount: 4000 }
//!     - { id: lab, name: Lab Fee, amount: 600 }
//!     - { id: transport, name: Transport, amount: 400, is_optional: true }
//! ```
//!
//! `id` and `total_amount` may be omitted; a stated total that disagrees
//! with the items is rejected.

use anyhow::{anyhow, Context, Result};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::connection::{CsvConnection, DISCOUNTS_FILE, FEE_STRUCTURES_FILE};
use crate::backend::domain::models::{Discount, FeeHead, FeeStructure};
use crate::backend::storage::traits::CatalogStorage;

#[derive(Debug, Serialize, Deserialize)]
struct FeeStructureRecord {
    #[serde(default)]
    id: Option<String>,
    class_name: String,
    academic_year: String,
    items: Vec<FeeHead>,
    #[serde(default)]
    total_amount: Option<Decimal>,
}

impl FeeStructureRecord {
    fn into_domain(self) -> Result<FeeStructure> {
        let mut structure = FeeStructure::new(self.class_name, self.academic_year, self.items);
        if let Some(id) = self.id {
            structure.id = id;
        }
        if let Some(item) = structure.negative_item() {
            return Err(anyhow!(
                "Fee structure {} has fee head {} with negative amount {}",
                structure.id,
                item.id,
                item.amount
            ));
        }
        if let Some(stated) = self.total_amount {
            if stated != structure.total_amount {
                return Err(anyhow!(
                    "Fee structure {} states total {} but its items sum to {}",
                    structure.id,
                    stated,
                    structure.total_amount
                ));
            }
        }
        Ok(structure)
    }

    fn from_domain(structure: &FeeStructure) -> Self {
        Self {
            id: Some(structure.id.clone()),
            class_name: structure.class_name.clone(),
            academic_year: structure.academic_year.clone(),
            items: structure.items.clone(),
            total_amount: Some(structure.total_amount),
        }
    }
}

/// YAML-based fee and discount catalog
#[derive(Clone)]
pub struct CatalogRepository {
    connection: CsvConnection,
}

impl CatalogRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_fee_structures(&self) -> Result<Vec<FeeStructure>> {
        let Some(contents) = self.connection.read_optional(FEE_STRUCTURES_FILE)? else {
            return Ok(Vec::new());
        };
        let records: Vec<FeeStructureRecord> = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", FEE_STRUCTURES_FILE))?;
        let structures = records
            .into_iter()
            .map(FeeStructureRecord::into_domain)
            .collect::<Result<Vec<_>>>()?;
        debug!("Loaded {} fee structures", structures.len());
        Ok(structures)
    }

    fn read_discounts(&self) -> Result<Vec<Discount>> {
        let Some(contents) = self.connection.read_optional(DISCOUNTS_FILE)? else {
            return Ok(Vec::new());
        };
        let discounts: Vec<Discount> = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", DISCOUNTS_FILE))?;
        debug!("Loaded {} discounts", discounts.len());
        Ok(discounts)
    }
}

impl CatalogStorage for CatalogRepository {
    fn list_fee_structures(&self) -> Result<Vec<FeeStructure>> {
        self.read_fee_structures()
    }

    fn store_fee_structure(&self, structure: &FeeStructure) -> Result<()> {
        let _guard = self.connection.lock_files();
        let mut structures = self.read_fee_structures()?;
        match structures.iter_mut().find(|s| s.id == structure.id) {
            Some(existing) => *existing = structure.clone(),
            None => structures.push(structure.clone()),
        }
        let records: Vec<FeeStructureRecord> =
            structures.iter().map(FeeStructureRecord::from_domain).collect();
        self.connection
            .write_atomically(FEE_STRUCTURES_FILE, &serde_yaml::to_string(&records)?)
    }

    fn list_discounts(&self) -> Result<Vec<Discount>> {
        self.read_discounts()
    }

    fn store_discount(&self, discount: &Discount) -> Result<()> {
        let _guard = self.connection.lock_files();
        let mut discounts = self.read_discounts()?;
        match discounts.iter_mut().find(|d| d.id == discount.id) {
            Some(existing) => *existing = discount.clone(),
            None => discounts.push(discount.clone()),
        }
        self.connection
            .write_atomically(DISCOUNTS_FILE, &serde_yaml::to_string(&discounts)?)
    }
}
