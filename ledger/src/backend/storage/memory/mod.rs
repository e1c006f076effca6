//! # In-Memory Storage Module
//!
//! Process-local storage used for tests and for embedding the ledger in a
//! host that owns persistence itself. All repositories created from one
//! `MemoryConnection` share the same state.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::domain::models::{BillingPeriod, Challan, Discount, FeeStructure, Student};
use crate::backend::storage::traits::{CatalogStorage, ChallanStorage, Connection, RosterStorage};

#[derive(Debug, Default)]
struct MemoryState {
    challans: Vec<Challan>,
    sequences: HashMap<BillingPeriod, u32>,
    students: Vec<Student>,
    fee_structures: Vec<FeeStructure>,
    discounts: Vec<Discount>,
}

#[derive(Clone, Default)]
pub struct MemoryConnection {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| anyhow!("In-memory ledger state lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| anyhow!("In-memory ledger state lock poisoned"))
    }
}

impl Connection for MemoryConnection {
    type ChallanRepository = MemoryChallanRepository;
    type RosterRepository = MemoryRosterRepository;
    type CatalogRepository = MemoryCatalogRepository;

    fn create_challan_repository(&self) -> Self::ChallanRepository {
        MemoryChallanRepository {
            connection: self.clone(),
        }
    }

    fn create_roster_repository(&self) -> Self::RosterRepository {
        MemoryRosterRepository {
            connection: self.clone(),
        }
    }

    fn create_catalog_repository(&self) -> Self::CatalogRepository {
        MemoryCatalogRepository {
            connection: self.clone(),
        }
    }
}

#[derive(Clone)]
pub struct MemoryChallanRepository {
    connection: MemoryConnection,
}

impl ChallanStorage for MemoryChallanRepository {
    fn store_challan(&self, challan: &Challan) -> Result<()> {
        let mut state = self.connection.write()?;
        if state.challans.iter().any(|c| c.id == challan.id || c.challan_no == challan.challan_no) {
            return Err(anyhow!("Challan {} already stored", challan.challan_no));
        }
        state.challans.push(challan.clone());
        Ok(())
    }

    fn update_challan(&self, challan: &Challan) -> Result<()> {
        let mut state = self.connection.write()?;
        match state.challans.iter_mut().find(|c| c.id == challan.id) {
            Some(existing) => {
                *existing = challan.clone();
                Ok(())
            }
            None => Err(anyhow!("Challan not found for update: {}", challan.id)),
        }
    }

    fn get_challan(&self, challan_id: &str) -> Result<Option<Challan>> {
        let state = self.connection.read()?;
        Ok(state.challans.iter().find(|c| c.id == challan_id).cloned())
    }

    fn get_challan_by_number(&self, challan_no: &str) -> Result<Option<Challan>> {
        let state = self.connection.read()?;
        Ok(state.challans.iter().find(|c| c.challan_no == challan_no).cloned())
    }

    fn list_challans(&self) -> Result<Vec<Challan>> {
        Ok(self.connection.read()?.challans.clone())
    }

    fn list_challans_for_student(&self, student_id: &str) -> Result<Vec<Challan>> {
        let state = self.connection.read()?;
        Ok(state
            .challans
            .iter()
            .filter(|c| c.student_id == student_id)
            .cloned()
            .collect())
    }

    fn next_sequence(&self, period: BillingPeriod) -> Result<u32> {
        let mut state = self.connection.write()?;
        let counter = state.sequences.entry(period).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

#[derive(Clone)]
pub struct MemoryRosterRepository {
    connection: MemoryConnection,
}

impl RosterStorage for MemoryRosterRepository {
    fn list_students(&self) -> Result<Vec<Student>> {
        Ok(self.connection.read()?.students.clone())
    }

    fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        let state = self.connection.read()?;
        Ok(state.students.iter().find(|s| s.id == student_id).cloned())
    }

    fn store_student(&self, student: &Student) -> Result<()> {
        let mut state = self.connection.write()?;
        match state.students.iter_mut().find(|s| s.id == student.id) {
            Some(existing) => *existing = student.clone(),
            None => state.students.push(student.clone()),
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MemoryCatalogRepository {
    connection: MemoryConnection,
}

impl CatalogStorage for MemoryCatalogRepository {
    fn list_fee_structures(&self) -> Result<Vec<FeeStructure>> {
        Ok(self.connection.read()?.fee_structures.clone())
    }

    fn store_fee_structure(&self, structure: &FeeStructure) -> Result<()> {
        let mut state = self.connection.write()?;
        match state.fee_structures.iter_mut().find(|s| s.id == structure.id) {
            Some(existing) => *existing = structure.clone(),
            None => state.fee_structures.push(structure.clone()),
        }
        Ok(())
    }

    fn list_discounts(&self) -> Result<Vec<Discount>> {
        Ok(self.connection.read()?.discounts.clone())
    }

    fn store_discount(&self, discount: &Discount) -> Result<()> {
        let mut state = self.connection.write()?;
        match state.discounts.iter_mut().find(|d| d.id == discount.id) {
            Some(existing) => *existing = discount.clone(),
            None => state.discounts.push(discount.clone()),
        }
        Ok(())
    }
}
