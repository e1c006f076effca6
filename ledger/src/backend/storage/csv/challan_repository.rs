//! # YAML Challan Repository
//!
//! Issued challans and the per-period sequence counters share one file,
//! `challans.yaml`, so that a sequence allocation and the challan it numbers
//! are never split across files.
//!
//! ```yaml
//! sequences:
//!   2026-10: 2
//! challans:
//!   - id: challan::6f1c...
//!     challan_no: CH-202610-STU-001-0001
//!     status: pending
//!     ...
//! ```

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::connection::{CsvConnection, CHALLANS_FILE};
use crate::backend::domain::models::{BillingPeriod, Challan};
use crate::backend::storage::traits::ChallanStorage;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChallanLedgerFile {
    /// Last sequence number handed out, keyed by `YYYY-MM`
    #[serde(default)]
    sequences: BTreeMap<String, u32>,
    #[serde(default)]
    challans: Vec<Challan>,
}

/// YAML-based challan storage
#[derive(Clone)]
pub struct ChallanRepository {
    connection: CsvConnection,
}

impl ChallanRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_ledger(&self) -> Result<ChallanLedgerFile> {
        match self.connection.read_optional(CHALLANS_FILE)? {
            Some(contents) if !contents.trim().is_empty() => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", CHALLANS_FILE)),
            _ => Ok(ChallanLedgerFile::default()),
        }
    }

    fn write_ledger(&self, ledger: &ChallanLedgerFile) -> Result<()> {
        let yaml = serde_yaml::to_string(ledger)?;
        self.connection.write_atomically(CHALLANS_FILE, &yaml)?;
        debug!("Wrote {} challans", ledger.challans.len());
        Ok(())
    }
}

impl ChallanStorage for ChallanRepository {
    fn store_challan(&self, challan: &Challan) -> Result<()> {
        let _guard = self.connection.lock_files();
        let mut ledger = self.read_ledger()?;
        if ledger
            .challans
            .iter()
            .any(|c| c.id == challan.id || c.challan_no == challan.challan_no)
        {
            return Err(anyhow!("Challan {} already stored", challan.challan_no));
        }
        ledger.challans.push(challan.clone());
        self.write_ledger(&ledger)
    }

    fn update_challan(&self, challan: &Challan) -> Result<()> {
        let _guard = self.connection.lock_files();
        let mut ledger = self.read_ledger()?;
        let existing = ledger
            .challans
            .iter_mut()
            .find(|c| c.id == challan.id)
            .ok_or_else(|| anyhow!("Challan not found for update: {}", challan.id))?;
        *existing = challan.clone();
        self.write_ledger(&ledger)
    }

    fn get_challan(&self, challan_id: &str) -> Result<Option<Challan>> {
        Ok(self
            .read_ledger()?
            .challans
            .into_iter()
            .find(|c| c.id == challan_id))
    }

    fn get_challan_by_number(&self, challan_no: &str) -> Result<Option<Challan>> {
        Ok(self
            .read_ledger()?
            .challans
            .into_iter()
            .find(|c| c.challan_no == challan_no))
    }

    fn list_challans(&self) -> Result<Vec<Challan>> {
        Ok(self.read_ledger()?.challans)
    }

    fn list_challans_for_student(&self, student_id: &str) -> Result<Vec<Challan>> {
        Ok(self
            .read_ledger()?
            .challans
            .into_iter()
            .filter(|c| c.student_id == student_id)
            .collect())
    }

    fn next_sequence(&self, period: BillingPeriod) -> Result<u32> {
        let _guard = self.connection.lock_files();
        let mut ledger = self.read_ledger()?;
        let counter = ledger.sequences.entry(period.to_string()).or_insert(0);
        *counter += 1;
        let sequence = *counter;
        self.write_ledger(&ledger)?;
        Ok(sequence)
    }
}
