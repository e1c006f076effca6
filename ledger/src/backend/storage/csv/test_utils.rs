//! Test utilities for file-backed storage tests
//!
//! `TestEnvironment` owns a temporary data directory that is removed when the
//! environment is dropped, even if the test panics.
use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::connection::{CsvConnection, STUDENTS_FILE};

pub struct TestEnvironment {
    /// Kept alive so the directory is not removed before the test ends
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("fee_ledger_")?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }

    /// Seed the data directory with a small school: two siblings in Class 5,
    /// one unrelated Class 5 student, one inactive student and a Class 3 pupil.
    pub fn seed_school(&self) -> Result<()> {
        self.connection.write_atomically(
            STUDENTS_FILE,
            "id,name,guardian_identity,class,section,monthly_fee,status\n\
             STU-001,Ayesha Khan,35201-1234567-1,Class 5,A,5000,active\n\
             STU-002,Bilal Khan,35201 1234567 1,Class 5,B,5000,active\n\
             STU-003,Sara Ali,61101-7654321-3,Class 5,A,5000,active\n\
             STU-004,Omar Shah,42101-1111111-1,Class 5,A,5000,inactive\n\
             STU-005,Zainab Raza,42201-2222222-2,Class 3,A,3000,active\n",
        )?;
        self.connection.write_atomically(
            super::connection::FEE_STRUCTURES_FILE,
            "- class_name: Class 5\n  academic_year: 2026-2027\n  items:\n    \
             - { id: tuition, name: Tuition Fee, amount: 4000 }\n    \
             - { id: lab, name: Lab Fee, amount: 600 }\n    \
             - { id: sports, name: Sports Fund, amount: 400 }\n\
             - class_name: Class 3\n  academic_year: 2026-2027\n  items:\n    \
             - { id: tuition, name: Tuition Fee, amount: 2800 }\n    \
             - { id: transport, name: Transport, amount: 200, is_optional: true }\n",
        )?;
        self.connection.write_atomically(
            super::connection::DISCOUNTS_FILE,
            "- id: sibling\n  name: Sibling Discount\n  type: percentage\n  value: 10\n  \
             description: Ten percent off for every enrolled sibling\n  auto_apply: true\n  \
             eligibility: siblings\n\
             - id: merit\n  name: Merit Scholarship\n  type: fixed\n  value: 1000\n  \
             description: Awarded by the principal\n  auto_apply: false\n  eligibility: everyone\n",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::traits::{CatalogStorage, Connection, RosterStorage};
    use rust_decimal::Decimal;

    #[test]
    fn test_environment_cleanup() -> Result<()> {
        let base_path;
        {
            let env = TestEnvironment::new()?;
            base_path = env.base_directory().to_path_buf();
            assert!(base_path.exists());
            std::fs::write(base_path.join("scratch.txt"), "test data")?;
        }
        assert!(!base_path.exists());
        Ok(())
    }

    #[test]
    fn test_seeded_school_loads() -> Result<()> {
        let env = TestEnvironment::new()?;
        env.seed_school()?;

        let students = env.connection.create_roster_repository().list_students()?;
        assert_eq!(students.len(), 5);

        let catalog = env.connection.create_catalog_repository();
        let structures = catalog.list_fee_structures()?;
        assert_eq!(structures[0].total_amount, Decimal::from(5000));
        assert_eq!(structures[1].total_amount, Decimal::from(3000));
        assert_eq!(catalog.list_discounts()?.len(), 2);
        Ok(())
    }
}
