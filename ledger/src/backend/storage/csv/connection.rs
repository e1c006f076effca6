use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::catalog_repository::CatalogRepository;
use super::challan_repository::ChallanRepository;
use super::roster_repository::RosterRepository;
use crate::backend::storage::traits::Connection;

pub const STUDENTS_FILE: &str = "students.csv";
pub const FEE_STRUCTURES_FILE: &str = "fee_structures.yaml";
pub const DISCOUNTS_FILE: &str = "discounts.yaml";
pub const CHALLANS_FILE: &str = "challans.yaml";
pub const CONFIG_FILE: &str = "ledger_config.yaml";

/// CsvConnection manages the data directory and serializes file rewrites
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    file_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new connection, creating the base directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            file_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.base_directory.join(file_name)
    }

    /// Hold this guard across a read-modify-write of any data file
    pub fn lock_files(&self) -> MutexGuard<'_, ()> {
        // A poisoned lock only means another writer panicked; the files on disk are
        // still whole because every write goes through a rename.
        self.file_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write to a temp file, then rename over the target
    pub fn write_atomically(&self, file_name: &str, contents: &str) -> Result<()> {
        let path = self.file_path(file_name);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        debug!("Saved {:?}", path);
        Ok(())
    }

    /// Read a data file, `None` when it does not exist yet
    pub fn read_optional(&self, file_name: &str) -> Result<Option<String>> {
        let path = self.file_path(file_name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(contents))
    }
}

impl Connection for CsvConnection {
    type ChallanRepository = ChallanRepository;
    type RosterRepository = RosterRepository;
    type CatalogRepository = CatalogRepository;

    fn create_challan_repository(&self) -> Self::ChallanRepository {
        ChallanRepository::new(self.clone())
    }

    fn create_roster_repository(&self) -> Self::RosterRepository {
        RosterRepository::new(self.clone())
    }

    fn create_catalog_repository(&self) -> Self::CatalogRepository {
        CatalogRepository::new(self.clone())
    }
}
