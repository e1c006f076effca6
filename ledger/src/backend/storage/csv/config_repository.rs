//! # Ledger Config Repository
//!
//! Stores `ledger_config.yaml` at the root of the data directory. The file is
//! created with defaults the first time it is read.
//!
//! ```yaml
//! data_format_version: "1.0"
//! currency_symbol: Rs.
//! challan_prefix: CH
//! pdf_base_url: /challans
//! sibling_policy: all_members
//! publish_mode: first_write_wins
//! default_due_day: 10
//! ```

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::connection::{CsvConnection, CONFIG_FILE};

/// Which members of a sibling set receive sibling discounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiblingPolicy {
    /// Every member of the set
    #[default]
    AllMembers,
    /// Every member except the first one in roster order
    ExceptFirst,
}

/// How re-publishing an already published challan behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    /// The first published copy of an id is kept
    #[default]
    FirstWriteWins,
    /// The latest copy replaces the earlier one
    Upsert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Data format version for future migrations
    pub data_format_version: String,
    /// Label printed in front of student-facing amounts
    pub currency_symbol: String,
    pub challan_prefix: String,
    /// Base of the `pdf_url` handed to student views
    pub pdf_base_url: String,
    pub sibling_policy: SiblingPolicy,
    pub publish_mode: PublishMode,
    /// Day of the billing month a challan falls due when none is given
    pub default_due_day: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_format_version: "1.0".to_string(),
            currency_symbol: "Rs.".to_string(),
            challan_prefix: "CH".to_string(),
            pdf_base_url: "/challans".to_string(),
            sibling_policy: SiblingPolicy::default(),
            publish_mode: PublishMode::default(),
            default_due_day: 10,
        }
    }
}

#[derive(Clone)]
pub struct ConfigRepository {
    connection: CsvConnection,
}

impl ConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Load the config, writing the defaults if the file does not exist yet
    pub fn load_or_create(&self) -> Result<LedgerConfig> {
        match self.connection.read_optional(CONFIG_FILE)? {
            Some(contents) => {
                let config: LedgerConfig = serde_yaml::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", CONFIG_FILE))?;
                debug!("Loaded ledger config from {:?}", self.connection.file_path(CONFIG_FILE));
                Ok(config)
            }
            None => {
                let config = LedgerConfig::default();
                self.save(&config)?;
                info!("Created default ledger config at {:?}", self.connection.file_path(CONFIG_FILE));
                Ok(config)
            }
        }
    }

    pub fn save(&self, config: &LedgerConfig) -> Result<()> {
        let _guard = self.connection.lock_files();
        let yaml = serde_yaml::to_string(config)?;
        self.connection.write_atomically(CONFIG_FILE, &yaml)
    }
}
