//! Minimal student projection used by the ledger.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Guardian national ID (CNIC) as entered; see [`GuardianKey`]
    #[serde(default)]
    pub guardian_identity: String,
    pub class_name: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub monthly_fee: Decimal,
    #[serde(default)]
    pub status: StudentStatus,
}

impl Student {
    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }

    /// Normalized sibling join key, `None` when the guardian is unknown
    pub fn guardian_key(&self) -> Option<GuardianKey> {
        GuardianKey::parse(&self.guardian_identity)
    }
}

/// Normalized guardian identity.
///
/// "35201-1234567-1", "35201 1234567 1" and "3520112345671" all produce the
/// same key. Blank input never produces a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuardianKey(String);

impl GuardianKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(|c| c.to_uppercase())
            .collect();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuardianKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
