//! Domain model for a class fee structure.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::round_money;

/// A named amount billed on every challan of a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeHead {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub is_optional: bool,
}

/// Fee heads billed to one class for one academic year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeStructure {
    pub id: String,
    pub class_name: String,
    /// e.g. "2026-2027"
    pub academic_year: String,
    pub items: Vec<FeeHead>,
    pub total_amount: Decimal,
}

impl FeeStructure {
    /// Build a structure, computing the total from its items
    pub fn new(
        class_name: impl Into<String>,
        academic_year: impl Into<String>,
        items: Vec<FeeHead>,
    ) -> Self {
        let class_name = class_name.into();
        let academic_year = academic_year.into();
        let items: Vec<FeeHead> = items
            .into_iter()
            .map(|item| FeeHead {
                amount: round_money(item.amount),
                ..item
            })
            .collect();
        let total_amount = Self::sum_items(&items);
        Self {
            id: Self::generate_id(&class_name, &academic_year),
            class_name,
            academic_year,
            items,
            total_amount,
        }
    }

    /// Structure ID in format `fee::<class>::<year>`
    pub fn generate_id(class_name: &str, academic_year: &str) -> String {
        format!("fee::{}::{}", class_name.trim().to_lowercase().replace(' ', "_"), academic_year)
    }

    pub fn sum_items(items: &[FeeHead]) -> Decimal {
        items.iter().map(|item| item.amount).sum()
    }

    /// First fee head with a negative amount, if any
    pub fn negative_item(&self) -> Option<&FeeHead> {
        self.items.iter().find(|item| item.amount < Decimal::ZERO)
    }

    /// Reason the structure cannot be billed: a negative head or a total
    /// that is not positive
    pub fn validate(&self) -> Result<(), String> {
        if let Some(item) = self.negative_item() {
            return Err(format!("fee head {} has negative amount {}", item.id, item.amount));
        }
        if self.total_amount <= Decimal::ZERO {
            return Err(format!("total {} is not positive", self.total_amount));
        }
        Ok(())
    }

    /// Whether the stored total agrees with the items
    pub fn is_consistent(&self) -> bool {
        self.total_amount == Self::sum_items(&self.items)
    }

    /// Case-insensitive class match, the way rosters spell classes loosely
    pub fn matches(&self, class_name: &str, academic_year: &str) -> bool {
        self.class_name.trim().eq_ignore_ascii_case(class_name.trim())
            && self.academic_year.trim() == academic_year.trim()
    }

    pub fn find_item(&self, name_or_id: &str) -> Option<&FeeHead> {
        self.items
            .iter()
            .find(|item| item.id == name_or_id || item.name.eq_ignore_ascii_case(name_or_id))
    }
}
