//! Domain model for a fee concession.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::round_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `value` is a percentage in [0, 100]
    Percentage,
    /// `value` is a currency amount
    Fixed,
}

/// Who an auto-applied discount is offered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// Members of a detected sibling set
    #[default]
    Siblings,
    /// Every active student
    Everyone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default)]
    pub eligibility: Eligibility,
    /// Fee head (id or name) this discount targets; whole challan when absent
    #[serde(default)]
    pub fee_head: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DiscountValidationError {
    #[error("Percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),
    #[error("Fixed discount cannot be negative, got {0}")]
    NegativeFixedAmount(Decimal),
    #[error("Discount name cannot be empty")]
    EmptyName,
}

impl Discount {
    pub fn validate(&self) -> Result<(), DiscountValidationError> {
        if self.name.trim().is_empty() {
            return Err(DiscountValidationError::EmptyName);
        }
        match self.discount_type {
            DiscountType::Percentage => {
                if self.value < Decimal::ZERO || self.value > Decimal::ONE_HUNDRED {
                    return Err(DiscountValidationError::PercentageOutOfRange(self.value));
                }
            }
            DiscountType::Fixed => {
                if self.value < Decimal::ZERO {
                    return Err(DiscountValidationError::NegativeFixedAmount(self.value));
                }
            }
        }
        Ok(())
    }

    /// Reduction this discount yields against `base`, not yet capped
    pub fn reduction_on(&self, base: Decimal) -> Decimal {
        match self.discount_type {
            DiscountType::Percentage => round_money(base * self.value / Decimal::ONE_HUNDRED),
            DiscountType::Fixed => round_money(self.value),
        }
    }

    pub fn is_targeted(&self) -> bool {
        self.fee_head.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discount(discount_type: DiscountType, value: i64) -> Discount {
        Discount {
            id: "sibling".to_string(),
            name: "Sibling Discount".to_string(),
            discount_type,
            value: Decimal::from(value),
            description: "Second child onwards".to_string(),
            auto_apply: true,
            eligibility: Eligibility::Siblings,
            fee_head: None,
        }
    }

    #[test]
    fn test_percentage_reduction() {
        let d = discount(DiscountType::Percentage, 10);
        assert_eq!(d.reduction_on(Decimal::from(5000)), Decimal::from(500));
    }

    #[test]
    fn test_fixed_reduction_ignores_base() {
        let d = discount(DiscountType::Fixed, 750);
        assert_eq!(d.reduction_on(Decimal::from(5000)), Decimal::from(750));
        assert_eq!(d.reduction_on(Decimal::from(100)), Decimal::from(750));
    }

    #[test]
    fn test_validate_ranges() {
        assert!(discount(DiscountType::Percentage, 100).validate().is_ok());
        assert_eq!(
            discount(DiscountType::Percentage, 101).validate(),
            Err(DiscountValidationError::PercentageOutOfRange(Decimal::from(101)))
        );
        assert_eq!(
            discount(DiscountType::Fixed, -1).validate(),
            Err(DiscountValidationError::NegativeFixedAmount(Decimal::from(-1)))
        );
    }
}
