//! Error taxonomy for ledger operations.
use rust_decimal::Decimal;

use crate::backend::domain::models::{BillingPeriod, ChallanStatus, DiscountValidationError};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Fee structure {structure_id} cannot be billed: {reason}")]
    InvalidFeeStructure { structure_id: String, reason: String },

    #[error("Invalid discount {discount_id}: {source}")]
    InvalidDiscount {
        discount_id: String,
        #[source]
        source: DiscountValidationError,
    },

    #[error("Challan {challan_no} is already {status}")]
    AlreadySettled { challan_no: String, status: ChallanStatus },

    #[error("Payment of {received} does not match net amount {expected} for challan {challan_no}")]
    AmountMismatch {
        challan_no: String,
        expected: Decimal,
        received: Decimal,
    },

    #[error("Student {student_id} already has challan {challan_no} for {period}")]
    DuplicateChallan {
        student_id: String,
        period: BillingPeriod,
        challan_no: String,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Stable machine-readable code for API consumers
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound { .. } => "not_found",
            LedgerError::InvalidFeeStructure { .. } => "invalid_fee_structure",
            LedgerError::InvalidDiscount { .. } => "invalid_discount",
            LedgerError::AlreadySettled { .. } => "already_settled",
            LedgerError::AmountMismatch { .. } => "amount_mismatch",
            LedgerError::DuplicateChallan { .. } => "duplicate_challan",
            LedgerError::Storage(_) => "storage_error",
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
