//! Derived collection figures for admin dashboards.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::whole_percentage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCollectionSummary {
    pub class_name: String,
    pub total_students: usize,
    pub total_collectable: Decimal,
    pub total_collected: Decimal,
    pub total_pending: Decimal,
    pub defaulters_count: usize,
}

impl ClassCollectionSummary {
    pub fn empty(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            total_students: 0,
            total_collectable: Decimal::ZERO,
            total_collected: Decimal::ZERO,
            total_pending: Decimal::ZERO,
            defaulters_count: 0,
        }
    }

    /// round(collected / collectable * 100), 0 when nothing is collectable
    pub fn collection_percentage(&self) -> u32 {
        whole_percentage(self.total_collected, self.total_collectable)
    }
}

/// School-wide roll-up of every class summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolCollectionSummary {
    pub total_classes: usize,
    pub total_students: usize,
    pub total_collectable: Decimal,
    pub total_collected: Decimal,
    pub total_pending: Decimal,
    pub defaulters_count: usize,
}

impl SchoolCollectionSummary {
    pub fn from_classes(classes: &[ClassCollectionSummary]) -> Self {
        classes.iter().fold(
            Self {
                total_classes: classes.len(),
                total_students: 0,
                total_collectable: Decimal::ZERO,
                total_collected: Decimal::ZERO,
                total_pending: Decimal::ZERO,
                defaulters_count: 0,
            },
            |mut acc, class| {
                acc.total_students += class.total_students;
                acc.total_collectable += class.total_collectable;
                acc.total_collected += class.total_collected;
                acc.total_pending += class.total_pending;
                acc.defaulters_count += class.defaulters_count;
                acc
            },
        )
    }

    pub fn collection_percentage(&self) -> u32 {
        whole_percentage(self.total_collected, self.total_collectable)
    }
}
