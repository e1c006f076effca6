use shared::{ClassCollectionRow, CollectionOverviewResponse};

use crate::backend::domain::commands::collections::CollectionOverview;
use crate::backend::domain::models::{money::to_f64, ClassCollectionSummary, SchoolCollectionSummary};

/// Row label used for the school-wide totals
pub const SCHOOL_ROW_LABEL: &str = "All Classes";

pub struct CollectionMapper;

impl CollectionMapper {
    pub fn to_row(summary: &ClassCollectionSummary) -> ClassCollectionRow {
        ClassCollectionRow {
            class_name: summary.class_name.clone(),
            total_students: summary.total_students,
            total_collectable: to_f64(summary.total_collectable),
            total_collected: to_f64(summary.total_collected),
            total_pending: to_f64(summary.total_pending),
            defaulters_count: summary.defaulters_count,
            collection_percentage: summary.collection_percentage(),
        }
    }

    pub fn school_to_row(summary: &SchoolCollectionSummary) -> ClassCollectionRow {
        ClassCollectionRow {
            class_name: SCHOOL_ROW_LABEL.to_string(),
            total_students: summary.total_students,
            total_collectable: to_f64(summary.total_collectable),
            total_collected: to_f64(summary.total_collected),
            total_pending: to_f64(summary.total_pending),
            defaulters_count: summary.defaulters_count,
            collection_percentage: summary.collection_percentage(),
        }
    }

    pub fn to_overview_response(overview: &CollectionOverview) -> CollectionOverviewResponse {
        CollectionOverviewResponse {
            period: overview.period.map(|p| p.to_string()),
            classes: overview.classes.iter().map(Self::to_row).collect(),
            school: Self::school_to_row(&overview.school),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::BillingPeriod;
    use rust_decimal::Decimal;

    #[test]
    fn test_overview_response() {
        let classes = vec![ClassCollectionSummary {
            class_name: "Class 5".to_string(),
            total_students: 3,
            total_collectable: Decimal::from(14000),
            total_collected: Decimal::from(9500),
            total_pending: Decimal::from(4500),
            defaulters_count: 1,
        }];
        let overview = CollectionOverview {
            period: BillingPeriod::new(2026, 10),
            school: SchoolCollectionSummary::from_classes(&classes),
            classes,
        };

        let response = CollectionMapper::to_overview_response(&overview);
        assert_eq!(response.period.as_deref(), Some("2026-10"));
        assert_eq!(response.classes[0].collection_percentage, 68);
        assert_eq!(response.classes[0].total_pending, 4500.0);
        assert_eq!(response.school.class_name, SCHOOL_ROW_LABEL);
        assert_eq!(response.school.total_students, 3);
    }
}
