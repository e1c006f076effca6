//! Class and school collection summaries for admin dashboards.
//!
//! Classes are taken from the roster, in the order they first appear there,
//! and challans are attributed to the class the student is in now.
//! A challan whose student is no longer on the roster counts toward the class
//! it was billed to; one that names no class is skipped with a warning.

use log::warn;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::backend::domain::commands::collections::{CollectionOverview, CollectionQuery};
use crate::backend::domain::errors::LedgerResult;
use crate::backend::domain::models::{
    BillingPeriod, Challan, ChallanStatus, ClassCollectionSummary, SchoolCollectionSummary, Student,
};
use crate::backend::storage::{ChallanStorage, Connection, RosterStorage};

/// Summarise `challans` per class of `students`
pub fn aggregate(challans: &[Challan], students: &[Student]) -> Vec<ClassCollectionSummary> {
    aggregate_period(challans, students, None)
}

/// Like [`aggregate`], restricted to one billing month when `period` is set
pub fn aggregate_period(
    challans: &[Challan],
    students: &[Student],
    period: Option<BillingPeriod>,
) -> Vec<ClassCollectionSummary> {
    let mut summaries: Vec<ClassCollectionSummary> = Vec::new();
    let mut class_index: HashMap<String, usize> = HashMap::new();
    let mut student_class: HashMap<&str, usize> = HashMap::new();

    for student in students {
        let class_key = student.class_name.trim().to_lowercase();
        let index = *class_index.entry(class_key).or_insert_with(|| {
            summaries.push(ClassCollectionSummary::empty(student.class_name.trim()));
            summaries.len() - 1
        });
        if student.is_active() {
            summaries[index].total_students += 1;
        }
        student_class.insert(student.id.as_str(), index);
    }

    let mut defaulters: Vec<HashSet<&str>> = vec![HashSet::new(); summaries.len()];
    for challan in challans {
        if period.is_some_and(|p| p != challan.period) {
            continue;
        }
        let index = match student_class.get(challan.student_id.as_str()) {
            Some(&index) => index,
            None => {
                let billed_class = challan.class_name.trim();
                if billed_class.is_empty() {
                    warn!(
                        "Challan {} belongs to unknown student {} and names no class, left out of collection totals",
                        challan.challan_no, challan.student_id
                    );
                    continue;
                }
                *class_index.entry(billed_class.to_lowercase()).or_insert_with(|| {
                    summaries.push(ClassCollectionSummary::empty(billed_class));
                    defaulters.push(HashSet::new());
                    summaries.len() - 1
                })
            }
        };

        let summary = &mut summaries[index];
        match challan.status {
            ChallanStatus::Cancelled => continue,
            ChallanStatus::Paid => {
                summary.total_collectable += challan.net_amount;
                summary.total_collected += challan.net_amount;
            }
            ChallanStatus::Overdue => {
                summary.total_collectable += challan.net_amount;
                defaulters[index].insert(challan.student_id.as_str());
            }
            ChallanStatus::Pending => summary.total_collectable += challan.net_amount,
        }
    }

    for (summary, class_defaulters) in summaries.iter_mut().zip(defaulters) {
        summary.total_pending = summary.total_collectable - summary.total_collected;
        summary.defaulters_count = class_defaulters.len();
    }

    // Classes made up only of former students with nothing billed are noise
    summaries.retain(|s| s.total_students > 0 || s.total_collectable > Decimal::ZERO);
    summaries
}

#[derive(Clone)]
pub struct CollectionService<C: Connection> {
    challan_repository: C::ChallanRepository,
    roster_repository: C::RosterRepository,
}

impl<C: Connection> CollectionService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            challan_repository: connection.create_challan_repository(),
            roster_repository: connection.create_roster_repository(),
        }
    }

    pub fn class_summaries(&self, period: Option<BillingPeriod>) -> LedgerResult<Vec<ClassCollectionSummary>> {
        let challans = self.challan_repository.list_challans()?;
        let students = self.roster_repository.list_students()?;
        Ok(aggregate_period(&challans, &students, period))
    }

    pub fn school_summary(&self, period: Option<BillingPeriod>) -> LedgerResult<SchoolCollectionSummary> {
        Ok(SchoolCollectionSummary::from_classes(&self.class_summaries(period)?))
    }

    pub fn overview(&self, query: CollectionQuery) -> LedgerResult<CollectionOverview> {
        let classes = self.class_summaries(query.period)?;
        let school = SchoolCollectionSummary::from_classes(&classes);
        Ok(CollectionOverview {
            period: query.period,
            classes,
            school,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{ChallanLineItem, StudentStatus};
    use chrono::NaiveDate;

    fn student(id: &str, class_name: &str) -> Student {
        Student {
            id: id.to_string(),
            name: id.to_string(),
            guardian_identity: String::new(),
            class_name: class_name.to_string(),
            section: "A".to_string(),
            monthly_fee: Decimal::ZERO,
            status: StudentStatus::Active,
        }
    }

    fn challan(student_id: &str, month: u32, net: i64, status: ChallanStatus) -> Challan {
        Challan {
            id: format!("challan::{}-{}", student_id, month),
            challan_no: format!("CH-2026{:02}-{}-0001", month, student_id),
            student_id: student_id.to_string(),
            class_name: String::new(),
            period: BillingPeriod::new(2026, month).unwrap(),
            issue_date: NaiveDate::from_ymd_opt(2026, month, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, month, 10).unwrap(),
            line_items: vec![ChallanLineItem {
                id: "tuition".to_string(),
                name: "Tuition Fee".to_string(),
                amount: Decimal::from(net),
                discount: None,
            }],
            applied_discounts: Vec::new(),
            total_amount: Decimal::from(net),
            discount_amount: Decimal::ZERO,
            net_amount: Decimal::from(net),
            status,
            paid_amount: None,
            paid_date: None,
            payment_method: None,
        }
    }

    #[test]
    fn test_class_totals() {
        let students = vec![student("S1", "Class 5"), student("S2", "Class 5"), student("S3", "Class 3")];
        let challans = vec![
            challan("S1", 10, 4500, ChallanStatus::Paid),
            challan("S2", 10, 4500, ChallanStatus::Overdue),
            challan("S2", 9, 4500, ChallanStatus::Overdue),
            challan("S3", 10, 3000, ChallanStatus::Cancelled),
        ];

        let summaries = aggregate(&challans, &students);
        assert_eq!(summaries.len(), 2);

        let class_five = &summaries[0];
        assert_eq!(class_five.class_name, "Class 5");
        assert_eq!(class_five.total_students, 2);
        assert_eq!(class_five.total_collectable, Decimal::from(13500));
        assert_eq!(class_five.total_collected, Decimal::from(4500));
        assert_eq!(class_five.total_pending, Decimal::from(9000));
        assert_eq!(class_five.defaulters_count, 1);
        assert_eq!(class_five.collection_percentage(), 33);

        let class_three = &summaries[1];
        assert_eq!(class_three.total_collectable, Decimal::ZERO);
        assert_eq!(class_three.collection_percentage(), 0);
    }

    #[test]
    fn test_period_filter() {
        let students = vec![student("S1", "Class 5")];
        let challans = vec![
            challan("S1", 9, 4500, ChallanStatus::Overdue),
            challan("S1", 10, 4500, ChallanStatus::Paid),
        ];

        let october = aggregate_period(&challans, &students, BillingPeriod::new(2026, 10));
        assert_eq!(october[0].total_collectable, Decimal::from(4500));
        assert_eq!(october[0].defaulters_count, 0);
        assert_eq!(october[0].collection_percentage(), 100);
    }

    #[test]
    fn test_unknown_students_without_class_are_skipped() {
        let students = vec![student("S1", "Class 5")];
        let challans = vec![challan("GHOST", 10, 4500, ChallanStatus::Paid)];
        let summaries = aggregate(&challans, &students);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_collected, Decimal::ZERO);
    }

    #[test]
    fn test_departed_students_count_toward_billed_class() {
        let students = vec![student("S1", "Class 5")];
        let mut same_class = challan("LEFT-1", 10, 4500, ChallanStatus::Paid);
        same_class.class_name = " class 5 ".to_string();
        let mut closed_class = challan("LEFT-2", 10, 3000, ChallanStatus::Overdue);
        closed_class.class_name = "Class 8".to_string();

        let summaries = aggregate(&[same_class, closed_class], &students);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].class_name, "Class 5");
        assert_eq!(summaries[0].total_students, 1);
        assert_eq!(summaries[0].total_collected, Decimal::from(4500));
        assert_eq!(summaries[1].class_name, "Class 8");
        assert_eq!(summaries[1].total_students, 0);
        assert_eq!(summaries[1].total_pending, Decimal::from(3000));
        assert_eq!(summaries[1].defaulters_count, 1);

        let school = SchoolCollectionSummary::from_classes(&summaries);
        assert_eq!(school.total_collectable, Decimal::from(7500));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(aggregate(&[], &[]).is_empty());
        let school = SchoolCollectionSummary::from_classes(&aggregate(&[], &[student("S1", "Class 1")]));
        assert_eq!(school.total_students, 1);
        assert_eq!(school.collection_percentage(), 0);
    }

    #[test]
    fn test_inactive_students_count_only_their_bills() {
        let mut left = student("S1", "Class 5");
        left.status = StudentStatus::Inactive;
        let challans = vec![challan("S1", 10, 4500, ChallanStatus::Overdue)];

        let summaries = aggregate(&challans, &[left.clone()]);
        assert_eq!(summaries[0].total_students, 0);
        assert_eq!(summaries[0].defaulters_count, 1);

        assert!(aggregate(&[], &[left]).is_empty());
    }
}
