//! In-memory school used by the REST handler tests
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::backend::domain::commands::challans::GenerateClassChallansCommand;
use crate::backend::domain::models::{
    BillingPeriod, Challan, Discount, DiscountType, Eligibility, FeeHead, FeeStructure, Student,
    StudentStatus,
};
use crate::backend::storage::{CatalogStorage, Connection, LedgerConfig, MemoryConnection, RosterStorage};
use crate::backend::{build_state, AppState};

pub const ACADEMIC_YEAR: &str = "2026-2027";

fn student(id: &str, name: &str, guardian: &str, class_name: &str, status: StudentStatus) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        guardian_identity: guardian.to_string(),
        class_name: class_name.to_string(),
        section: "A".to_string(),
        monthly_fee: Decimal::from(5000),
        status,
    }
}

fn head(id: &str, name: &str, amount: i64, is_optional: bool) -> FeeHead {
    FeeHead {
        id: id.to_string(),
        name: name.to_string(),
        amount: Decimal::from(amount),
        is_optional,
    }
}

/// Two siblings and one other pupil in Class 5, an inactive Class 5 pupil
/// and one Class 3 pupil. Class 5 bills 5000 a month.
pub fn seed_school(connection: &MemoryConnection) {
    let roster = connection.create_roster_repository();
    for s in [
        student("STU-001", "Ayesha Khan", "35201-1234567-1", "Class 5", StudentStatus::Active),
        student("STU-002", "Bilal Khan", "35201 1234567 1", "Class 5", StudentStatus::Active),
        student("STU-003", "Sara Ali", "61101-7654321-3", "Class 5", StudentStatus::Active),
        student("STU-004", "Omar Shah", "42101-1111111-1", "Class 5", StudentStatus::Inactive),
        student("STU-005", "Zainab Raza", "42201-2222222-2", "Class 3", StudentStatus::Active),
    ] {
        roster.store_student(&s).unwrap();
    }

    let catalog = connection.create_catalog_repository();
    catalog
        .store_fee_structure(&FeeStructure::new(
            "Class 5",
            ACADEMIC_YEAR,
            vec![
                head("tuition", "Tuition Fee", 4000, false),
                head("lab", "Lab Fee", 600, false),
                head("sports", "Sports Fund", 400, false),
            ],
        ))
        .unwrap();
    catalog
        .store_fee_structure(&FeeStructure::new(
            "Class 3",
            ACADEMIC_YEAR,
            vec![head("tuition", "Tuition Fee", 2800, false), head("transport", "Transport", 200, true)],
        ))
        .unwrap();
    catalog
        .store_discount(&Discount {
            id: "sibling".to_string(),
            name: "Sibling Discount".to_string(),
            discount_type: DiscountType::Percentage,
            value: Decimal::from(10),
            description: String::new(),
            auto_apply: true,
            eligibility: Eligibility::Siblings,
            fee_head: None,
        })
        .unwrap();
}

pub fn seeded_state() -> AppState<MemoryConnection> {
    let connection = MemoryConnection::new();
    seed_school(&connection);
    build_state(connection, LedgerConfig::default()).unwrap()
}

/// Bill Class 5 for October 2026, due on the 10th
pub fn issue_october(state: &AppState<MemoryConnection>) -> Vec<Challan> {
    state
        .challan_service
        .generate_for_class(GenerateClassChallansCommand {
            class_name: "Class 5".to_string(),
            period: BillingPeriod::new(2026, 10).unwrap(),
            academic_year: ACADEMIC_YEAR.to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            due_date: None,
        })
        .unwrap()
        .issued
}
