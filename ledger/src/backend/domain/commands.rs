//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer and the CLI map the DTOs in
//! the `shared` crate (or command-line arguments) to these internal types.

pub mod challans {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::backend::domain::models::{BillingPeriod, Challan, PaymentMethod};

    /// Input for issuing one challan.
    #[derive(Debug, Clone)]
    pub struct GenerateChallanCommand {
        pub student_id: String,
        pub period: BillingPeriod,
        /// Academic year of the fee structure to bill, e.g. "2026-2027"
        pub academic_year: String,
        pub issue_date: NaiveDate,
        /// Falls back to the configured due day of the billing month
        pub due_date: Option<NaiveDate>,
        /// Ids of non-auto discounts granted to this student
        pub manual_discount_ids: Vec<String>,
        /// Optional fee heads (id or name) the student opted out of
        pub excluded_fee_heads: Vec<String>,
    }

    /// Result of issuing one challan.
    #[derive(Debug, Clone)]
    pub struct GenerateChallanResult {
        pub challan: Challan,
        pub success_message: String,
    }

    /// Input for billing every active student of a class.
    #[derive(Debug, Clone)]
    pub struct GenerateClassChallansCommand {
        pub class_name: String,
        pub period: BillingPeriod,
        pub academic_year: String,
        pub issue_date: NaiveDate,
        pub due_date: Option<NaiveDate>,
    }

    /// A student the batch run did not bill, with the reason.
    #[derive(Debug, Clone, PartialEq)]
    pub struct SkippedStudent {
        pub student_id: String,
        pub reason: String,
    }

    /// Result of a batch billing run.
    #[derive(Debug, Clone)]
    pub struct GenerateClassChallansResult {
        pub issued: Vec<Challan>,
        pub skipped: Vec<SkippedStudent>,
        pub success_message: String,
    }

    /// Input for settling a challan.
    #[derive(Debug, Clone)]
    pub struct RecordPaymentCommand {
        pub challan_id: String,
        pub amount: Decimal,
        pub method: PaymentMethod,
        pub date: NaiveDate,
    }

    /// Result of settling a challan.
    #[derive(Debug, Clone)]
    pub struct RecordPaymentResult {
        pub challan: Challan,
        pub success_message: String,
    }

    /// Result of an overdue sweep.
    #[derive(Debug, Clone, Default)]
    pub struct MarkOverdueResult {
        /// Ids that moved from pending to overdue in this sweep
        pub transitioned_ids: Vec<String>,
    }
}

pub mod collections {
    use crate::backend::domain::models::{
        BillingPeriod, ClassCollectionSummary, SchoolCollectionSummary,
    };

    /// Query for the collection overview.
    #[derive(Debug, Clone, Default)]
    pub struct CollectionQuery {
        /// Only challans of this billing month; all challans when absent
        pub period: Option<BillingPeriod>,
    }

    #[derive(Debug, Clone)]
    pub struct CollectionOverview {
        pub period: Option<BillingPeriod>,
        pub classes: Vec<ClassCollectionSummary>,
        pub school: SchoolCollectionSummary,
    }
}
