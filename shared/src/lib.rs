use serde::{Deserialize, Serialize};
use std::fmt;

/// Status vocabulary shown on the student portal.
///
/// The admin side tracks four states; students only ever see these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentChallanStatus {
    Pending,
    Overdue,
    Paid,
}

impl fmt::Display for StudentChallanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StudentChallanStatus::Pending => "Pending",
            StudentChallanStatus::Overdue => "Overdue",
            StudentChallanStatus::Paid => "Paid",
        };
        write!(f, "{}", label)
    }
}

/// A challan as rendered on the student portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentChallan {
    /// Ledger id of the challan (dedup key for publishing)
    pub id: String,
    pub student_id: String,
    /// Human-readable challan number printed on the slip
    pub challan_no: String,
    /// Display title, e.g. "Fee Challan - October 2026"
    pub title: String,
    /// Due date (YYYY-MM-DD)
    pub due_date: String,
    /// Net payable amount, already formatted for display ("Rs. 4,500")
    pub amount: String,
    pub status: StudentChallanStatus,
    /// Link to the printable slip
    pub pdf_url: String,
    /// Payment date (YYYY-MM-DD) once paid
    pub paid_date: Option<String>,
}

impl StudentChallan {
    /// True for challans the student still has to pay
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self.status,
            StudentChallanStatus::Pending | StudentChallanStatus::Overdue
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentChallanListResponse {
    pub student_id: String,
    pub challans: Vec<StudentChallan>,
}

/// Admin dashboard row for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCollectionRow {
    pub class_name: String,
    pub total_students: usize,
    pub total_collectable: f64,
    pub total_collected: f64,
    pub total_pending: f64,
    pub defaulters_count: usize,
    /// Whole-number percentage (0-100)
    pub collection_percentage: u32,
}

/// Admin dashboard collection overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionOverviewResponse {
    /// Billing period filter the figures were computed for ("2026-10"), if any
    pub period: Option<String>,
    pub classes: Vec<ClassCollectionRow>,
    pub school: ClassCollectionRow,
}

/// A detected sibling group, for showing why a sibling discount was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiblingGroup {
    /// Normalized guardian identity shared by the group
    pub guardian_identity: String,
    pub student_ids: Vec<String>,
    pub student_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiblingGroupsResponse {
    pub groups: Vec<SiblingGroup>,
}

/// Admin table row for an issued challan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallanRow {
    pub id: String,
    pub challan_no: String,
    pub student_id: String,
    pub class_name: String,
    pub period: String,
    pub issue_date: String,
    pub due_date: String,
    pub total_amount: f64,
    pub discount_amount: f64,
    pub net_amount: f64,
    /// Admin vocabulary: pending, overdue, paid, cancelled
    pub status: String,
    pub paid_date: Option<String>,
    pub payment_method: Option<String>,
    /// Names of discounts applied to this challan
    pub discounts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallanListResponse {
    pub challans: Vec<ChallanRow>,
}

/// Request body for recording a payment against a challan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: f64,
    /// cash, bank_transfer, online, cheque
    pub method: String,
    /// Payment date (YYYY-MM-DD)
    pub date: String,
}

/// Request body for the overdue sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkOverdueRequest {
    /// Cut-off date (YYYY-MM-DD); challans due strictly before it become overdue
    pub as_of: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkOverdueResponse {
    pub transitioned_ids: Vec<String>,
    pub success_message: String,
}

/// Error body returned by the REST layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_challan_serializes_status_labels() {
        let challan = StudentChallan {
            id: "challan::1".to_string(),
            student_id: "STU-001".to_string(),
            challan_no: "CH-202610-STU-001-0001".to_string(),
            title: "Fee Challan - October 2026".to_string(),
            due_date: "2026-10-10".to_string(),
            amount: "Rs. 4,500".to_string(),
            status: StudentChallanStatus::Overdue,
            pdf_url: "/challans/CH-202610-STU-001-0001.pdf".to_string(),
            paid_date: None,
        };

        let json = serde_json::to_value(&challan).unwrap();
        assert_eq!(json["status"], "Overdue");
        assert_eq!(json["paid_date"], serde_json::Value::Null);
        assert!(challan.is_outstanding());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StudentChallanStatus::Pending.to_string(), "Pending");
        assert_eq!(StudentChallanStatus::Paid.to_string(), "Paid");
    }
}
