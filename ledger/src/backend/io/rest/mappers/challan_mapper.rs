use shared::{ChallanListResponse, ChallanRow, StudentChallan, StudentChallanListResponse, StudentChallanStatus};

use crate::backend::domain::models::{money::to_f64, Challan};
use crate::backend::domain::publish_service::{PublishedChallan, PublishedStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct ChallanMapper;

impl ChallanMapper {
    /// Convert a ledger challan to an admin table row
    pub fn to_row(challan: &Challan) -> ChallanRow {
        ChallanRow {
            id: challan.id.clone(),
            challan_no: challan.challan_no.clone(),
            student_id: challan.student_id.clone(),
            class_name: challan.class_name.clone(),
            period: challan.period.to_string(),
            issue_date: challan.issue_date.format(DATE_FORMAT).to_string(),
            due_date: challan.due_date.format(DATE_FORMAT).to_string(),
            total_amount: to_f64(challan.total_amount),
            discount_amount: to_f64(challan.discount_amount),
            net_amount: to_f64(challan.net_amount),
            status: challan.status.as_str().to_string(),
            paid_date: challan.paid_date.map(|d| d.format(DATE_FORMAT).to_string()),
            payment_method: challan.payment_method.map(|m| m.as_str().to_string()),
            discounts: challan.applied_discounts.iter().map(|d| d.name.clone()).collect(),
        }
    }

    pub fn to_list_response(challans: &[Challan]) -> ChallanListResponse {
        ChallanListResponse {
            challans: challans.iter().map(Self::to_row).collect(),
        }
    }

    pub fn status_to_dto(status: PublishedStatus) -> StudentChallanStatus {
        match status {
            PublishedStatus::Pending => StudentChallanStatus::Pending,
            PublishedStatus::Overdue => StudentChallanStatus::Overdue,
            PublishedStatus::Paid => StudentChallanStatus::Paid,
        }
    }

    /// Convert a published challan to the student portal shape
    pub fn to_student_dto(published: PublishedChallan) -> StudentChallan {
        StudentChallan {
            id: published.id,
            student_id: published.student_id,
            challan_no: published.challan_no,
            title: published.title,
            due_date: published.due_date.format(DATE_FORMAT).to_string(),
            amount: published.amount_display,
            status: Self::status_to_dto(published.status),
            pdf_url: published.pdf_url,
            paid_date: published.paid_date.map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }

    pub fn to_student_list_response(student_id: &str, published: Vec<PublishedChallan>) -> StudentChallanListResponse {
        StudentChallanListResponse {
            student_id: student_id.to_string(),
            challans: published.into_iter().map(Self::to_student_dto).collect(),
        }
    }
}
