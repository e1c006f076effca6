//! Challan lifecycle: issuing, settling, overdue sweeps and cancellation.
//!
//! ```text
//! pending ──► paid
//!    │          ▲
//!    ▼          │
//! overdue ──────┘
//!
//! pending | overdue ──► cancelled
//! ```
//!
//! `paid` and `cancelled` are terminal. Every mutation runs under one lock
//! so the duplicate check, sequence allocation and store of a new challan
//! cannot interleave with another writer.

use anyhow::anyhow;
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::domain::catalog_service::CatalogService;
use crate::backend::domain::challan_generator::{generate_challan, IssueDetails};
use crate::backend::domain::commands::challans::{
    GenerateChallanCommand, GenerateChallanResult, GenerateClassChallansCommand,
    GenerateClassChallansResult, MarkOverdueResult, RecordPaymentCommand, RecordPaymentResult,
    SkippedStudent,
};
use crate::backend::domain::errors::{LedgerError, LedgerResult};
use crate::backend::domain::models::{
    money::round_money, BillingPeriod, Challan, ChallanStatus, Discount, Eligibility, FeeStructure,
    Student,
};
use crate::backend::domain::publish_service::PublishService;
use crate::backend::domain::sibling_service::{SiblingIndex, SiblingService};
use crate::backend::storage::{ChallanStorage, Connection, LedgerConfig, RosterStorage};

#[derive(Clone)]
pub struct ChallanService<C: Connection> {
    challan_repository: C::ChallanRepository,
    roster_repository: C::RosterRepository,
    catalog_service: CatalogService<C>,
    sibling_service: SiblingService<C>,
    publisher: Option<PublishService>,
    config: LedgerConfig,
    mutation_lock: Arc<Mutex<()>>,
}

impl<C: Connection> ChallanService<C> {
    pub fn new(connection: &C, config: LedgerConfig) -> Self {
        Self {
            challan_repository: connection.create_challan_repository(),
            roster_repository: connection.create_roster_repository(),
            catalog_service: CatalogService::new(connection),
            sibling_service: SiblingService::new(connection),
            publisher: None,
            config,
            mutation_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Push every issued or changed challan into the student-facing store
    pub fn with_publisher(mut self, publisher: PublishService) -> Self {
        self.publisher = Some(publisher);
        self
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.mutation_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, challans: &[Challan]) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(challans);
        }
    }

    /// Issue one challan for a student
    pub fn generate_challan(&self, command: GenerateChallanCommand) -> LedgerResult<GenerateChallanResult> {
        info!("Generating challan for {} ({})", command.student_id, command.period);

        let student = self
            .roster_repository
            .get_student(&command.student_id)?
            .ok_or_else(|| LedgerError::not_found("Student", command.student_id.clone()))?;
        if !student.is_active() {
            warn!("Issuing challan to inactive student {}", student.id);
        }

        let fee_structure = self
            .catalog_service
            .get_fee_structure(&student.class_name, &command.academic_year)?;
        let index = self.sibling_service.build_index()?;
        let auto_discounts = self.catalog_service.list_auto_apply_discounts()?;
        let mut discounts = self.eligible_discounts(&student, &auto_discounts, &index);
        for discount_id in &command.manual_discount_ids {
            let discount = self.catalog_service.get_discount(discount_id)?;
            if !discounts.iter().any(|d| d.id == discount.id) {
                discounts.push(discount);
            }
        }

        let due_date = self.resolve_due_date(command.period, command.due_date)?;
        let challan = self.issue(
            &student,
            command.period,
            &fee_structure,
            &discounts,
            command.issue_date,
            due_date,
            command.excluded_fee_heads,
        )?;

        let success_message = format!(
            "Challan {} issued to {} for {}",
            challan.challan_no,
            student.name,
            command.period.label()
        );
        Ok(GenerateChallanResult {
            challan,
            success_message,
        })
    }

    /// Issue challans to every active student of a class. Students who
    /// already hold a challan for the period are reported, not re-billed.
    pub fn generate_for_class(
        &self,
        command: GenerateClassChallansCommand,
    ) -> LedgerResult<GenerateClassChallansResult> {
        info!("Billing {} for {}", command.class_name, command.period);

        let fee_structure = self
            .catalog_service
            .get_fee_structure(&command.class_name, &command.academic_year)?;
        let index = self.sibling_service.build_index()?;
        let auto_discounts = self.catalog_service.list_auto_apply_discounts()?;
        let due_date = self.resolve_due_date(command.period, command.due_date)?;

        let students: Vec<Student> = self
            .roster_repository
            .list_students()?
            .into_iter()
            .filter(|s| s.is_active() && s.class_name.trim().eq_ignore_ascii_case(command.class_name.trim()))
            .collect();

        let mut issued = Vec::new();
        let mut skipped = Vec::new();
        for student in &students {
            let discounts = self.eligible_discounts(student, &auto_discounts, &index);
            match self.issue(
                student,
                command.period,
                &fee_structure,
                &discounts,
                command.issue_date,
                due_date,
                Vec::new(),
            ) {
                Ok(challan) => issued.push(challan),
                Err(LedgerError::DuplicateChallan { challan_no, .. }) => skipped.push(SkippedStudent {
                    student_id: student.id.clone(),
                    reason: format!("already billed on {}", challan_no),
                }),
                Err(e) => return Err(e),
            }
        }

        let success_message = format!(
            "Issued {} challans to {} for {} ({} skipped)",
            issued.len(),
            command.class_name,
            command.period.label(),
            skipped.len()
        );
        info!("{}", success_message);
        Ok(GenerateClassChallansResult {
            issued,
            skipped,
            success_message,
        })
    }

    /// Auto-apply discounts this student qualifies for
    fn eligible_discounts(&self, student: &Student, auto_discounts: &[Discount], index: &SiblingIndex) -> Vec<Discount> {
        auto_discounts
            .iter()
            .filter(|d| match d.eligibility {
                Eligibility::Everyone => true,
                Eligibility::Siblings => index.is_eligible(&student.id, self.config.sibling_policy),
            })
            .cloned()
            .collect()
    }

    fn resolve_due_date(&self, period: BillingPeriod, due_date: Option<NaiveDate>) -> LedgerResult<NaiveDate> {
        match due_date {
            Some(date) => Ok(date),
            None => period.day(self.config.default_due_day).ok_or_else(|| {
                LedgerError::Storage(anyhow!(
                    "No valid due day {} in {}",
                    self.config.default_due_day,
                    period
                ))
            }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn issue(
        &self,
        student: &Student,
        period: BillingPeriod,
        fee_structure: &FeeStructure,
        discounts: &[Discount],
        issue_date: NaiveDate,
        due_date: NaiveDate,
        excluded_fee_heads: Vec<String>,
    ) -> LedgerResult<Challan> {
        let _guard = self.lock();

        if let Some(existing) = self
            .challan_repository
            .list_challans_for_student(&student.id)?
            .into_iter()
            .find(|c| c.period == period && c.status != ChallanStatus::Cancelled)
        {
            return Err(LedgerError::DuplicateChallan {
                student_id: student.id.clone(),
                period,
                challan_no: existing.challan_no,
            });
        }

        let sequence = self.challan_repository.next_sequence(period)?;
        let challan_no = Challan::format_number(&self.config.challan_prefix, period, &student.id, sequence);
        let challan = generate_challan(
            student,
            period,
            fee_structure,
            discounts,
            IssueDetails {
                challan_no,
                issue_date,
                due_date,
                excluded_fee_heads,
            },
        )?;
        self.challan_repository.store_challan(&challan)?;
        info!(
            "Issued challan {} to {}: net {}",
            challan.challan_no, student.id, challan.net_amount
        );

        self.publish(std::slice::from_ref(&challan));
        Ok(challan)
    }

    /// Settle a challan in full
    pub fn record_payment(&self, command: RecordPaymentCommand) -> LedgerResult<RecordPaymentResult> {
        let _guard = self.lock();
        let mut challan = self.get_challan(&command.challan_id)?;

        if challan.status.is_terminal() {
            return Err(LedgerError::AlreadySettled {
                challan_no: challan.challan_no,
                status: challan.status,
            });
        }
        let received = round_money(command.amount);
        if received != challan.net_amount {
            return Err(LedgerError::AmountMismatch {
                challan_no: challan.challan_no,
                expected: challan.net_amount,
                received,
            });
        }

        challan.status = ChallanStatus::Paid;
        challan.paid_amount = Some(received);
        challan.paid_date = Some(command.date);
        challan.payment_method = Some(command.method);
        self.challan_repository.update_challan(&challan)?;
        info!(
            "Recorded {} payment of {} on challan {}",
            command.method.as_str(),
            received,
            challan.challan_no
        );

        self.publish(std::slice::from_ref(&challan));
        let success_message = format!("Challan {} marked as paid", challan.challan_no);
        Ok(RecordPaymentResult {
            challan,
            success_message,
        })
    }

    /// Move every pending challan due before `as_of` to overdue
    pub fn mark_overdue(&self, as_of: NaiveDate) -> LedgerResult<MarkOverdueResult> {
        let _guard = self.lock();
        let mut transitioned = Vec::new();
        for mut challan in self.challan_repository.list_challans()? {
            if challan.status == ChallanStatus::Pending && challan.due_date < as_of {
                challan.status = ChallanStatus::Overdue;
                self.challan_repository.update_challan(&challan)?;
                transitioned.push(challan);
            }
        }

        if !transitioned.is_empty() {
            info!("Marked {} challans overdue as of {}", transitioned.len(), as_of);
            self.publish(&transitioned);
        }
        Ok(MarkOverdueResult {
            transitioned_ids: transitioned.into_iter().map(|c| c.id).collect(),
        })
    }

    pub fn cancel(&self, challan_id: &str) -> LedgerResult<Challan> {
        let _guard = self.lock();
        let mut challan = self.get_challan(challan_id)?;
        if !challan.status.can_transition_to(ChallanStatus::Cancelled) {
            return Err(LedgerError::AlreadySettled {
                challan_no: challan.challan_no,
                status: challan.status,
            });
        }
        challan.status = ChallanStatus::Cancelled;
        self.challan_repository.update_challan(&challan)?;
        info!("Cancelled challan {}", challan.challan_no);

        self.publish(std::slice::from_ref(&challan));
        Ok(challan)
    }

    pub fn get_challan(&self, challan_id: &str) -> LedgerResult<Challan> {
        self.challan_repository
            .get_challan(challan_id)?
            .ok_or_else(|| LedgerError::not_found("Challan", challan_id))
    }

    pub fn get_by_number(&self, challan_no: &str) -> LedgerResult<Challan> {
        self.challan_repository
            .get_challan_by_number(challan_no)?
            .ok_or_else(|| LedgerError::not_found("Challan", challan_no))
    }

    pub fn list_challans(&self) -> LedgerResult<Vec<Challan>> {
        Ok(self.challan_repository.list_challans()?)
    }

    fn list_by_status(&self, status: ChallanStatus) -> LedgerResult<Vec<Challan>> {
        Ok(self
            .challan_repository
            .list_challans()?
            .into_iter()
            .filter(|c| c.status == status)
            .collect())
    }

    pub fn list_pending(&self) -> LedgerResult<Vec<Challan>> {
        self.list_by_status(ChallanStatus::Pending)
    }

    pub fn list_overdue(&self) -> LedgerResult<Vec<Challan>> {
        self.list_by_status(ChallanStatus::Overdue)
    }

    pub fn list_paid(&self) -> LedgerResult<Vec<Challan>> {
        self.list_by_status(ChallanStatus::Paid)
    }

    pub fn list_cancelled(&self) -> LedgerResult<Vec<Challan>> {
        self.list_by_status(ChallanStatus::Cancelled)
    }

    pub fn list_by_student(&self, student_id: &str) -> LedgerResult<Vec<Challan>> {
        Ok(self.challan_repository.list_challans_for_student(student_id)?)
    }

    /// Students holding at least one overdue challan, in first-seen order
    pub fn list_defaulters(&self) -> LedgerResult<Vec<String>> {
        let mut defaulters: Vec<String> = Vec::new();
        for challan in self.list_overdue()? {
            if !defaulters.contains(&challan.student_id) {
                defaulters.push(challan.student_id);
            }
        }
        Ok(defaulters)
    }
}
