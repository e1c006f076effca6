//! Publish bridge from the administrative ledger to student-facing views.
//!
//! Challans flow one way: the lifecycle service publishes, students read.
//! Published entries are keyed by challan id. In `first_write_wins` mode an
//! id that is already present is left alone, so a later payment is not
//! reflected in the student view. `upsert` mode replaces the entry instead.
//!
//! The bridge never fails. Challans whose amounts break the ledger
//! invariants are still published, with a warning.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::backend::domain::models::{money::format_currency, Challan, ChallanStatus};
use crate::backend::storage::{LedgerConfig, PublishMode};

/// Status vocabulary of the student views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishedStatus {
    Pending,
    Overdue,
    Paid,
}

impl PublishedStatus {
    /// `cancelled` has no student-facing counterpart and shows as pending.
    pub fn from_ledger(status: ChallanStatus) -> Self {
        match status {
            ChallanStatus::Pending | ChallanStatus::Cancelled => PublishedStatus::Pending,
            ChallanStatus::Overdue => PublishedStatus::Overdue,
            ChallanStatus::Paid => PublishedStatus::Paid,
        }
    }
}

/// A challan as a student sees it
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedChallan {
    pub id: String,
    pub student_id: String,
    pub challan_no: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    /// `amount` with the currency label, e.g. "Rs. 4,500"
    pub amount_display: String,
    pub status: PublishedStatus,
    pub pdf_url: String,
    pub paid_date: Option<NaiveDate>,
}

/// Counts from one publish call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// The student-facing read set. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct PublishedChallanStore {
    entries: Arc<RwLock<Vec<PublishedChallan>>>,
}

impl PublishedChallanStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<PublishedChallan>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<PublishedChallan>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drop every published entry
    pub fn reset(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<PublishedChallan> {
        self.read().clone()
    }
}

#[derive(Clone)]
pub struct PublishService {
    store: PublishedChallanStore,
    mode: PublishMode,
    currency_symbol: String,
    pdf_base_url: String,
}

impl PublishService {
    pub fn new(store: PublishedChallanStore, config: &LedgerConfig) -> Self {
        Self {
            store,
            mode: config.publish_mode,
            currency_symbol: config.currency_symbol.clone(),
            pdf_base_url: config.pdf_base_url.clone(),
        }
    }

    pub fn store(&self) -> &PublishedChallanStore {
        &self.store
    }

    pub fn mode(&self) -> PublishMode {
        self.mode
    }

    /// Publish admin challans into the student read set
    pub fn publish(&self, challans: &[Challan]) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();
        let mut entries = self.store.write();

        for challan in challans {
            if let Some(violation) = challan.invariant_violation() {
                warn!("Publishing challan {} with inconsistent amounts: {}", challan.challan_no, violation);
            }
            if challan.status == ChallanStatus::Cancelled {
                warn!(
                    "Challan {} is cancelled; student views will show it as pending",
                    challan.challan_no
                );
            }

            let published = self.to_published(challan);
            match entries.iter_mut().find(|e| e.id == challan.id) {
                None => {
                    entries.push(published);
                    outcome.added += 1;
                }
                Some(existing) => match self.mode {
                    PublishMode::FirstWriteWins => outcome.unchanged += 1,
                    PublishMode::Upsert if *existing == published => outcome.unchanged += 1,
                    PublishMode::Upsert => {
                        *existing = published;
                        outcome.updated += 1;
                    }
                },
            }
        }

        debug!(
            "Published {} challans: {} added, {} updated, {} unchanged",
            challans.len(),
            outcome.added,
            outcome.updated,
            outcome.unchanged
        );
        outcome
    }

    fn to_published(&self, challan: &Challan) -> PublishedChallan {
        PublishedChallan {
            id: challan.id.clone(),
            student_id: challan.student_id.clone(),
            challan_no: challan.challan_no.clone(),
            title: format!("Fee Challan - {}", challan.period.label()),
            due_date: challan.due_date,
            amount: challan.net_amount,
            amount_display: format_currency(&self.currency_symbol, challan.net_amount),
            status: PublishedStatus::from_ledger(challan.status),
            pdf_url: format!(
                "{}/{}.pdf",
                self.pdf_base_url.trim_end_matches('/'),
                challan.challan_no
            ),
            paid_date: challan.paid_date,
        }
    }

    pub fn list_all(&self) -> Vec<PublishedChallan> {
        self.store.snapshot()
    }

    pub fn list_pending_and_overdue(&self) -> Vec<PublishedChallan> {
        self.store
            .read()
            .iter()
            .filter(|c| matches!(c.status, PublishedStatus::Pending | PublishedStatus::Overdue))
            .cloned()
            .collect()
    }

    pub fn list_paid(&self) -> Vec<PublishedChallan> {
        self.store
            .read()
            .iter()
            .filter(|c| c.status == PublishedStatus::Paid)
            .cloned()
            .collect()
    }

    pub fn list_for_student(&self, student_id: &str) -> Vec<PublishedChallan> {
        self.store
            .read()
            .iter()
            .filter(|c| c.student_id == student_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{BillingPeriod, ChallanLineItem};

    fn challan(id: &str, student_id: &str, status: ChallanStatus) -> Challan {
        Challan {
            id: id.to_string(),
            challan_no: format!("CH-202610-{}-0001", student_id),
            student_id: student_id.to_string(),
            class_name: "Class 5".to_string(),
            period: BillingPeriod::new(2026, 10).unwrap(),
            issue_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
            line_items: vec![ChallanLineItem {
                id: "tuition".to_string(),
                name: "Tuition Fee".to_string(),
                amount: Decimal::from(5000),
                discount: Some(Decimal::from(500)),
            }],
            applied_discounts: Vec::new(),
            total_amount: Decimal::from(5000),
            discount_amount: Decimal::from(500),
            net_amount: Decimal::from(4500),
            status,
            paid_amount: None,
            paid_date: None,
            payment_method: None,
        }
    }

    fn service(mode: PublishMode) -> PublishService {
        let config = LedgerConfig {
            publish_mode: mode,
            ..LedgerConfig::default()
        };
        PublishService::new(PublishedChallanStore::new(), &config)
    }

    #[test]
    fn test_student_facing_shape() {
        let publisher = service(PublishMode::FirstWriteWins);
        publisher.publish(&[challan("c1", "STU-001", ChallanStatus::Pending)]);

        let published = &publisher.list_all()[0];
        assert_eq!(published.title, "Fee Challan - October 2026");
        assert_eq!(published.amount_display, "Rs. 4,500");
        assert_eq!(published.pdf_url, "/challans/CH-202610-STU-001-0001.pdf");
        assert_eq!(published.status, PublishedStatus::Pending);
    }

    #[test]
    fn test_first_write_wins_keeps_original() {
        let publisher = service(PublishMode::FirstWriteWins);
        let mut c = challan("c1", "STU-001", ChallanStatus::Pending);
        publisher.publish(&[c.clone()]);

        c.status = ChallanStatus::Paid;
        let outcome = publisher.publish(&[c]);
        assert_eq!(outcome, PublishOutcome { added: 0, updated: 0, unchanged: 1 });
        assert_eq!(publisher.list_all()[0].status, PublishedStatus::Pending);
        assert!(publisher.list_paid().is_empty());
    }

    #[test]
    fn test_upsert_reflects_mutations() {
        let publisher = service(PublishMode::Upsert);
        let mut c = challan("c1", "STU-001", ChallanStatus::Pending);
        publisher.publish(&[c.clone()]);

        c.status = ChallanStatus::Paid;
        c.paid_date = NaiveDate::from_ymd_opt(2026, 10, 5);
        let outcome = publisher.publish(&[c.clone()]);
        assert_eq!(outcome.updated, 1);
        assert_eq!(publisher.list_paid().len(), 1);
        assert!(publisher.list_pending_and_overdue().is_empty());

        assert_eq!(publisher.publish(&[c]).unchanged, 1);
    }

    #[test]
    fn test_overlapping_batches_dedupe_by_id() {
        let publisher = service(PublishMode::FirstWriteWins);
        let a = challan("c1", "STU-001", ChallanStatus::Pending);
        let b = challan("c2", "STU-002", ChallanStatus::Overdue);
        publisher.publish(&[a.clone(), b.clone()]);
        publisher.publish(&[b, a.clone(), a]);

        assert_eq!(publisher.store().len(), 2);
        assert_eq!(publisher.list_pending_and_overdue().len(), 2);
        assert_eq!(publisher.list_for_student("STU-002")[0].status, PublishedStatus::Overdue);
    }

    #[test]
    fn test_cancelled_maps_to_pending() {
        let publisher = service(PublishMode::FirstWriteWins);
        publisher.publish(&[challan("c1", "STU-001", ChallanStatus::Cancelled)]);
        assert_eq!(publisher.list_all()[0].status, PublishedStatus::Pending);
    }

    #[test]
    fn test_inconsistent_challan_still_published() {
        let publisher = service(PublishMode::FirstWriteWins);
        let mut broken = challan("c1", "STU-001", ChallanStatus::Pending);
        broken.net_amount = Decimal::from(1);
        assert_eq!(publisher.publish(&[broken]).added, 1);
    }

    #[test]
    fn test_reset_clears_shared_store() {
        let store = PublishedChallanStore::new();
        let publisher = PublishService::new(store.clone(), &LedgerConfig::default());
        publisher.publish(&[challan("c1", "STU-001", ChallanStatus::Pending)]);
        assert_eq!(store.len(), 1);

        store.reset();
        assert!(publisher.list_all().is_empty());
        assert!(store.is_empty());
    }
}
