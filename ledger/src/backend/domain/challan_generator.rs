//! Challan generation: line items, discounts and amounts.
//!
//! Generation is pure. Numbering, duplicate checks and persistence belong to
//! the lifecycle service, which hands the generator an already allocated
//! challan number.
//!
//! ## Discount rules
//!
//! - A discount with `fee_head` set reduces that line only, capped at the
//!   line amount.
//! - Every other discount is computed against the challan total. Together
//!   they are capped at whatever the targeted discounts left over.
//! - The total-level discount is split across lines in proportion to what
//!   each line still owes, each share truncated to 2 decimals. The remainder
//!   goes to the first line, so per-line discounts always sum to the
//!   challan discount exactly.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::backend::domain::errors::{LedgerError, LedgerResult};
use crate::backend::domain::models::{
    money::{round_money, truncate_money},
    AppliedDiscount, BillingPeriod, Challan, ChallanLineItem, ChallanStatus, Discount, FeeStructure,
    Student,
};

/// Details decided by the caller rather than derived from the catalog
#[derive(Debug, Clone)]
pub struct IssueDetails {
    pub challan_no: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Optional fee heads (id or name) to leave off the challan
    pub excluded_fee_heads: Vec<String>,
}

/// Amounts of a challan after discounts
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLines {
    pub line_items: Vec<ChallanLineItem>,
    pub applied_discounts: Vec<AppliedDiscount>,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub net_amount: Decimal,
}

/// Build a pending challan for `student` from a fee structure
pub fn generate_challan(
    student: &Student,
    period: BillingPeriod,
    fee_structure: &FeeStructure,
    discounts: &[Discount],
    details: IssueDetails,
) -> LedgerResult<Challan> {
    let lines = build_line_items(fee_structure, &details.excluded_fee_heads);
    let priced = apply_discounts(&fee_structure.id, lines, discounts)?;

    debug!(
        "Priced challan {} for {}: total {}, discount {}, net {}",
        details.challan_no, student.id, priced.total_amount, priced.discount_amount, priced.net_amount
    );

    Ok(Challan {
        id: Challan::generate_id(),
        challan_no: details.challan_no,
        student_id: student.id.clone(),
        class_name: student.class_name.clone(),
        period,
        issue_date: details.issue_date,
        due_date: details.due_date,
        line_items: priced.line_items,
        applied_discounts: priced.applied_discounts,
        total_amount: priced.total_amount,
        discount_amount: priced.discount_amount,
        net_amount: priced.net_amount,
        status: ChallanStatus::Pending,
        paid_amount: None,
        paid_date: None,
        payment_method: None,
    })
}

/// Snapshot the structure's fee heads as line items. Mandatory heads cannot
/// be excluded.
pub fn build_line_items(fee_structure: &FeeStructure, excluded: &[String]) -> Vec<ChallanLineItem> {
    let is_excluded = |id: &str, name: &str| {
        excluded
            .iter()
            .any(|e| e == id || e.eq_ignore_ascii_case(name))
    };

    fee_structure
        .items
        .iter()
        .filter(|head| {
            if !is_excluded(&head.id, &head.name) {
                return true;
            }
            if head.is_optional {
                false
            } else {
                warn!(
                    "Fee head {} of {} is mandatory and cannot be excluded",
                    head.id, fee_structure.id
                );
                true
            }
        })
        .map(|head| ChallanLineItem {
            id: head.id.clone(),
            name: head.name.clone(),
            amount: round_money(head.amount),
            discount: None,
        })
        .collect()
}

/// Apply discounts to line items and compute the challan amounts
pub fn apply_discounts(
    structure_id: &str,
    lines: Vec<ChallanLineItem>,
    discounts: &[Discount],
) -> LedgerResult<PricedLines> {
    if let Some(line) = lines.iter().find(|l| l.amount < Decimal::ZERO) {
        return Err(LedgerError::InvalidFeeStructure {
            structure_id: structure_id.to_string(),
            reason: format!("fee head {} has negative amount {}", line.id, line.amount),
        });
    }
    let total_amount: Decimal = lines.iter().map(|l| l.amount).sum();
    if total_amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidFeeStructure {
            structure_id: structure_id.to_string(),
            reason: format!("total {} is not positive", total_amount),
        });
    }

    for discount in discounts {
        discount.validate().map_err(|source| LedgerError::InvalidDiscount {
            discount_id: discount.id.clone(),
            source,
        })?;
    }

    let mut line_discounts = vec![Decimal::ZERO; lines.len()];
    let mut applied = Vec::new();

    for discount in discounts.iter().filter(|d| d.is_targeted()) {
        let target = discount.fee_head.as_deref().unwrap_or_default();
        let Some(index) = lines
            .iter()
            .position(|l| l.id == target || l.name.eq_ignore_ascii_case(target))
        else {
            warn!(
                "Discount {} targets fee head '{}' which is not on this challan, not applied",
                discount.id, target
            );
            continue;
        };
        let room = lines[index].amount - line_discounts[index];
        let amount = discount.reduction_on(lines[index].amount).min(room);
        if amount > Decimal::ZERO {
            line_discounts[index] += amount;
            applied.push(AppliedDiscount {
                discount_id: discount.id.clone(),
                name: discount.name.clone(),
                amount,
            });
        }
    }

    let targeted_total: Decimal = line_discounts.iter().copied().sum();
    let mut room = total_amount - targeted_total;
    let mut general_total = Decimal::ZERO;
    for discount in discounts.iter().filter(|d| !d.is_targeted()) {
        let amount = discount.reduction_on(total_amount).min(room);
        if amount > Decimal::ZERO {
            room -= amount;
            general_total += amount;
            applied.push(AppliedDiscount {
                discount_id: discount.id.clone(),
                name: discount.name.clone(),
                amount,
            });
        }
    }

    if general_total > Decimal::ZERO {
        distribute(general_total, &lines, &mut line_discounts);
    }

    let line_items: Vec<ChallanLineItem> = lines
        .into_iter()
        .zip(line_discounts)
        .map(|(line, discount)| ChallanLineItem {
            discount: (discount > Decimal::ZERO).then_some(discount),
            ..line
        })
        .collect();
    let discount_amount: Decimal = line_items.iter().map(|l| l.discount_or_zero()).sum();

    Ok(PricedLines {
        line_items,
        applied_discounts: applied,
        total_amount,
        discount_amount,
        net_amount: total_amount - discount_amount,
    })
}

/// Spread `amount` over the lines in proportion to what each still owes
fn distribute(amount: Decimal, lines: &[ChallanLineItem], line_discounts: &mut [Decimal]) {
    let owed: Vec<Decimal> = lines
        .iter()
        .zip(line_discounts.iter())
        .map(|(line, discount)| line.amount - *discount)
        .collect();
    let owed_total: Decimal = owed.iter().copied().sum();
    if owed_total <= Decimal::ZERO {
        return;
    }

    let mut assigned = Decimal::ZERO;
    for (index, line_owed) in owed.iter().enumerate() {
        let share = truncate_money(amount * *line_owed / owed_total);
        line_discounts[index] += share;
        assigned += share;
    }

    // Truncation leaves at most a few paise; the first line with room takes them.
    let mut remainder = amount - assigned;
    for (index, line) in lines.iter().enumerate() {
        if remainder <= Decimal::ZERO {
            break;
        }
        let room = line.amount - line_discounts[index];
        let take = remainder.min(room);
        line_discounts[index] += take;
        remainder -= take;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{DiscountType, Eligibility, FeeHead, StudentStatus};

    fn money(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn head(id: &str, amount: &str, is_optional: bool) -> FeeHead {
        FeeHead {
            id: id.to_string(),
            name: format!("{} fee", id),
            amount: money(amount),
            is_optional,
        }
    }

    fn class_five() -> FeeStructure {
        FeeStructure::new(
            "Class 5",
            "2026-2027",
            vec![
                head("tuition", "4000", false),
                head("lab", "600", false),
                head("sports", "400", true),
            ],
        )
    }

    fn discount(id: &str, discount_type: DiscountType, value: &str, fee_head: Option<&str>) -> Discount {
        Discount {
            id: id.to_string(),
            name: format!("{} discount", id),
            discount_type,
            value: money(value),
            description: String::new(),
            auto_apply: true,
            eligibility: Eligibility::Everyone,
            fee_head: fee_head.map(str::to_string),
        }
    }

    fn student() -> Student {
        Student {
            id: "STU-001".to_string(),
            name: "Ayesha Khan".to_string(),
            guardian_identity: "35201-1234567-1".to_string(),
            class_name: "Class 5".to_string(),
            section: "A".to_string(),
            monthly_fee: money("5000"),
            status: StudentStatus::Active,
        }
    }

    fn details() -> IssueDetails {
        IssueDetails {
            challan_no: "CH-202610-STU-001-0001".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
            excluded_fee_heads: Vec::new(),
        }
    }

    fn line_discounts(priced: &PricedLines) -> Vec<Decimal> {
        priced.line_items.iter().map(|l| l.discount_or_zero()).collect()
    }

    #[test]
    fn test_sibling_discount_on_class_five() {
        let period = BillingPeriod::new(2026, 10).unwrap();
        let sibling = discount("sibling", DiscountType::Percentage, "10", None);
        let challan = generate_challan(&student(), period, &class_five(), &[sibling], details()).unwrap();

        assert_eq!(challan.total_amount, money("5000"));
        assert_eq!(challan.discount_amount, money("500"));
        assert_eq!(challan.net_amount, money("4500"));
        assert_eq!(challan.status, ChallanStatus::Pending);
        assert_eq!(challan.class_name, "Class 5");
        assert_eq!(challan.line_items.len(), 3);
        assert_eq!(challan.line_items[0].discount, Some(money("400")));
        assert_eq!(challan.line_items[1].discount, Some(money("60")));
        assert_eq!(challan.line_items[2].discount, Some(money("40")));
        assert_eq!(challan.applied_discounts[0].amount, money("500"));
        assert!(challan.invariant_violation().is_none());
        assert!(challan.id.starts_with("challan::"));
    }

    #[test]
    fn test_no_discounts_leaves_lines_untouched() {
        let priced = apply_discounts("fee", build_line_items(&class_five(), &[]), &[]).unwrap();
        assert_eq!(priced.discount_amount, Decimal::ZERO);
        assert_eq!(priced.net_amount, money("5000"));
        assert!(priced.line_items.iter().all(|l| l.discount.is_none()));
        assert!(priced.applied_discounts.is_empty());
    }

    #[test]
    fn test_remainder_goes_to_first_line() {
        let structure = FeeStructure::new(
            "Class 1",
            "2026-2027",
            vec![head("a", "100", false), head("b", "100", false), head("c", "100", false)],
        );
        let fixed = discount("flat", DiscountType::Fixed, "100", None);
        let priced = apply_discounts(&structure.id, build_line_items(&structure, &[]), &[fixed]).unwrap();

        assert_eq!(
            line_discounts(&priced),
            vec![money("33.34"), money("33.33"), money("33.33")]
        );
        assert_eq!(priced.discount_amount, money("100"));
    }

    #[test]
    fn test_discounts_capped_at_total() {
        let big = discount("big", DiscountType::Percentage, "80", None);
        let bigger = discount("bigger", DiscountType::Percentage, "70", None);
        let fixed = discount("fixed", DiscountType::Fixed, "10000", None);
        let priced =
            apply_discounts("fee", build_line_items(&class_five(), &[]), &[big, bigger, fixed]).unwrap();

        assert_eq!(priced.discount_amount, money("5000"));
        assert_eq!(priced.net_amount, Decimal::ZERO);
        assert_eq!(
            priced.applied_discounts.iter().map(|a| a.amount).collect::<Vec<_>>(),
            vec![money("4000"), money("1000")]
        );
        for line in &priced.line_items {
            assert!(line.discount_or_zero() <= line.amount);
        }
    }

    #[test]
    fn test_targeted_discount_hits_one_line() {
        let lab = discount("lab-waiver", DiscountType::Percentage, "50", Some("lab"));
        let priced = apply_discounts("fee", build_line_items(&class_five(), &[]), &[lab]).unwrap();

        assert_eq!(line_discounts(&priced), vec![Decimal::ZERO, money("300"), Decimal::ZERO]);
        assert_eq!(priced.net_amount, money("4700"));
    }

    #[test]
    fn test_targeted_discount_capped_at_line() {
        let waiver = discount("waiver", DiscountType::Fixed, "1000", Some("SPORTS FEE"));
        let priced = apply_discounts("fee", build_line_items(&class_five(), &[]), &[waiver]).unwrap();
        assert_eq!(line_discounts(&priced)[2], money("400"));
        assert_eq!(priced.discount_amount, money("400"));
    }

    #[test]
    fn test_general_discount_respects_targeted_lines() {
        let waiver = discount("waiver", DiscountType::Fixed, "600", Some("lab"));
        let half = discount("half", DiscountType::Percentage, "50", None);
        let priced = apply_discounts("fee", build_line_items(&class_five(), &[]), &[waiver, half]).unwrap();

        let per_line = line_discounts(&priced);
        assert_eq!(per_line[1], money("600"));
        assert_eq!(per_line.iter().copied().sum::<Decimal>(), money("3100"));
        for line in &priced.line_items {
            assert!(line.discount_or_zero() <= line.amount);
        }
    }

    #[test]
    fn test_optional_head_can_be_excluded() {
        let lines = build_line_items(&class_five(), &["sports".to_string()]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.iter().map(|l| l.amount).sum::<Decimal>(), money("4600"));
    }

    #[test]
    fn test_mandatory_head_cannot_be_excluded() {
        let lines = build_line_items(&class_five(), &["tuition".to_string(), "lab fee".to_string()]);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_zero_total_is_invalid() {
        let structure = FeeStructure::new("Class 1", "2026-2027", vec![head("free", "0", false)]);
        let err = apply_discounts(&structure.id, build_line_items(&structure, &[]), &[]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFeeStructure { .. }));

        let err = apply_discounts("empty", Vec::new(), &[]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFeeStructure { .. }));
    }

    #[test]
    fn test_negative_line_is_rejected_before_discounting() {
        let structure = FeeStructure::new(
            "Class 1",
            "2026-2027",
            vec![head("tuition", "100", false), head("refund", "-50", false)],
        );
        let full = discount("full", DiscountType::Percentage, "100", None);
        let err = apply_discounts(&structure.id, build_line_items(&structure, &[]), &[full]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFeeStructure { .. }));
        assert!(err.to_string().contains("refund"));
    }

    #[test]
    fn test_out_of_range_discount_is_rejected() {
        let broken = discount("broken", DiscountType::Percentage, "120", None);
        let err = apply_discounts("fee", build_line_items(&class_five(), &[]), &[broken]).unwrap_err();
        assert_eq!(err.code(), "invalid_discount");
    }
}
