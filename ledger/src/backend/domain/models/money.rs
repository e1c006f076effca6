//! Money helpers using rust_decimal for precision
//!
//! All ledger amounts are `Decimal` rounded to 2 places. Conversion to `f64`
//! only happens at the DTO boundary.

use rust_decimal::prelude::*;

/// Decimal places kept for currency amounts
pub const DECIMAL_PLACES: u32 = 2;

/// Round a currency amount to 2 places, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate a currency amount to 2 places (used when splitting so the
/// remainder is never negative)
#[inline]
pub fn truncate_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::ToZero)
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    round_money(Decimal::from_f64(value).unwrap_or_default())
}

/// Convert Decimal back to f64 for DTOs, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// Whole-number percentage of `part` in `whole`, 0 when `whole` is zero
pub fn whole_percentage(part: Decimal, whole: Decimal) -> u32 {
    if whole <= Decimal::ZERO {
        return 0;
    }
    (part * Decimal::ONE_HUNDRED / whole)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

/// Format an amount for display: `Rs. 4,500` or `Rs. 4,500.50`
pub fn format_currency(symbol: &str, value: Decimal) -> String {
    let rounded = round_money(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let whole = abs.trunc();
    let fraction = abs - whole;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if !symbol.is_empty() {
        out.push_str(symbol);
        out.push(' ');
    }
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !fraction.is_zero() {
        let cents = (fraction * Decimal::ONE_HUNDRED).trunc().to_u32().unwrap_or(0);
        out.push_str(&format!(".{:02}", cents));
    }
    out
}
