//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types that give more
//! meaningful error messages than standard assertions.

use core_kernel::{DateRange, Money};
use domain_billing::Invoice;
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more
/// than the tolerance.
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts the invoice's monetary invariants hold
///
/// `subtotal + tax_amount == total_amount`, all item totals sum to the
/// subtotal, and `outstanding == total - paid`.
pub fn assert_invoice_consistent(invoice: &Invoice) {
    let item_sum: Decimal = invoice
        .items
        .iter()
        .map(|item| item.total_price.amount())
        .sum();
    assert_eq!(
        item_sum,
        invoice.subtotal.amount(),
        "Item totals ({}) don't sum to subtotal ({})",
        item_sum,
        invoice.subtotal.amount()
    );

    assert_eq!(
        invoice.subtotal.amount() + invoice.tax_amount.amount(),
        invoice.total_amount.amount(),
        "subtotal + tax != total for invoice {}",
        invoice.invoice_number
    );

    assert_eq!(
        invoice.outstanding_amount().amount(),
        invoice.total_amount.amount() - invoice.amount_paid.amount(),
        "outstanding != total - paid for invoice {}",
        invoice.invoice_number
    );
}

/// Asserts that a DateRange contains a date
pub fn assert_range_contains(range: &DateRange, date: chrono::NaiveDate) {
    assert!(
        range.contains(date),
        "Range {}..={} does not contain {}",
        range.start,
        range.end,
        date
    );
}

/// Asserts that a DateRange excludes a date
pub fn assert_range_excludes(range: &DateRange, date: chrono::NaiveDate) {
    assert!(
        !range.contains(date),
        "Range {}..={} unexpectedly contains {}",
        range.start,
        range.end,
        date
    );
}
