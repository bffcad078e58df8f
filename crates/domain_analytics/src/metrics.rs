//! Revenue metrics
//!
//! The read-side shape returned by `compute_analytics`: period totals,
//! invoice counts, case averages, and the per-month trend. Metrics are
//! plain decimals; the owning invoices carry the currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::DateRange;

/// Invoice counts over the reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCounts {
    pub total: u32,
    pub paid: u32,
    /// Sent or partially paid invoices past due as of the query date
    pub overdue: u32,
}

/// One calendar month's slice of the trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrendPoint {
    /// `YYYY-MM` label of the month
    pub month: String,
    /// Sum of invoice totals dated within the month
    pub invoiced: Decimal,
    /// Cases opened within the month
    pub cases_opened: u32,
}

/// Computed revenue metrics for one owner and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueMetrics {
    pub period: DateRange,
    /// Sum of `total_amount` over invoices dated in the period
    pub total_invoiced: Decimal,
    /// Sum of `amount_paid` over fully paid invoices
    pub total_paid: Decimal,
    /// Sum of expense amounts dated in the period
    pub total_expenses: Decimal,
    /// Sum of outstanding amounts over open invoices
    pub outstanding: Decimal,
    /// `total_paid - total_expenses`
    pub net_profit: Decimal,
    pub invoices: InvoiceCounts,
    /// Distinct cases billed in the period
    pub case_count: u32,
    /// `total_invoiced / max(case_count, 1)`
    pub average_case_value: Decimal,
    /// One entry per calendar month intersecting the period, in order
    pub monthly_trend: Vec<MonthlyTrendPoint>,
}
