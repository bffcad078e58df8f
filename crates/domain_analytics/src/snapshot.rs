//! Persisted revenue snapshots
//!
//! A snapshot is the durable result of `generate_revenue_report`, keyed
//! by `(owner, period_start, period_end)` and upserted so that repeated
//! generation never duplicates rows.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{OwnerId, SnapshotId};

/// Durable revenue report for one owner and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSnapshot {
    pub id: SnapshotId,
    pub owner: OwnerId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_invoiced: Decimal,
    pub total_paid: Decimal,
    pub total_expenses: Decimal,
    pub outstanding: Decimal,
    pub net_profit: Decimal,
    pub average_case_value: Decimal,
    pub cases_opened: u32,
    pub cases_closed: u32,
    pub active_cases: u32,
    /// Hours across hourly line items of invoices dated in the period
    pub total_billable_hours: Decimal,
    /// `total_paid / total_billable_hours`, zero when no hours
    pub average_hourly_rate: Decimal,
    pub generated_at: DateTime<Utc>,
}
