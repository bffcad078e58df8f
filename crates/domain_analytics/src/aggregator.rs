//! Revenue aggregator service
//!
//! Computes revenue metrics from invoices and expenses dated within a
//! reporting period, and persists durable `RevenueSnapshot` rows through
//! an idempotent upsert.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use core_kernel::{DateRange, OwnerId, SnapshotId};
use domain_billing::invoice::{Invoice, InvoiceStatus};
use domain_billing::ports::{CaseDirectory, InvoiceStore};
use domain_expense::ports::ExpenseStore;

use crate::error::AnalyticsError;
use crate::metrics::{InvoiceCounts, MonthlyTrendPoint, RevenueMetrics};
use crate::ports::SnapshotStore;
use crate::snapshot::RevenueSnapshot;

/// Application service for revenue analytics
pub struct RevenueAggregator {
    invoices: Arc<dyn InvoiceStore>,
    expenses: Arc<dyn ExpenseStore>,
    cases: Arc<dyn CaseDirectory>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl RevenueAggregator {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        expenses: Arc<dyn ExpenseStore>,
        cases: Arc<dyn CaseDirectory>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            invoices,
            expenses,
            cases,
            snapshots,
        }
    }

    /// Computes revenue metrics for the owner over the period
    ///
    /// Invoices are selected by `invoice_date`, expenses by
    /// `expense_date`. Cancelled totals still count toward
    /// `total_invoiced`; only fully paid invoices contribute to
    /// `total_paid`. Overdue counts are derived against `as_of`.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn compute_analytics(
        &self,
        owner: OwnerId,
        period: DateRange,
        as_of: NaiveDate,
    ) -> Result<RevenueMetrics, AnalyticsError> {
        let invoices = self.invoices.find_by_invoice_date(owner, period).await?;
        let expenses = self.expenses.find_by_expense_date(owner, period).await?;

        let totals = InvoiceTotals::from_invoices(&invoices, as_of);
        let total_expenses: Decimal = expenses.iter().map(|e| e.amount.amount()).sum();
        let net_profit = totals.paid - total_expenses;

        let distinct_cases: HashSet<_> =
            invoices.iter().filter_map(|invoice| invoice.case_id).collect();
        let case_count = distinct_cases.len() as u32;
        let average_case_value = totals.invoiced / Decimal::from(case_count.max(1));

        let mut monthly_trend = Vec::new();
        for window in period.calendar_months() {
            let invoiced = invoices
                .iter()
                .filter(|invoice| window.range.contains(invoice.invoice_date))
                .map(|invoice| invoice.total_amount.amount())
                .sum();
            let cases_opened = self
                .cases
                .count_opened_between(owner, window.range)
                .await?;
            monthly_trend.push(MonthlyTrendPoint {
                month: window.label,
                invoiced,
                cases_opened,
            });
        }

        Ok(RevenueMetrics {
            period,
            total_invoiced: totals.invoiced,
            total_paid: totals.paid,
            total_expenses,
            outstanding: totals.outstanding,
            net_profit,
            invoices: totals.counts,
            case_count,
            average_case_value,
            monthly_trend,
        })
    }

    /// Computes the period's metrics and persists them as a snapshot
    ///
    /// The snapshot is keyed by `(owner, period_start, period_end)` and
    /// upserted: generating the same report twice leaves exactly one
    /// stored row, holding the latest computation.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn generate_revenue_report(
        &self,
        owner: OwnerId,
        period: DateRange,
        as_of: NaiveDate,
    ) -> Result<RevenueSnapshot, AnalyticsError> {
        let metrics = self.compute_analytics(owner, period, as_of).await?;

        let invoices = self.invoices.find_by_invoice_date(owner, period).await?;
        let total_billable_hours: Decimal =
            invoices.iter().map(Invoice::billable_hours).sum();
        let average_hourly_rate = if total_billable_hours > Decimal::ZERO {
            metrics.total_paid / total_billable_hours
        } else {
            Decimal::ZERO
        };

        let cases_opened = self.cases.count_opened_between(owner, period).await?;
        let cases_closed = self.cases.count_closed_between(owner, period).await?;
        let active_cases = self.cases.count_active(owner, as_of).await?;

        let snapshot = RevenueSnapshot {
            id: SnapshotId::new_v7(),
            owner,
            period_start: period.start,
            period_end: period.end,
            total_invoiced: metrics.total_invoiced,
            total_paid: metrics.total_paid,
            total_expenses: metrics.total_expenses,
            outstanding: metrics.outstanding,
            net_profit: metrics.net_profit,
            average_case_value: metrics.average_case_value,
            cases_opened,
            cases_closed,
            active_cases,
            total_billable_hours,
            average_hourly_rate,
            generated_at: Utc::now(),
        };

        let stored = self.snapshots.upsert(&snapshot).await?;
        debug!(snapshot_id = %stored.id, "revenue snapshot persisted");
        Ok(stored)
    }

    /// Lists the owner's persisted snapshots
    pub async fn list_snapshots(
        &self,
        owner: OwnerId,
    ) -> Result<Vec<RevenueSnapshot>, AnalyticsError> {
        Ok(self.snapshots.list(owner).await?)
    }
}

/// Per-period invoice roll-up
struct InvoiceTotals {
    invoiced: Decimal,
    paid: Decimal,
    outstanding: Decimal,
    counts: InvoiceCounts,
}

impl InvoiceTotals {
    fn from_invoices(invoices: &[Invoice], as_of: NaiveDate) -> Self {
        let mut totals = Self {
            invoiced: Decimal::ZERO,
            paid: Decimal::ZERO,
            outstanding: Decimal::ZERO,
            counts: InvoiceCounts {
                total: invoices.len() as u32,
                paid: 0,
                overdue: 0,
            },
        };

        for invoice in invoices {
            totals.invoiced += invoice.total_amount.amount();
            match invoice.status {
                InvoiceStatus::Paid => {
                    totals.paid += invoice.amount_paid.amount();
                    totals.counts.paid += 1;
                }
                InvoiceStatus::Sent | InvoiceStatus::PartiallyPaid => {
                    totals.outstanding += invoice.outstanding_amount().amount();
                }
                InvoiceStatus::Draft | InvoiceStatus::Cancelled => {}
            }
            if invoice.is_overdue(as_of) {
                totals.counts.overdue += 1;
            }
        }
        totals
    }
}
