//! Analytics DTOs
//!
//! The revenue response groups the flat computed metrics into the
//! external sections: `revenue`, `expenses`, `invoices`, `cases`, with
//! the period spelled out as `start_date`/`end_date`.

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::DateRange;
use domain_analytics::{MonthlyTrendPoint, RevenueMetrics};

use crate::error::ApiError;

/// Query parameters for `GET /analytics/revenue`
///
/// When either bound is missing the period defaults to the trailing
/// 365 days ending today.
#[derive(Debug, Deserialize)]
pub struct RevenuePeriodQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RevenuePeriodQuery {
    pub fn into_range(self) -> Result<DateRange, ApiError> {
        let (start, end) = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                let end = Utc::now().date_naive();
                let start = end - Days::new(365);
                (start, end)
            }
        };
        DateRange::new(start, end).map_err(|e| ApiError::Validation(e.to_string()))
    }
}

/// Body for `POST /analytics/revenue/report`
#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl GenerateReportRequest {
    pub fn into_range(self) -> Result<DateRange, ApiError> {
        DateRange::new(self.start_date, self.end_date)
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodSection {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevenueSection {
    pub total_invoiced: Decimal,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    pub net_profit: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpensesSection {
    pub total_expenses: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoicesSection {
    pub total_count: u32,
    pub paid_count: u32,
    pub overdue_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CasesSection {
    pub case_count: u32,
    pub avg_case_value: Decimal,
}

/// Body of `GET /analytics/revenue`
#[derive(Debug, Serialize, Deserialize)]
pub struct RevenueAnalyticsResponse {
    pub period: PeriodSection,
    pub revenue: RevenueSection,
    pub expenses: ExpensesSection,
    pub invoices: InvoicesSection,
    pub cases: CasesSection,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
}

impl From<RevenueMetrics> for RevenueAnalyticsResponse {
    fn from(metrics: RevenueMetrics) -> Self {
        Self {
            period: PeriodSection {
                start_date: metrics.period.start,
                end_date: metrics.period.end,
            },
            revenue: RevenueSection {
                total_invoiced: metrics.total_invoiced,
                total_paid: metrics.total_paid,
                outstanding: metrics.outstanding,
                net_profit: metrics.net_profit,
            },
            expenses: ExpensesSection {
                total_expenses: metrics.total_expenses,
            },
            invoices: InvoicesSection {
                total_count: metrics.invoices.total,
                paid_count: metrics.invoices.paid,
                overdue_count: metrics.invoices.overdue,
            },
            cases: CasesSection {
                case_count: metrics.case_count,
                avg_case_value: metrics.average_case_value,
            },
            monthly_trend: metrics.monthly_trend,
        }
    }
}
