//! Civil-date periods for billing and reporting
//!
//! Billing works in whole civil dates (invoice date, due date, expense
//! date); there is no timezone arithmetic here. "Today" is always threaded
//! in explicitly by callers as an `as_of` date.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// An inclusive range of civil dates
///
/// Used for analytics periods and date filters. Both bounds are inclusive,
/// matching the `[start, end]` semantics reports are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new range, rejecting `end < start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if end < start {
            return Err(TemporalError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns true if the range contains the given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered, inclusive of both endpoints
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Splits the range into one window per calendar month it touches
    ///
    /// Windows are clamped to the range bounds, ordered, and finite: a
    /// range from Jan 15 to Mar 10 yields Jan 15–31, Feb 1–28/29 and
    /// Mar 1–10.
    pub fn calendar_months(&self) -> Vec<MonthWindow> {
        let mut windows = Vec::new();
        let mut year = self.start.year();
        let mut month = self.start.month();

        loop {
            let month_start = NaiveDate::from_ymd_opt(year, month, 1)
                .expect("first of month is always valid");
            if month_start > self.end {
                break;
            }

            let (next_year, next_month) = if month == 12 {
                (year + 1, 1)
            } else {
                (year, month + 1)
            };
            let month_end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
                .expect("first of month is always valid")
                .checked_sub_days(Days::new(1))
                .expect("month end underflow is impossible");

            let start = month_start.max(self.start);
            let end = month_end.min(self.end);
            windows.push(MonthWindow {
                label: format!("{:04}-{:02}", year, month),
                range: DateRange { start, end },
            });

            year = next_year;
            month = next_month;
        }

        windows
    }
}

/// One calendar month (or the clamped part of it) inside a reporting range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    /// Month label in `YYYY-MM` form
    pub label: String,
    /// The covered dates, clamped to the enclosing range
    pub range: DateRange,
}
