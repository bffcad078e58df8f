//! Analytics domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError, TemporalError};

/// Errors raised by revenue analytics operations
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The requested reporting period is malformed
    #[error(transparent)]
    InvalidPeriod(#[from] TemporalError),

    /// Monetary arithmetic failed while aggregating
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Underlying storage failure
    #[error(transparent)]
    Storage(#[from] PortError),
}
