//! Expense domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};

/// Errors raised by expense operations
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// A monetary field failed validation
    #[error("invalid amount for {field}: {message}")]
    InvalidAmount {
        field: &'static str,
        message: String,
    },

    /// A required field was empty or missing
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// The expense does not exist within the owner's scope
    #[error("expense not found: {0}")]
    ExpenseNotFound(String),

    /// Reimbursement state does not permit the operation
    #[error("cannot {action} expense: {reason}")]
    InvalidReimbursement {
        action: &'static str,
        reason: String,
    },

    /// Monetary arithmetic failed
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Underlying storage failure
    #[error(transparent)]
    Storage(#[from] PortError),
}

impl ExpenseError {
    pub fn invalid_amount(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            field,
            message: message.into(),
        }
    }

    pub fn invalid_reimbursement(action: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidReimbursement {
            action,
            reason: reason.into(),
        }
    }
}
