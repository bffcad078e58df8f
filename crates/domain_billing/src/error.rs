//! Billing domain errors

use chrono::NaiveDate;
use core_kernel::{CaseId, MoneyError, PortError};
use thiserror::Error;

use crate::invoice::InvoiceStatus;

/// Errors that can occur in the billing domain
///
/// Every variant is field-attributed so callers can surface which input
/// was rejected; nothing is silently swallowed.
#[derive(Debug, Error)]
pub enum BillingError {
    /// A monetary value was non-positive or otherwise unusable
    #[error("Invalid amount for {field}: {message}")]
    InvalidAmount { field: &'static str, message: String },

    /// The referenced case does not belong to the calling owner
    #[error("Case {0} does not exist or is not owned by the caller")]
    InvalidCaseOwnership(CaseId),

    /// A required field was empty
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// The due date precedes the invoice date
    #[error("Invalid date range: due date {due_date} is before invoice date {invoice_date}")]
    InvalidDateRange {
        invoice_date: NaiveDate,
        due_date: NaiveDate,
    },

    /// The invoice number is already in use for this owner
    #[error("Duplicate invoice number: {0}")]
    DuplicateInvoiceNumber(String),

    /// A payment with the same reference, date, and amount was already applied
    #[error("Duplicate payment: reference {reference} on {payment_date} for this amount already applied")]
    DuplicatePayment {
        reference: String,
        payment_date: NaiveDate,
    },

    /// Invoice not found in the caller's scope
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// The operation is not allowed in the invoice's current status
    #[error("Invalid state transition: cannot {action} an invoice in status {status}")]
    InvalidStateTransition {
        action: &'static str,
        status: InvoiceStatus,
    },

    /// Monetary arithmetic failed (currency mismatch)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Storage adapter failure
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl BillingError {
    pub fn invalid_amount(field: &'static str, message: impl Into<String>) -> Self {
        BillingError::InvalidAmount {
            field,
            message: message.into(),
        }
    }

    pub fn invalid_transition(action: &'static str, status: InvoiceStatus) -> Self {
        BillingError::InvalidStateTransition { action, status }
    }
}
