//! Payment records
//!
//! Payments are append-only facts attached to an invoice. Status
//! derivation lives on the `Invoice` aggregate; a payment never changes
//! once recorded.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{InvoiceId, Money, OwnerId, PaymentId};

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Check,
    BankTransfer,
    Card,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Check => "check",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "check" => Ok(PaymentMethod::Check),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "card" => Ok(PaymentMethod::Card),
            "online" => Ok(PaymentMethod::Online),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// Caller-supplied fields for a new payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    /// External reference (check number, transfer id); used for
    /// duplicate detection when present
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// A recorded payment against an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub recorded_by: OwnerId,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub(crate) fn new(invoice_id: InvoiceId, details: PaymentDetails, recorded_by: OwnerId) -> Self {
        Self {
            id: PaymentId::new_v7(),
            invoice_id,
            amount: details.amount,
            payment_date: details.payment_date,
            method: details.method,
            reference: details.reference,
            notes: details.notes,
            recorded_by,
            created_at: Utc::now(),
        }
    }
}
