//! Invoice aggregate
//!
//! An invoice owns its line items and applied payments and keeps the
//! derived totals consistent: `subtotal == Σ item.total_price` and
//! `total_amount == subtotal + tax_amount` after every mutation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CaseId, Currency, InvoiceId, InvoiceItemId, Money, OwnerId, Rate};

use crate::error::BillingError;
use crate::payment::{Payment, PaymentDetails};

/// Invoice status state machine
///
/// `Draft → Sent → {PartiallyPaid → Paid} | Cancelled`; `Paid` and
/// `Cancelled` are terminal. Overdue is a derived read-time fact
/// (`Invoice::is_overdue`), never a stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted; items may still change
    Draft,
    /// Sent to the client; awaiting payment
    Sent,
    /// Partial payment received
    PartiallyPaid,
    /// Fully paid (terminal)
    Paid,
    /// Cancelled/voided (terminal)
    Cancelled,
}

impl InvoiceStatus {
    /// Returns true for terminal statuses
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }

    /// Returns true for statuses that can still receive payments
    pub fn accepts_payments(&self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::PartiallyPaid)
    }

    /// Stable snake_case name, used for persistence and the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "partially_paid" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(format!("unknown invoice status: {}", other)),
        }
    }
}

/// Client details denormalized onto the invoice at creation time
///
/// The invoice keeps its own copy so later edits to the client record
/// never rewrite billing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSnapshot {
    pub name: String,
    pub address: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// How a line item is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemPricing {
    /// Priced by quantity times unit price
    Unit { quantity: Decimal, unit_price: Money },
    /// Priced by hours worked times hourly rate
    Hourly {
        hours_worked: Decimal,
        hourly_rate: Money,
    },
}

impl ItemPricing {
    /// The currency this pricing is expressed in
    pub fn currency(&self) -> Currency {
        match self {
            ItemPricing::Unit { unit_price, .. } => unit_price.currency(),
            ItemPricing::Hourly { hourly_rate, .. } => hourly_rate.currency(),
        }
    }

    /// Hours worked, when priced hourly
    pub fn hours(&self) -> Option<Decimal> {
        match self {
            ItemPricing::Hourly { hours_worked, .. } => Some(*hours_worked),
            ItemPricing::Unit { .. } => None,
        }
    }

    fn validate(&self) -> Result<(), BillingError> {
        match self {
            ItemPricing::Unit {
                quantity,
                unit_price,
            } => {
                if quantity.is_sign_negative() {
                    return Err(BillingError::invalid_amount(
                        "quantity",
                        format!("{} is negative", quantity),
                    ));
                }
                if unit_price.is_negative() {
                    return Err(BillingError::invalid_amount(
                        "unit_price",
                        format!("{} is negative", unit_price.amount()),
                    ));
                }
            }
            ItemPricing::Hourly {
                hours_worked,
                hourly_rate,
            } => {
                if hours_worked.is_sign_negative() {
                    return Err(BillingError::invalid_amount(
                        "hours_worked",
                        format!("{} is negative", hours_worked),
                    ));
                }
                if hourly_rate.is_negative() {
                    return Err(BillingError::invalid_amount(
                        "hourly_rate",
                        format!("{} is negative", hourly_rate.amount()),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Derives the line total: `hours × rate` for hourly pricing,
    /// `quantity × unit price` otherwise, rounded half-up to minor units
    pub fn total(&self) -> Money {
        match self {
            ItemPricing::Unit {
                quantity,
                unit_price,
            } => unit_price.multiply(*quantity).round_half_up(),
            ItemPricing::Hourly {
                hours_worked,
                hourly_rate,
            } => hourly_rate.multiply(*hours_worked).round_half_up(),
        }
    }
}

/// A billable line item within an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub description: String,
    pub pricing: ItemPricing,
    /// Derived from `pricing`; re-derived on every recompute
    pub total_price: Money,
    pub service_date: Option<NaiveDate>,
}

impl InvoiceItem {
    /// Creates a line item, validating and pricing it
    pub fn new(
        description: impl Into<String>,
        pricing: ItemPricing,
        service_date: Option<NaiveDate>,
    ) -> Result<Self, BillingError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(BillingError::MissingRequiredField("description"));
        }
        pricing.validate()?;

        Ok(Self {
            id: InvoiceItemId::new_v7(),
            description,
            pricing,
            total_price: pricing.total(),
            service_date,
        })
    }
}

/// A billable invoice for a case, with computed tax and totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Human-readable number, unique within the owner's scope
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    /// The case this invoice bills, when case-attributed
    pub case_id: Option<CaseId>,
    pub client: ClientSnapshot,
    pub status: InvoiceStatus,
    pub items: Vec<InvoiceItem>,
    pub subtotal: Money,
    pub tax_rate: Rate,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub amount_paid: Money,
    /// Date of the payment that crossed the full-payment threshold
    pub payment_date: Option<NaiveDate>,
    /// Applied payments, append-only
    pub payments: Vec<Payment>,
    pub currency: Currency,
    pub notes: Option<String>,
    pub terms_conditions: Option<String>,
    /// The principal all reads and writes are scoped to
    pub owner: OwnerId,
    /// Optimistic concurrency guard, bumped by the store on update
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new draft invoice with the given items
    ///
    /// Validates the header and items, prices every item, and derives
    /// subtotal, tax, and total. `amount_paid` starts at zero.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        owner: OwnerId,
        invoice_number: String,
        invoice_date: NaiveDate,
        due_date: NaiveDate,
        case_id: Option<CaseId>,
        client: ClientSnapshot,
        currency: Currency,
        tax_rate: Rate,
        items: Vec<InvoiceItem>,
    ) -> Result<Self, BillingError> {
        if invoice_number.trim().is_empty() {
            return Err(BillingError::MissingRequiredField("invoice_number"));
        }
        if client.name.trim().is_empty() {
            return Err(BillingError::MissingRequiredField("client_name"));
        }
        if due_date < invoice_date {
            return Err(BillingError::InvalidDateRange {
                invoice_date,
                due_date,
            });
        }

        let now = Utc::now();
        let mut invoice = Self {
            id: InvoiceId::new_v7(),
            invoice_number,
            invoice_date,
            due_date,
            case_id,
            client,
            status: InvoiceStatus::Draft,
            items,
            subtotal: Money::zero(currency),
            tax_rate,
            tax_amount: Money::zero(currency),
            total_amount: Money::zero(currency),
            amount_paid: Money::zero(currency),
            payment_date: None,
            payments: Vec::new(),
            currency,
            notes: None,
            terms_conditions: None,
            owner,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        invoice.recalculate_totals()?;
        Ok(invoice)
    }

    /// Sets the free-form notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the terms and conditions text
    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms_conditions = Some(terms.into());
        self
    }

    /// Re-derives `subtotal`, `tax_amount`, and `total_amount` from the
    /// current item set
    ///
    /// Must be invoked after every item mutation; the item mutators on
    /// this type call it themselves so the invariant cannot be skipped.
    pub fn recalculate_totals(&mut self) -> Result<(), BillingError> {
        let mut subtotal = Money::zero(self.currency);
        for item in &mut self.items {
            item.total_price = item.pricing.total();
            subtotal = subtotal.checked_add(&item.total_price)?;
        }

        self.subtotal = subtotal;
        self.tax_amount = self.tax_rate.tax_on(&self.subtotal);
        self.total_amount = self.subtotal.checked_add(&self.tax_amount)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replaces the item set; Draft-only
    pub fn replace_items(&mut self, items: Vec<InvoiceItem>) -> Result<(), BillingError> {
        if self.status != InvoiceStatus::Draft {
            return Err(BillingError::invalid_transition("edit items of", self.status));
        }
        self.items = items;
        self.recalculate_totals()
    }

    /// Appends a single item; Draft-only
    pub fn add_item(&mut self, item: InvoiceItem) -> Result<(), BillingError> {
        if self.status != InvoiceStatus::Draft {
            return Err(BillingError::invalid_transition("edit items of", self.status));
        }
        self.items.push(item);
        self.recalculate_totals()
    }

    /// Marks the invoice as sent to the client
    pub fn send(&mut self) -> Result<(), BillingError> {
        if self.status != InvoiceStatus::Draft {
            return Err(BillingError::invalid_transition("send", self.status));
        }
        self.status = InvoiceStatus::Sent;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Cancels the invoice; terminal
    pub fn cancel(&mut self) -> Result<(), BillingError> {
        if self.status.is_terminal() {
            return Err(BillingError::invalid_transition("cancel", self.status));
        }
        self.status = InvoiceStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Applies a payment and derives the resulting status
    ///
    /// Rejects non-positive amounts and Draft/Cancelled targets. When the
    /// cumulative paid amount reaches the total the invoice becomes
    /// `Paid` and records the crossing payment's date; any positive paid
    /// amount below the total yields `PartiallyPaid`. Overpayment is
    /// accepted and surfaces as a negative outstanding amount.
    pub fn apply_payment(
        &mut self,
        details: PaymentDetails,
        recorded_by: OwnerId,
    ) -> Result<Payment, BillingError> {
        if !details.amount.is_positive() {
            return Err(BillingError::invalid_amount(
                "amount",
                format!("payment amount {} must be positive", details.amount.amount()),
            ));
        }
        if !self.status.accepts_payments() {
            return Err(BillingError::invalid_transition("apply a payment to", self.status));
        }
        if details.amount.currency() != self.currency {
            return Err(core_kernel::MoneyError::CurrencyMismatch(
                details.amount.currency().to_string(),
                self.currency.to_string(),
            )
            .into());
        }
        if let Some(reference) = details.reference.as_deref() {
            let duplicate = self.payments.iter().any(|p| {
                p.reference.as_deref() == Some(reference)
                    && p.payment_date == details.payment_date
                    && p.amount == details.amount
            });
            if duplicate {
                return Err(BillingError::DuplicatePayment {
                    reference: reference.to_string(),
                    payment_date: details.payment_date,
                });
            }
        }

        let payment = Payment::new(self.id, details, recorded_by);
        self.amount_paid = self.amount_paid.checked_add(&payment.amount)?;

        if self.amount_paid.amount() >= self.total_amount.amount() {
            self.status = InvoiceStatus::Paid;
            self.payment_date = Some(payment.payment_date);
        } else {
            self.status = InvoiceStatus::PartiallyPaid;
        }

        self.payments.push(payment.clone());
        self.updated_at = Utc::now();
        Ok(payment)
    }

    /// Total due minus amount paid to date; negative under overpayment
    pub fn outstanding_amount(&self) -> Money {
        self.total_amount - self.amount_paid
    }

    /// Query-time overdue derivation
    ///
    /// True iff the invoice awaits payment and its due date has passed
    /// as of the given date. Paid and cancelled invoices are never
    /// overdue regardless of due date.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.status.accepts_payments() && self.due_date < as_of
    }

    /// Total hours across hourly-priced items
    pub fn billable_hours(&self) -> Decimal {
        self.items
            .iter()
            .filter_map(|item| item.pricing.hours())
            .sum()
    }
}

/// Generates a time-derived invoice number
///
/// Used when the caller does not supply one; uniqueness is enforced by
/// the store either way.
pub fn generate_invoice_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("INV-{}", duration.as_millis() % 10_000_000_000)
}
