//! Billing Domain - Invoices and Payments
//!
//! This crate implements invoicing for the practice core: invoice
//! aggregates with derived tax and totals, append-only payment records,
//! and the `InvoiceLedger` application service that drives the invoice
//! lifecycle through its state machine.
//!
//! # Lifecycle
//!
//! ```text
//! draft ──► sent ──► partially_paid ──► paid
//!   │         │            │
//!   └─────────┴────────────┴──► cancelled
//! ```
//!
//! `paid` and `cancelled` are terminal. Overdue is derived at read time
//! from the due date, never stored.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{InvoiceLedger, NewInvoice};
//!
//! let ledger = InvoiceLedger::new(store, cases);
//! let invoice = ledger.create_invoice(owner, request).await?;
//! ledger.send_invoice(owner, invoice.id).await?;
//! ```

pub mod error;
pub mod invoice;
pub mod ledger;
pub mod payment;
pub mod ports;

pub use error::BillingError;
pub use invoice::{ClientSnapshot, Invoice, InvoiceItem, InvoiceStatus, ItemPricing};
pub use ledger::{InvoiceLedger, NewInvoice, NewInvoiceItem};
pub use payment::{Payment, PaymentDetails, PaymentMethod};
pub use ports::{CaseDirectory, CaseSummary, InvoiceQuery, InvoiceStore};
