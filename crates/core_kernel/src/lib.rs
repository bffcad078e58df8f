//! Core Kernel - Foundational types for the practice billing system
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic and percentage tax rates
//! - Civil-date ranges for billing periods and reports
//! - Strongly-typed identifiers
//! - The unified port error for storage and collaborator adapters

pub mod identifiers;
pub mod money;
pub mod ports;
pub mod temporal;

pub use identifiers::{
    CaseId, ExpenseId, InvoiceId, InvoiceItemId, OwnerId, PaymentId, SnapshotId,
};
pub use money::{Currency, Money, MoneyError, Rate};
pub use ports::{DomainPort, PortError};
pub use temporal::{DateRange, MonthWindow, TemporalError};
