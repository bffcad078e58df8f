//! Expense Domain - Case Costs and Reimbursement
//!
//! Expense records for legal cases: categorized costs with receipt and
//! reimbursement tracking, surfaced to analytics as the cost side of
//! net profit.

pub mod error;
pub mod expense;
pub mod ports;
pub mod tracker;

pub use error::ExpenseError;
pub use expense::{Expense, ExpenseCategory, ExpenseUpdate, NewExpense};
pub use ports::{ExpenseQuery, ExpenseStore};
pub use tracker::ExpenseTracker;
