//! Request/response data transfer objects
//!
//! The DTO layer owns the external field vocabulary: line items cross
//! the wire as `rate`/`amount` while the domain speaks `unit_price`/
//! `total_price`, and tax rates cross as percentages.

pub mod analytics;
pub mod billing;
pub mod expense;
