//! Request handlers

pub mod analytics;
pub mod billing;
pub mod expense;
pub mod health;
