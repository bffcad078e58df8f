//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the practice management system. Each
//! domain port (`InvoiceStore`, `ExpenseStore`, `SnapshotStore`,
//! `CaseDirectory`) gets a concrete adapter here, built on SQLx.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, PostgresInvoiceStore};
//!
//! let pool = create_pool(config).await?;
//! let invoices = PostgresInvoiceStore::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, DatabaseConfig, DatabasePool};
pub use repositories::{
    PostgresCaseDirectory, PostgresExpenseStore, PostgresInvoiceStore, PostgresSnapshotStore,
};
