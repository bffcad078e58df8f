//! PostgreSQL adapters for the domain persistence ports
//!
//! Each module implements one domain port against PostgreSQL, mapping
//! between rows and domain types and translating `sqlx` failures into
//! `PortError` variants the domain services understand.
//!
//! Queries are plain runtime `sqlx::query` / `query_as`, so the crate
//! builds without a live database.

pub mod cases;
pub mod expense;
pub mod invoice;
pub mod snapshot;

pub use cases::PostgresCaseDirectory;
pub use expense::PostgresExpenseStore;
pub use invoice::PostgresInvoiceStore;
pub use snapshot::PostgresSnapshotStore;
