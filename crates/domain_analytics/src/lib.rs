//! Analytics Domain - Revenue Metrics and Snapshots
//!
//! Rolls invoices and expenses up into per-period revenue metrics with a
//! monthly trend, and persists durable `RevenueSnapshot` rows keyed by
//! `(owner, period)` through an idempotent upsert.

pub mod aggregator;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod snapshot;

pub use aggregator::RevenueAggregator;
pub use error::AnalyticsError;
pub use metrics::{InvoiceCounts, MonthlyTrendPoint, RevenueMetrics};
pub use ports::SnapshotStore;
pub use snapshot::RevenueSnapshot;
