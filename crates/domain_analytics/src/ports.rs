//! Analytics domain ports

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, OwnerId, PortError};

use crate::snapshot::RevenueSnapshot;

/// Persistence port for revenue snapshots
///
/// The natural key is `(owner, period_start, period_end)`; `upsert`
/// replaces the stored row for that key, keeping its identity.
#[async_trait]
pub trait SnapshotStore: DomainPort {
    /// Inserts or replaces the snapshot for its period key
    ///
    /// When a snapshot already exists for the key, its `id` is retained
    /// and the metric columns are overwritten.
    async fn upsert(&self, snapshot: &RevenueSnapshot) -> Result<RevenueSnapshot, PortError>;

    /// Fetches the stored snapshot for a period key, if any
    async fn find_for_period(
        &self,
        owner: OwnerId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<RevenueSnapshot>, PortError>;

    /// Lists the owner's snapshots, newest period first
    async fn list(&self, owner: OwnerId) -> Result<Vec<RevenueSnapshot>, PortError>;
}

/// In-memory mock adapter for testing without a database
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    type PeriodKey = (OwnerId, NaiveDate, NaiveDate);

    #[derive(Debug, Default)]
    pub struct MockSnapshotStore {
        snapshots: Arc<RwLock<HashMap<PeriodKey, RevenueSnapshot>>>,
    }

    impl MockSnapshotStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn len(&self) -> usize {
            self.snapshots.read().await.len()
        }
    }

    impl DomainPort for MockSnapshotStore {}

    #[async_trait]
    impl SnapshotStore for MockSnapshotStore {
        async fn upsert(&self, snapshot: &RevenueSnapshot) -> Result<RevenueSnapshot, PortError> {
            let key = (snapshot.owner, snapshot.period_start, snapshot.period_end);
            let mut snapshots = self.snapshots.write().await;

            let stored = match snapshots.get(&key) {
                Some(existing) => {
                    // Keep the original row identity on replace
                    let mut replacement = snapshot.clone();
                    replacement.id = existing.id;
                    replacement
                }
                None => snapshot.clone(),
            };
            snapshots.insert(key, stored.clone());
            Ok(stored)
        }

        async fn find_for_period(
            &self,
            owner: OwnerId,
            period_start: NaiveDate,
            period_end: NaiveDate,
        ) -> Result<Option<RevenueSnapshot>, PortError> {
            Ok(self
                .snapshots
                .read()
                .await
                .get(&(owner, period_start, period_end))
                .cloned())
        }

        async fn list(&self, owner: OwnerId) -> Result<Vec<RevenueSnapshot>, PortError> {
            let snapshots = self.snapshots.read().await;
            let mut results: Vec<_> = snapshots
                .values()
                .filter(|snapshot| snapshot.owner == owner)
                .cloned()
                .collect();
            results.sort_by(|a, b| b.period_start.cmp(&a.period_start));
            Ok(results)
        }
    }
}
