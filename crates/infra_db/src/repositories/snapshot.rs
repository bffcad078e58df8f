//! PostgreSQL revenue snapshot store
//!
//! Upserts on the `(owner_id, period_start, period_end)` natural key so
//! regenerating a report for the same period overwrites the stored row
//! instead of duplicating it.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{DomainPort, OwnerId, PortError, SnapshotId};
use domain_analytics::ports::SnapshotStore;
use domain_analytics::snapshot::RevenueSnapshot;

use crate::error::classify_sqlx_error;

/// PostgreSQL-backed implementation of `SnapshotStore`
#[derive(Debug, Clone)]
pub struct PostgresSnapshotStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct SnapshotRow {
    id: Uuid,
    owner_id: Uuid,
    period_start: NaiveDate,
    period_end: NaiveDate,
    total_invoiced: Decimal,
    total_paid: Decimal,
    total_expenses: Decimal,
    outstanding: Decimal,
    net_profit: Decimal,
    average_case_value: Decimal,
    cases_opened: i32,
    cases_closed: i32,
    active_cases: i32,
    total_billable_hours: Decimal,
    average_hourly_rate: Decimal,
    generated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, owner_id, period_start, period_end, total_invoiced,
           total_paid, total_expenses, outstanding, net_profit,
           average_case_value, cases_opened, cases_closed, active_cases,
           total_billable_hours, average_hourly_rate, generated_at
    FROM revenue_snapshots
"#;

impl PostgresSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresSnapshotStore {}

#[async_trait]
impl SnapshotStore for PostgresSnapshotStore {
    #[instrument(skip(self, snapshot), fields(owner = %snapshot.owner))]
    async fn upsert(&self, snapshot: &RevenueSnapshot) -> Result<RevenueSnapshot, PortError> {
        // RETURNING id surfaces the identity kept by DO UPDATE
        let stored_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO revenue_snapshots (
                id, owner_id, period_start, period_end, total_invoiced,
                total_paid, total_expenses, outstanding, net_profit,
                average_case_value, cases_opened, cases_closed,
                active_cases, total_billable_hours, average_hourly_rate,
                generated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (owner_id, period_start, period_end) DO UPDATE SET
                total_invoiced = EXCLUDED.total_invoiced,
                total_paid = EXCLUDED.total_paid,
                total_expenses = EXCLUDED.total_expenses,
                outstanding = EXCLUDED.outstanding,
                net_profit = EXCLUDED.net_profit,
                average_case_value = EXCLUDED.average_case_value,
                cases_opened = EXCLUDED.cases_opened,
                cases_closed = EXCLUDED.cases_closed,
                active_cases = EXCLUDED.active_cases,
                total_billable_hours = EXCLUDED.total_billable_hours,
                average_hourly_rate = EXCLUDED.average_hourly_rate,
                generated_at = EXCLUDED.generated_at
            RETURNING id
            "#,
        )
        .bind(*snapshot.id.as_uuid())
        .bind(*snapshot.owner.as_uuid())
        .bind(snapshot.period_start)
        .bind(snapshot.period_end)
        .bind(snapshot.total_invoiced)
        .bind(snapshot.total_paid)
        .bind(snapshot.total_expenses)
        .bind(snapshot.outstanding)
        .bind(snapshot.net_profit)
        .bind(snapshot.average_case_value)
        .bind(snapshot.cases_opened as i32)
        .bind(snapshot.cases_closed as i32)
        .bind(snapshot.active_cases as i32)
        .bind(snapshot.total_billable_hours)
        .bind(snapshot.average_hourly_rate)
        .bind(snapshot.generated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        let mut stored = snapshot.clone();
        stored.id = SnapshotId::from(stored_id);
        Ok(stored)
    }

    async fn find_for_period(
        &self,
        owner: OwnerId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<RevenueSnapshot>, PortError> {
        let row = sqlx::query_as::<_, SnapshotRow>(&format!(
            "{SELECT_COLUMNS} WHERE owner_id = $1 AND period_start = $2 AND period_end = $3"
        ))
        .bind(*owner.as_uuid())
        .bind(period_start)
        .bind(period_end)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        Ok(row.map(row_to_snapshot))
    }

    async fn list(&self, owner: OwnerId) -> Result<Vec<RevenueSnapshot>, PortError> {
        let rows = sqlx::query_as::<_, SnapshotRow>(&format!(
            "{SELECT_COLUMNS} WHERE owner_id = $1 ORDER BY period_start DESC"
        ))
        .bind(*owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        Ok(rows.into_iter().map(row_to_snapshot).collect())
    }
}

fn row_to_snapshot(row: SnapshotRow) -> RevenueSnapshot {
    RevenueSnapshot {
        id: SnapshotId::from(row.id),
        owner: OwnerId::from(row.owner_id),
        period_start: row.period_start,
        period_end: row.period_end,
        total_invoiced: row.total_invoiced,
        total_paid: row.total_paid,
        total_expenses: row.total_expenses,
        outstanding: row.outstanding,
        net_profit: row.net_profit,
        average_case_value: row.average_case_value,
        cases_opened: row.cases_opened.max(0) as u32,
        cases_closed: row.cases_closed.max(0) as u32,
        active_cases: row.active_cases.max(0) as u32,
        total_billable_hours: row.total_billable_hours,
        average_hourly_rate: row.average_hourly_rate,
        generated_at: row.generated_at,
    }
}
