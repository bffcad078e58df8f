//! PostgreSQL case directory
//!
//! Read-only view over the `cases` table for case attribution checks
//! and caseload counts. Case lifecycle itself is managed elsewhere.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{CaseId, DateRange, DomainPort, OwnerId, PortError};
use domain_billing::ports::{CaseDirectory, CaseSummary};

use crate::error::classify_sqlx_error;

/// PostgreSQL-backed implementation of `CaseDirectory`
#[derive(Debug, Clone)]
pub struct PostgresCaseDirectory {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct CaseRow {
    id: Uuid,
    reference: String,
    title: String,
    owner_id: Uuid,
    open_date: NaiveDate,
    close_date: Option<NaiveDate>,
}

impl PostgresCaseDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_where(
        &self,
        owner: OwnerId,
        date_column: &str,
        range: DateRange,
    ) -> Result<u32, PortError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM cases WHERE owner_id = $1 AND {date_column} BETWEEN $2 AND $3"
        ))
        .bind(*owner.as_uuid())
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        Ok(count.max(0) as u32)
    }
}

impl DomainPort for PostgresCaseDirectory {}

#[async_trait]
impl CaseDirectory for PostgresCaseDirectory {
    #[instrument(skip(self), fields(case_id = %id))]
    async fn find_case(&self, owner: OwnerId, id: CaseId) -> Result<CaseSummary, PortError> {
        let row = sqlx::query_as::<_, CaseRow>(
            r#"
            SELECT id, reference, title, owner_id, open_date, close_date
            FROM cases
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(*id.as_uuid())
        .bind(*owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        row.map(|row| CaseSummary {
            id: CaseId::from(row.id),
            reference: row.reference,
            title: row.title,
            owner: OwnerId::from(row.owner_id),
            open_date: row.open_date,
            close_date: row.close_date,
        })
        .ok_or_else(|| PortError::not_found("Case", id))
    }

    async fn count_opened_between(
        &self,
        owner: OwnerId,
        range: DateRange,
    ) -> Result<u32, PortError> {
        self.count_where(owner, "open_date", range).await
    }

    async fn count_closed_between(
        &self,
        owner: OwnerId,
        range: DateRange,
    ) -> Result<u32, PortError> {
        self.count_where(owner, "close_date", range).await
    }

    async fn count_active(&self, owner: OwnerId, as_of: NaiveDate) -> Result<u32, PortError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM cases
            WHERE owner_id = $1
              AND open_date <= $2
              AND (close_date IS NULL OR close_date > $2)
            "#,
        )
        .bind(*owner.as_uuid())
        .bind(as_of)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        Ok(count.max(0) as u32)
    }
}
