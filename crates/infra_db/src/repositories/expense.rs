//! PostgreSQL expense store

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{
    CaseId, Currency, DateRange, DomainPort, ExpenseId, Money, OwnerId, PortError,
};
use domain_expense::expense::{Expense, ExpenseCategory};
use domain_expense::ports::{ExpenseQuery, ExpenseStore};

use crate::error::classify_sqlx_error;

/// PostgreSQL-backed implementation of `ExpenseStore`
#[derive(Debug, Clone)]
pub struct PostgresExpenseStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: Uuid,
    case_id: Uuid,
    category: String,
    description: String,
    amount: Decimal,
    currency: String,
    expense_date: NaiveDate,
    receipt_number: Option<String>,
    is_reimbursable: bool,
    is_reimbursed: bool,
    reimbursement_date: Option<NaiveDate>,
    notes: Option<String>,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, case_id, category, description, amount, currency,
           expense_date, receipt_number, is_reimbursable, is_reimbursed,
           reimbursement_date, notes, owner_id, created_at
    FROM expenses
"#;

impl PostgresExpenseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresExpenseStore {}

#[async_trait]
impl ExpenseStore for PostgresExpenseStore {
    #[instrument(skip(self, expense), fields(expense_id = %expense.id))]
    async fn insert(&self, expense: &Expense) -> Result<Expense, PortError> {
        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, case_id, category, description, amount, currency,
                expense_date, receipt_number, is_reimbursable, is_reimbursed,
                reimbursement_date, notes, owner_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(*expense.id.as_uuid())
        .bind(*expense.case_id.as_uuid())
        .bind(expense.category.as_str())
        .bind(&expense.description)
        .bind(expense.amount.amount())
        .bind(expense.amount.currency().code())
        .bind(expense.expense_date)
        .bind(&expense.receipt_number)
        .bind(expense.is_reimbursable)
        .bind(expense.is_reimbursed)
        .bind(expense.reimbursement_date)
        .bind(&expense.notes)
        .bind(*expense.owner.as_uuid())
        .bind(expense.created_at)
        .execute(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        Ok(expense.clone())
    }

    #[instrument(skip(self), fields(expense_id = %id))]
    async fn fetch(&self, owner: OwnerId, id: ExpenseId) -> Result<Expense, PortError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = $1 AND owner_id = $2"
        ))
        .bind(*id.as_uuid())
        .bind(*owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        row.map(row_to_expense)
            .transpose()?
            .ok_or_else(|| PortError::not_found("Expense", id))
    }

    #[instrument(skip(self, expense), fields(expense_id = %expense.id))]
    async fn update(&self, expense: &Expense) -> Result<Expense, PortError> {
        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                case_id = $3, category = $4, description = $5, amount = $6,
                currency = $7, expense_date = $8, receipt_number = $9,
                is_reimbursable = $10, is_reimbursed = $11,
                reimbursement_date = $12, notes = $13
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(*expense.id.as_uuid())
        .bind(*expense.owner.as_uuid())
        .bind(*expense.case_id.as_uuid())
        .bind(expense.category.as_str())
        .bind(&expense.description)
        .bind(expense.amount.amount())
        .bind(expense.amount.currency().code())
        .bind(expense.expense_date)
        .bind(&expense.receipt_number)
        .bind(expense.is_reimbursable)
        .bind(expense.is_reimbursed)
        .bind(expense.reimbursement_date)
        .bind(&expense.notes)
        .execute(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Expense", expense.id));
        }
        Ok(expense.clone())
    }

    #[instrument(skip(self), fields(expense_id = %id))]
    async fn delete(&self, owner: OwnerId, id: ExpenseId) -> Result<(), PortError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND owner_id = $2")
            .bind(*id.as_uuid())
            .bind(*owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Expense", id));
        }
        Ok(())
    }

    async fn list(&self, owner: OwnerId, query: ExpenseQuery) -> Result<Vec<Expense>, PortError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            {SELECT_COLUMNS}
            WHERE owner_id = $1
              AND ($2::uuid IS NULL OR case_id = $2)
              AND ($3::text IS NULL OR category = $3)
              AND ($4::date IS NULL OR expense_date >= $4)
              AND ($5::date IS NULL OR expense_date <= $5)
            ORDER BY expense_date DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(*owner.as_uuid())
        .bind(query.case_id.map(|id| *id.as_uuid()))
        .bind(query.category.map(|category| category.as_str()))
        .bind(query.from)
        .bind(query.to)
        .bind(query.limit.map(i64::from))
        .bind(query.offset.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        rows.into_iter().map(row_to_expense).collect()
    }

    async fn find_by_expense_date(
        &self,
        owner: OwnerId,
        range: DateRange,
    ) -> Result<Vec<Expense>, PortError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{SELECT_COLUMNS} WHERE owner_id = $1 AND expense_date BETWEEN $2 AND $3"
        ))
        .bind(*owner.as_uuid())
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        rows.into_iter().map(row_to_expense).collect()
    }
}

fn row_to_expense(row: ExpenseRow) -> Result<Expense, PortError> {
    let currency = Currency::from_code(&row.currency)
        .map_err(|e| PortError::internal(format!("stored currency: {}", e)))?;
    let category: ExpenseCategory = row
        .category
        .parse()
        .map_err(|e: String| PortError::internal(format!("stored category: {}", e)))?;

    Ok(Expense {
        id: ExpenseId::from(row.id),
        case_id: CaseId::from(row.case_id),
        category,
        description: row.description,
        amount: Money::new(row.amount, currency),
        expense_date: row.expense_date,
        receipt_number: row.receipt_number,
        is_reimbursable: row.is_reimbursable,
        is_reimbursed: row.is_reimbursed,
        reimbursement_date: row.reimbursement_date,
        notes: row.notes,
        owner: OwnerId::from(row.owner_id),
        created_at: row.created_at,
    })
}
