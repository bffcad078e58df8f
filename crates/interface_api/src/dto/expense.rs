//! Expense DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{CaseId, Currency, Money};
use domain_expense::{Expense, ExpenseCategory, ExpenseUpdate, NewExpense};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub case_id: Uuid,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    /// ISO 4217 code, defaults to DZD
    pub currency: Option<String>,
    pub expense_date: NaiveDate,
    pub receipt_number: Option<String>,
    pub is_reimbursable: Option<bool>,
    pub notes: Option<String>,
}

impl CreateExpenseRequest {
    pub fn into_new_expense(self) -> Result<NewExpense, ApiError> {
        let currency = self
            .currency
            .as_deref()
            .map(str::parse::<Currency>)
            .transpose()
            .map_err(|e| ApiError::Validation(e.to_string()))?
            .unwrap_or_default();
        let category: ExpenseCategory = self
            .category
            .parse()
            .map_err(|e: String| ApiError::Validation(e))?;

        Ok(NewExpense {
            case_id: CaseId::from(self.case_id),
            category,
            description: self.description,
            amount: Money::new(self.amount, currency),
            expense_date: self.expense_date,
            receipt_number: self.receipt_number,
            is_reimbursable: self.is_reimbursable,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub expense_date: Option<NaiveDate>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

impl UpdateExpenseRequest {
    pub fn into_update(self) -> Result<ExpenseUpdate, ApiError> {
        let currency = self
            .currency
            .as_deref()
            .map(str::parse::<Currency>)
            .transpose()
            .map_err(|e| ApiError::Validation(e.to_string()))?
            .unwrap_or_default();
        let category = self
            .category
            .as_deref()
            .map(str::parse::<ExpenseCategory>)
            .transpose()
            .map_err(|e: String| ApiError::Validation(e))?;

        Ok(ExpenseUpdate {
            category,
            description: self.description,
            amount: self.amount.map(|amount| Money::new(amount, currency)),
            expense_date: self.expense_date,
            receipt_number: self.receipt_number,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReimburseRequest {
    /// Defaults to today
    pub reimbursement_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    pub case_id: Option<Uuid>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub case_id: Uuid,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub expense_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    pub is_reimbursable: bool,
    pub is_reimbursed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reimbursement_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseResponse {
    fn from(expense: &Expense) -> Self {
        Self {
            id: *expense.id.as_uuid(),
            case_id: *expense.case_id.as_uuid(),
            category: expense.category.as_str().to_string(),
            description: expense.description.clone(),
            amount: expense.amount.amount(),
            currency: expense.amount.currency().code().to_string(),
            expense_date: expense.expense_date,
            receipt_number: expense.receipt_number.clone(),
            is_reimbursable: expense.is_reimbursable,
            is_reimbursed: expense.is_reimbursed,
            reimbursement_date: expense.reimbursement_date,
            notes: expense.notes.clone(),
            created_at: expense.created_at,
        }
    }
}
