//! Expense records
//!
//! An expense is a cost incurred on behalf of a case: court fees, expert
//! fees, travel, and the like. Expenses feed the revenue analytics as
//! the cost side of net profit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CaseId, ExpenseId, Money, OwnerId};

use crate::error::ExpenseError;

/// Category of a case expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    CourtFees,
    Administrative,
    Travel,
    ExpertFees,
    Translation,
    Postage,
    OfficeSupplies,
    LegalResearch,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::CourtFees => "court_fees",
            ExpenseCategory::Administrative => "administrative",
            ExpenseCategory::Travel => "travel",
            ExpenseCategory::ExpertFees => "expert_fees",
            ExpenseCategory::Translation => "translation",
            ExpenseCategory::Postage => "postage",
            ExpenseCategory::OfficeSupplies => "office_supplies",
            ExpenseCategory::LegalResearch => "legal_research",
            ExpenseCategory::Other => "other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "court_fees" => Ok(ExpenseCategory::CourtFees),
            "administrative" => Ok(ExpenseCategory::Administrative),
            "travel" => Ok(ExpenseCategory::Travel),
            "expert_fees" => Ok(ExpenseCategory::ExpertFees),
            "translation" => Ok(ExpenseCategory::Translation),
            "postage" => Ok(ExpenseCategory::Postage),
            "office_supplies" => Ok(ExpenseCategory::OfficeSupplies),
            "legal_research" => Ok(ExpenseCategory::LegalResearch),
            "other" => Ok(ExpenseCategory::Other),
            other => Err(format!("unknown expense category: {}", other)),
        }
    }
}

/// A cost incurred on behalf of a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub case_id: CaseId,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Money,
    pub expense_date: NaiveDate,
    pub receipt_number: Option<String>,
    pub is_reimbursable: bool,
    pub is_reimbursed: bool,
    pub reimbursement_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub case_id: CaseId,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Money,
    pub expense_date: NaiveDate,
    pub receipt_number: Option<String>,
    /// Defaults to true, matching the common case of client-billable costs
    pub is_reimbursable: Option<bool>,
    pub notes: Option<String>,
}

/// Mutable fields for an expense update
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub expense_date: Option<NaiveDate>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

impl Expense {
    /// Creates a validated expense record
    pub fn create(owner: OwnerId, request: NewExpense) -> Result<Self, ExpenseError> {
        if request.description.trim().is_empty() {
            return Err(ExpenseError::MissingRequiredField("description"));
        }
        if !request.amount.is_positive() {
            return Err(ExpenseError::invalid_amount(
                "amount",
                format!("{} must be positive", request.amount.amount()),
            ));
        }

        Ok(Self {
            id: ExpenseId::new_v7(),
            case_id: request.case_id,
            category: request.category,
            description: request.description,
            amount: request.amount,
            expense_date: request.expense_date,
            receipt_number: request.receipt_number,
            is_reimbursable: request.is_reimbursable.unwrap_or(true),
            is_reimbursed: false,
            reimbursement_date: None,
            notes: request.notes,
            owner,
            created_at: Utc::now(),
        })
    }

    /// Applies an update, re-validating the mutated fields
    pub fn apply_update(&mut self, update: ExpenseUpdate) -> Result<(), ExpenseError> {
        if let Some(description) = update.description {
            if description.trim().is_empty() {
                return Err(ExpenseError::MissingRequiredField("description"));
            }
            self.description = description;
        }
        if let Some(amount) = update.amount {
            if !amount.is_positive() {
                return Err(ExpenseError::invalid_amount(
                    "amount",
                    format!("{} must be positive", amount.amount()),
                ));
            }
            self.amount = amount;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(expense_date) = update.expense_date {
            self.expense_date = expense_date;
        }
        if let Some(receipt_number) = update.receipt_number {
            self.receipt_number = Some(receipt_number);
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        Ok(())
    }

    /// Marks the expense reimbursed as of the given date
    pub fn mark_reimbursed(&mut self, on: NaiveDate) -> Result<(), ExpenseError> {
        if !self.is_reimbursable {
            return Err(ExpenseError::invalid_reimbursement(
                "reimburse",
                "expense is not reimbursable",
            ));
        }
        if self.is_reimbursed {
            return Err(ExpenseError::invalid_reimbursement(
                "reimburse",
                "expense is already reimbursed",
            ));
        }
        self.is_reimbursed = true;
        self.reimbursement_date = Some(on);
        Ok(())
    }
}
