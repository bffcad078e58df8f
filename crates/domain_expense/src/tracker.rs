//! Expense tracker service

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use core_kernel::{CaseId, DateRange, ExpenseId, OwnerId, PortError};

use crate::error::ExpenseError;
use crate::expense::{Expense, ExpenseUpdate, NewExpense};
use crate::ports::{ExpenseQuery, ExpenseStore};

/// Application service for expense bookkeeping
pub struct ExpenseTracker {
    store: Arc<dyn ExpenseStore>,
}

impl ExpenseTracker {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        Self { store }
    }

    /// Records a new expense for the owner
    #[instrument(skip(self, request), fields(owner = %owner))]
    pub async fn record_expense(
        &self,
        owner: OwnerId,
        request: NewExpense,
    ) -> Result<Expense, ExpenseError> {
        let expense = Expense::create(owner, request)?;
        let stored = self.store.insert(&expense).await?;
        debug!(expense_id = %stored.id, category = %stored.category, "expense recorded");
        Ok(stored)
    }

    /// Fetches one of the owner's expenses
    pub async fn get_expense(
        &self,
        owner: OwnerId,
        id: ExpenseId,
    ) -> Result<Expense, ExpenseError> {
        self.store.fetch(owner, id).await.map_err(map_fetch_error)
    }

    /// Updates an expense's mutable fields
    #[instrument(skip(self, update), fields(owner = %owner, expense_id = %id))]
    pub async fn update_expense(
        &self,
        owner: OwnerId,
        id: ExpenseId,
        update: ExpenseUpdate,
    ) -> Result<Expense, ExpenseError> {
        let mut expense = self.store.fetch(owner, id).await.map_err(map_fetch_error)?;
        expense.apply_update(update)?;
        Ok(self.store.update(&expense).await?)
    }

    /// Deletes an expense
    #[instrument(skip(self), fields(owner = %owner, expense_id = %id))]
    pub async fn delete_expense(&self, owner: OwnerId, id: ExpenseId) -> Result<(), ExpenseError> {
        self.store.delete(owner, id).await.map_err(map_fetch_error)
    }

    /// Marks an expense reimbursed as of the given date
    #[instrument(skip(self), fields(owner = %owner, expense_id = %id))]
    pub async fn mark_reimbursed(
        &self,
        owner: OwnerId,
        id: ExpenseId,
        on: NaiveDate,
    ) -> Result<Expense, ExpenseError> {
        let mut expense = self.store.fetch(owner, id).await.map_err(map_fetch_error)?;
        expense.mark_reimbursed(on)?;
        Ok(self.store.update(&expense).await?)
    }

    /// Lists the owner's expenses
    pub async fn list_expenses(
        &self,
        owner: OwnerId,
        query: ExpenseQuery,
    ) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self.store.list(owner, query).await?)
    }

    /// Lists the expenses recorded against one case
    pub async fn expenses_for_case(
        &self,
        owner: OwnerId,
        case_id: CaseId,
    ) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self.store.list(owner, ExpenseQuery::for_case(case_id)).await?)
    }

    /// Fetches the owner's expenses dated within the range
    pub async fn expenses_in_range(
        &self,
        owner: OwnerId,
        range: DateRange,
    ) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self.store.find_by_expense_date(owner, range).await?)
    }
}

fn map_fetch_error(err: PortError) -> ExpenseError {
    match err {
        PortError::NotFound { ref id, .. } => ExpenseError::ExpenseNotFound(id.clone()),
        other => ExpenseError::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::ExpenseCategory;
    use crate::ports::mock::MockExpenseStore;
    use core_kernel::{Currency, Money};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker() -> ExpenseTracker {
        ExpenseTracker::new(Arc::new(MockExpenseStore::new()))
    }

    fn new_expense(case_id: CaseId, amount: rust_decimal::Decimal, on: NaiveDate) -> NewExpense {
        NewExpense {
            case_id,
            category: ExpenseCategory::Travel,
            description: "Site visit, Constantine".to_string(),
            amount: Money::new(amount, Currency::DZD),
            expense_date: on,
            receipt_number: Some("RCP-204".to_string()),
            is_reimbursable: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_record_and_fetch() {
        let tracker = tracker();
        let owner = OwnerId::new();
        let case_id = CaseId::new();

        let expense = tracker
            .record_expense(owner, new_expense(case_id, dec!(4500), date(2024, 5, 3)))
            .await
            .unwrap();

        let fetched = tracker.get_expense(owner, expense.id).await.unwrap();
        assert_eq!(fetched.amount.amount(), dec!(4500));
        assert_eq!(fetched.case_id, case_id);
    }

    #[tokio::test]
    async fn test_fetch_scoped_to_owner() {
        let tracker = tracker();
        let expense = tracker
            .record_expense(
                OwnerId::new(),
                new_expense(CaseId::new(), dec!(100), date(2024, 5, 3)),
            )
            .await
            .unwrap();

        let err = tracker
            .get_expense(OwnerId::new(), expense.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ExpenseError::ExpenseNotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_reimbursed_persists() {
        let tracker = tracker();
        let owner = OwnerId::new();
        let expense = tracker
            .record_expense(owner, new_expense(CaseId::new(), dec!(100), date(2024, 5, 3)))
            .await
            .unwrap();

        let reimbursed = tracker
            .mark_reimbursed(owner, expense.id, date(2024, 6, 1))
            .await
            .unwrap();
        assert!(reimbursed.is_reimbursed);

        let err = tracker
            .mark_reimbursed(owner, expense.id, date(2024, 6, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ExpenseError::InvalidReimbursement { .. }));
    }

    #[tokio::test]
    async fn test_expenses_for_case_filters() {
        let tracker = tracker();
        let owner = OwnerId::new();
        let case_a = CaseId::new();
        let case_b = CaseId::new();

        tracker
            .record_expense(owner, new_expense(case_a, dec!(100), date(2024, 5, 1)))
            .await
            .unwrap();
        tracker
            .record_expense(owner, new_expense(case_a, dec!(200), date(2024, 5, 2)))
            .await
            .unwrap();
        tracker
            .record_expense(owner, new_expense(case_b, dec!(300), date(2024, 5, 3)))
            .await
            .unwrap();

        let for_a = tracker.expenses_for_case(owner, case_a).await.unwrap();
        assert_eq!(for_a.len(), 2);
    }

    #[tokio::test]
    async fn test_expenses_in_range() {
        let tracker = tracker();
        let owner = OwnerId::new();
        let case_id = CaseId::new();

        tracker
            .record_expense(owner, new_expense(case_id, dec!(100), date(2024, 4, 30)))
            .await
            .unwrap();
        tracker
            .record_expense(owner, new_expense(case_id, dec!(200), date(2024, 5, 15)))
            .await
            .unwrap();
        tracker
            .record_expense(owner, new_expense(case_id, dec!(300), date(2024, 6, 1)))
            .await
            .unwrap();

        let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 31)).unwrap();
        let in_may = tracker.expenses_in_range(owner, range).await.unwrap();
        assert_eq!(in_may.len(), 1);
        assert_eq!(in_may[0].amount.amount(), dec!(200));
    }

    #[tokio::test]
    async fn test_delete_expense() {
        let tracker = tracker();
        let owner = OwnerId::new();
        let expense = tracker
            .record_expense(owner, new_expense(CaseId::new(), dec!(100), date(2024, 5, 3)))
            .await
            .unwrap();

        tracker.delete_expense(owner, expense.id).await.unwrap();
        let err = tracker.get_expense(owner, expense.id).await.unwrap_err();
        assert!(matches!(err, ExpenseError::ExpenseNotFound(_)));
    }
}
