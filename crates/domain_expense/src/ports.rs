//! Expense domain ports

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{CaseId, DateRange, DomainPort, ExpenseId, OwnerId, PortError};

use crate::expense::{Expense, ExpenseCategory};

/// Query parameters for listing expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseQuery {
    pub case_id: Option<CaseId>,
    pub category: Option<ExpenseCategory>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ExpenseQuery {
    pub fn for_case(case_id: CaseId) -> Self {
        Self {
            case_id: Some(case_id),
            ..Default::default()
        }
    }
}

/// Persistence port for expenses, owner-scoped like the invoice store
#[async_trait]
pub trait ExpenseStore: DomainPort {
    async fn insert(&self, expense: &Expense) -> Result<Expense, PortError>;

    async fn fetch(&self, owner: OwnerId, id: ExpenseId) -> Result<Expense, PortError>;

    async fn update(&self, expense: &Expense) -> Result<Expense, PortError>;

    async fn delete(&self, owner: OwnerId, id: ExpenseId) -> Result<(), PortError>;

    async fn list(&self, owner: OwnerId, query: ExpenseQuery) -> Result<Vec<Expense>, PortError>;

    /// Fetches the owner's expenses dated within the range
    async fn find_by_expense_date(
        &self,
        owner: OwnerId,
        range: DateRange,
    ) -> Result<Vec<Expense>, PortError>;
}

/// In-memory mock adapter for testing without a database
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockExpenseStore {
        expenses: Arc<RwLock<HashMap<ExpenseId, Expense>>>,
    }

    impl MockExpenseStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_expenses(expenses: Vec<Expense>) -> Self {
            let store = Self::new();
            let mut guard = store.expenses.write().await;
            for expense in expenses {
                guard.insert(expense.id, expense);
            }
            drop(guard);
            store
        }
    }

    impl DomainPort for MockExpenseStore {}

    #[async_trait]
    impl ExpenseStore for MockExpenseStore {
        async fn insert(&self, expense: &Expense) -> Result<Expense, PortError> {
            self.expenses
                .write()
                .await
                .insert(expense.id, expense.clone());
            Ok(expense.clone())
        }

        async fn fetch(&self, owner: OwnerId, id: ExpenseId) -> Result<Expense, PortError> {
            self.expenses
                .read()
                .await
                .get(&id)
                .filter(|expense| expense.owner == owner)
                .cloned()
                .ok_or_else(|| PortError::not_found("Expense", id))
        }

        async fn update(&self, expense: &Expense) -> Result<Expense, PortError> {
            let mut expenses = self.expenses.write().await;
            let stored = expenses
                .get_mut(&expense.id)
                .filter(|existing| existing.owner == expense.owner)
                .ok_or_else(|| PortError::not_found("Expense", expense.id))?;
            *stored = expense.clone();
            Ok(expense.clone())
        }

        async fn delete(&self, owner: OwnerId, id: ExpenseId) -> Result<(), PortError> {
            let mut expenses = self.expenses.write().await;
            match expenses.get(&id) {
                Some(expense) if expense.owner == owner => {
                    expenses.remove(&id);
                    Ok(())
                }
                _ => Err(PortError::not_found("Expense", id)),
            }
        }

        async fn list(
            &self,
            owner: OwnerId,
            query: ExpenseQuery,
        ) -> Result<Vec<Expense>, PortError> {
            let expenses = self.expenses.read().await;
            let mut results: Vec<_> = expenses
                .values()
                .filter(|expense| expense.owner == owner)
                .filter(|expense| query.case_id.map_or(true, |case| expense.case_id == case))
                .filter(|expense| {
                    query
                        .category
                        .map_or(true, |category| expense.category == category)
                })
                .filter(|expense| query.from.map_or(true, |from| expense.expense_date >= from))
                .filter(|expense| query.to.map_or(true, |to| expense.expense_date <= to))
                .cloned()
                .collect();
            results.sort_by(|a, b| b.expense_date.cmp(&a.expense_date));

            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn find_by_expense_date(
            &self,
            owner: OwnerId,
            range: DateRange,
        ) -> Result<Vec<Expense>, PortError> {
            let expenses = self.expenses.read().await;
            Ok(expenses
                .values()
                .filter(|expense| expense.owner == owner && range.contains(expense.expense_date))
                .cloned()
                .collect())
        }
    }
}
