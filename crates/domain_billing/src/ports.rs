//! Billing domain ports
//!
//! Port interfaces the billing domain needs from its surroundings: an
//! invoice store and a read-only directory of the practice's cases.
//! Adapters include the PostgreSQL implementations in `infra_db` and the
//! in-memory mocks below.
//!
//! # Concurrency
//!
//! `InvoiceStore::update` is version-guarded: the caller passes the
//! invoice with the version it read, and the store persists it only if
//! the stored version still matches, bumping it on success. A mismatch
//! yields `PortError::Stale`, which the `InvoiceLedger` treats as a
//! signal to re-read and retry.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{CaseId, DateRange, DomainPort, InvoiceId, OwnerId, PortError};

use crate::invoice::{Invoice, InvoiceStatus};

/// Query parameters for listing invoices
#[derive(Debug, Clone, Default)]
pub struct InvoiceQuery {
    /// Filter by status
    pub status: Option<InvoiceStatus>,
    /// Filter by case
    pub case_id: Option<CaseId>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl InvoiceQuery {
    /// Creates a query filtering by status
    pub fn by_status(status: InvoiceStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Persistence port for invoices
///
/// All operations are scoped to an owner; an invoice belonging to a
/// different owner behaves as if it does not exist.
#[async_trait]
pub trait InvoiceStore: DomainPort {
    /// Persists a new invoice
    ///
    /// Fails with `PortError::Conflict` when the owner already has an
    /// invoice with the same invoice number.
    async fn insert(&self, invoice: &Invoice) -> Result<Invoice, PortError>;

    /// Retrieves an invoice by ID, or `PortError::NotFound`
    async fn fetch(&self, owner: OwnerId, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Persists changes to an existing invoice, guarded by its version
    ///
    /// Returns the stored invoice with the bumped version, or
    /// `PortError::Stale` when a concurrent writer got there first.
    async fn update(&self, invoice: &Invoice) -> Result<Invoice, PortError>;

    /// Lists the owner's invoices matching the query
    async fn list(&self, owner: OwnerId, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError>;

    /// Fetches the owner's invoices whose invoice date falls in the range
    async fn find_by_invoice_date(
        &self,
        owner: OwnerId,
        range: DateRange,
    ) -> Result<Vec<Invoice>, PortError>;
}

/// Summary of a legal case as the billing domain sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: CaseId,
    pub reference: String,
    pub title: String,
    pub owner: OwnerId,
    pub open_date: NaiveDate,
    pub close_date: Option<NaiveDate>,
}

impl CaseSummary {
    /// True while the case has not been closed
    pub fn is_active(&self) -> bool {
        self.close_date.is_none()
    }
}

/// Read-only port onto the case repository
///
/// Billing uses this to validate case attribution at invoice creation
/// and analytics uses it for caseload counts.
#[async_trait]
pub trait CaseDirectory: DomainPort {
    /// Retrieves a case by ID, or `PortError::NotFound`
    async fn find_case(&self, owner: OwnerId, id: CaseId) -> Result<CaseSummary, PortError>;

    /// Counts the owner's cases opened within the range
    async fn count_opened_between(
        &self,
        owner: OwnerId,
        range: DateRange,
    ) -> Result<u32, PortError>;

    /// Counts the owner's cases closed within the range
    async fn count_closed_between(
        &self,
        owner: OwnerId,
        range: DateRange,
    ) -> Result<u32, PortError>;

    /// Counts the owner's cases open as of the given date
    async fn count_active(&self, owner: OwnerId, as_of: NaiveDate) -> Result<u32, PortError>;
}

/// In-memory mock adapters for testing without a database
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory `InvoiceStore` with the same version discipline as the
    /// PostgreSQL adapter
    #[derive(Debug, Default)]
    pub struct MockInvoiceStore {
        invoices: Arc<RwLock<HashMap<InvoiceId, Invoice>>>,
    }

    impl MockInvoiceStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store for testing
        pub async fn with_invoices(invoices: Vec<Invoice>) -> Self {
            let store = Self::new();
            let mut guard = store.invoices.write().await;
            for invoice in invoices {
                guard.insert(invoice.id, invoice);
            }
            drop(guard);
            store
        }
    }

    impl DomainPort for MockInvoiceStore {}

    #[async_trait]
    impl InvoiceStore for MockInvoiceStore {
        async fn insert(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
            let mut invoices = self.invoices.write().await;
            let duplicate = invoices.values().any(|existing| {
                existing.owner == invoice.owner
                    && existing.invoice_number == invoice.invoice_number
            });
            if duplicate {
                return Err(PortError::conflict(format!(
                    "invoice number {} already exists",
                    invoice.invoice_number
                )));
            }
            let mut stored = invoice.clone();
            stored.version = 1;
            invoices.insert(stored.id, stored.clone());
            Ok(stored)
        }

        async fn fetch(&self, owner: OwnerId, id: InvoiceId) -> Result<Invoice, PortError> {
            self.invoices
                .read()
                .await
                .get(&id)
                .filter(|invoice| invoice.owner == owner)
                .cloned()
                .ok_or_else(|| PortError::not_found("Invoice", id))
        }

        async fn update(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
            let mut invoices = self.invoices.write().await;
            let stored = invoices
                .get_mut(&invoice.id)
                .filter(|existing| existing.owner == invoice.owner)
                .ok_or_else(|| PortError::not_found("Invoice", invoice.id))?;

            if stored.version != invoice.version {
                return Err(PortError::stale("Invoice", invoice.id));
            }

            let mut updated = invoice.clone();
            updated.version += 1;
            *stored = updated.clone();
            Ok(updated)
        }

        async fn list(
            &self,
            owner: OwnerId,
            query: InvoiceQuery,
        ) -> Result<Vec<Invoice>, PortError> {
            let invoices = self.invoices.read().await;
            let mut results: Vec<_> = invoices
                .values()
                .filter(|invoice| invoice.owner == owner)
                .filter(|invoice| {
                    query.status.map_or(true, |status| invoice.status == status)
                })
                .filter(|invoice| {
                    query.case_id.map_or(true, |case| invoice.case_id == Some(case))
                })
                .cloned()
                .collect();
            results.sort_by(|a, b| {
                b.invoice_date
                    .cmp(&a.invoice_date)
                    .then_with(|| a.invoice_number.cmp(&b.invoice_number))
            });

            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn find_by_invoice_date(
            &self,
            owner: OwnerId,
            range: DateRange,
        ) -> Result<Vec<Invoice>, PortError> {
            let invoices = self.invoices.read().await;
            Ok(invoices
                .values()
                .filter(|invoice| invoice.owner == owner && range.contains(invoice.invoice_date))
                .cloned()
                .collect())
        }
    }

    /// In-memory `CaseDirectory` backed by a fixed case list
    #[derive(Debug, Default)]
    pub struct MockCaseDirectory {
        cases: Arc<RwLock<Vec<CaseSummary>>>,
    }

    impl MockCaseDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_cases(cases: Vec<CaseSummary>) -> Self {
            let directory = Self::new();
            *directory.cases.write().await = cases;
            directory
        }
    }

    impl DomainPort for MockCaseDirectory {}

    #[async_trait]
    impl CaseDirectory for MockCaseDirectory {
        async fn find_case(&self, owner: OwnerId, id: CaseId) -> Result<CaseSummary, PortError> {
            self.cases
                .read()
                .await
                .iter()
                .find(|case| case.id == id && case.owner == owner)
                .cloned()
                .ok_or_else(|| PortError::not_found("Case", id))
        }

        async fn count_opened_between(
            &self,
            owner: OwnerId,
            range: DateRange,
        ) -> Result<u32, PortError> {
            Ok(self
                .cases
                .read()
                .await
                .iter()
                .filter(|case| case.owner == owner && range.contains(case.open_date))
                .count() as u32)
        }

        async fn count_closed_between(
            &self,
            owner: OwnerId,
            range: DateRange,
        ) -> Result<u32, PortError> {
            Ok(self
                .cases
                .read()
                .await
                .iter()
                .filter(|case| {
                    case.owner == owner
                        && case.close_date.map_or(false, |closed| range.contains(closed))
                })
                .count() as u32)
        }

        async fn count_active(&self, owner: OwnerId, as_of: NaiveDate) -> Result<u32, PortError> {
            Ok(self
                .cases
                .read()
                .await
                .iter()
                .filter(|case| {
                    case.owner == owner
                        && case.open_date <= as_of
                        && case.close_date.map_or(true, |closed| closed > as_of)
                })
                .count() as u32)
        }
    }
}
