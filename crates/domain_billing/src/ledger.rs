//! Invoice ledger service
//!
//! The `InvoiceLedger` is the application service for invoice lifecycle
//! operations. It validates case attribution against the case
//! directory, loads and mutates `Invoice` aggregates, and persists them
//! through the `InvoiceStore` port with optimistic-concurrency retries.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use core_kernel::{CaseId, Currency, InvoiceId, OwnerId, PortError, Rate};
use rust_decimal_macros::dec;

use crate::error::BillingError;
use crate::invoice::{
    generate_invoice_number, ClientSnapshot, Invoice, InvoiceItem, ItemPricing,
};
use crate::payment::{Payment, PaymentDetails};
use crate::ports::{CaseDirectory, InvoiceQuery, InvoiceStore};

/// Retry ceiling for version-conflicted updates
const MAX_STALE_RETRIES: u32 = 3;

/// Caller-supplied fields for a new invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Explicit invoice number; generated when absent
    pub invoice_number: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub case_id: Option<CaseId>,
    pub client: ClientSnapshot,
    /// Defaults to DZD when absent
    pub currency: Option<Currency>,
    /// Defaults to 19% when absent
    pub tax_rate: Option<Rate>,
    pub items: Vec<NewInvoiceItem>,
    pub notes: Option<String>,
    pub terms_conditions: Option<String>,
}

/// Caller-supplied fields for a single line item
#[derive(Debug, Clone)]
pub struct NewInvoiceItem {
    pub description: String,
    pub pricing: ItemPricing,
    pub service_date: Option<NaiveDate>,
}

impl NewInvoiceItem {
    fn into_item(self) -> Result<InvoiceItem, BillingError> {
        InvoiceItem::new(self.description, self.pricing, self.service_date)
    }
}

/// Application service for invoice lifecycle operations
pub struct InvoiceLedger {
    store: Arc<dyn InvoiceStore>,
    cases: Arc<dyn CaseDirectory>,
}

impl InvoiceLedger {
    pub fn new(store: Arc<dyn InvoiceStore>, cases: Arc<dyn CaseDirectory>) -> Self {
        Self { store, cases }
    }

    /// Creates a draft invoice for the owner
    ///
    /// When the invoice references a case, the case must exist and
    /// belong to the same owner. The stored invoice is returned with
    /// totals derived and version assigned.
    #[instrument(skip(self, request), fields(owner = %owner))]
    pub async fn create_invoice(
        &self,
        owner: OwnerId,
        request: NewInvoice,
    ) -> Result<Invoice, BillingError> {
        if let Some(case_id) = request.case_id {
            self.cases
                .find_case(owner, case_id)
                .await
                .map_err(|err| match err {
                    PortError::NotFound { .. } => BillingError::InvalidCaseOwnership(case_id),
                    other => BillingError::Storage(other),
                })?;
        }

        let items = request
            .items
            .into_iter()
            .map(NewInvoiceItem::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        let invoice_number = request
            .invoice_number
            .unwrap_or_else(generate_invoice_number);
        let currency = request.currency.unwrap_or_default();
        let tax_rate = request
            .tax_rate
            .unwrap_or_else(|| Rate::from_percentage(dec!(19)));

        let mut invoice = Invoice::create(
            owner,
            invoice_number,
            request.invoice_date,
            request.due_date,
            request.case_id,
            request.client,
            currency,
            tax_rate,
            items,
        )?;
        invoice.notes = request.notes;
        invoice.terms_conditions = request.terms_conditions;

        let stored = self.store.insert(&invoice).await.map_err(|err| match err {
            PortError::Conflict { .. } => {
                BillingError::DuplicateInvoiceNumber(invoice.invoice_number.clone())
            }
            other => BillingError::Storage(other),
        })?;

        debug!(invoice_id = %stored.id, number = %stored.invoice_number, "invoice created");
        Ok(stored)
    }

    /// Fetches one of the owner's invoices
    pub async fn get_invoice(
        &self,
        owner: OwnerId,
        id: InvoiceId,
    ) -> Result<Invoice, BillingError> {
        self.store.fetch(owner, id).await.map_err(map_fetch_error)
    }

    /// Lists the owner's invoices
    pub async fn list_invoices(
        &self,
        owner: OwnerId,
        query: InvoiceQuery,
    ) -> Result<Vec<Invoice>, BillingError> {
        Ok(self.store.list(owner, query).await?)
    }

    /// Replaces a draft invoice's items and re-derives its totals
    #[instrument(skip(self, items), fields(owner = %owner, invoice_id = %id))]
    pub async fn replace_items(
        &self,
        owner: OwnerId,
        id: InvoiceId,
        items: Vec<NewInvoiceItem>,
    ) -> Result<Invoice, BillingError> {
        self.mutate(owner, id, move |invoice| {
            let items = items
                .iter()
                .cloned()
                .map(NewInvoiceItem::into_item)
                .collect::<Result<Vec<_>, _>>()?;
            invoice.replace_items(items)
        })
        .await
    }

    /// Transitions a draft invoice to sent
    #[instrument(skip(self), fields(owner = %owner, invoice_id = %id))]
    pub async fn send_invoice(
        &self,
        owner: OwnerId,
        id: InvoiceId,
    ) -> Result<Invoice, BillingError> {
        self.mutate(owner, id, |invoice| invoice.send()).await
    }

    /// Cancels an invoice
    #[instrument(skip(self), fields(owner = %owner, invoice_id = %id))]
    pub async fn cancel_invoice(
        &self,
        owner: OwnerId,
        id: InvoiceId,
    ) -> Result<Invoice, BillingError> {
        self.mutate(owner, id, |invoice| invoice.cancel()).await
    }

    /// Applies a payment to an invoice
    ///
    /// Returns the updated invoice together with the recorded payment.
    /// Concurrent payments against the same invoice are serialized by
    /// the store's version guard; a conflicted attempt re-reads and
    /// re-applies, so both payments land and the cumulative paid amount
    /// reflects each exactly once.
    #[instrument(skip(self, details), fields(owner = %owner, invoice_id = %id))]
    pub async fn apply_payment(
        &self,
        owner: OwnerId,
        id: InvoiceId,
        details: PaymentDetails,
    ) -> Result<(Invoice, Payment), BillingError> {
        let mut recorded = None;
        let invoice = self
            .mutate(owner, id, |invoice| {
                recorded = Some(invoice.apply_payment(details.clone(), owner)?);
                Ok(())
            })
            .await?;

        // mutate only returns Ok after the closure succeeded
        let payment = recorded.ok_or_else(|| {
            BillingError::Storage(PortError::internal("payment mutation yielded no record"))
        })?;
        Ok((invoice, payment))
    }

    /// Loads, mutates, and saves an invoice, retrying on version
    /// conflicts
    ///
    /// Each retry re-reads the invoice and re-applies the closure to the
    /// fresh copy, so domain validation always sees current state.
    async fn mutate<F>(
        &self,
        owner: OwnerId,
        id: InvoiceId,
        mut apply: F,
    ) -> Result<Invoice, BillingError>
    where
        F: FnMut(&mut Invoice) -> Result<(), BillingError>,
    {
        let mut attempt = 0;
        loop {
            let mut invoice = self.store.fetch(owner, id).await.map_err(map_fetch_error)?;
            apply(&mut invoice)?;

            match self.store.update(&invoice).await {
                Ok(stored) => return Ok(stored),
                Err(err) if err.is_stale() && attempt < MAX_STALE_RETRIES => {
                    attempt += 1;
                    warn!(invoice_id = %id, attempt, "stale invoice write, retrying");
                }
                Err(err) => return Err(map_fetch_error(err)),
            }
        }
    }
}

fn map_fetch_error(err: PortError) -> BillingError {
    match err {
        PortError::NotFound { ref id, .. } => BillingError::InvoiceNotFound(id.clone()),
        other => BillingError::Storage(other),
    }
}
