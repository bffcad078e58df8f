//! PostgreSQL invoice store
//!
//! Implements the billing domain's `InvoiceStore` port. The invoice
//! header, line items, and payments are written in one transaction, and
//! updates are guarded by the `version` column: an `UPDATE` that matches
//! zero rows distinguishes a stale write from a missing invoice.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    CaseId, Currency, DateRange, DomainPort, InvoiceId, InvoiceItemId, Money, OwnerId,
    PaymentId, PortError, Rate,
};
use domain_billing::invoice::{ClientSnapshot, Invoice, InvoiceItem, InvoiceStatus, ItemPricing};
use domain_billing::payment::{Payment, PaymentMethod};
use domain_billing::ports::{InvoiceQuery, InvoiceStore};

use crate::error::classify_sqlx_error;

/// PostgreSQL-backed implementation of `InvoiceStore`
#[derive(Debug, Clone)]
pub struct PostgresInvoiceStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    invoice_number: String,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    case_id: Option<Uuid>,
    client_name: String,
    client_address: String,
    client_email: Option<String>,
    client_phone: Option<String>,
    status: String,
    subtotal: Decimal,
    tax_rate: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    amount_paid: Decimal,
    payment_date: Option<NaiveDate>,
    currency: String,
    notes: Option<String>,
    terms_conditions: Option<String>,
    owner_id: Uuid,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    description: String,
    pricing_type: String,
    quantity: Option<Decimal>,
    unit_price: Option<Decimal>,
    hours_worked: Option<Decimal>,
    hourly_rate: Option<Decimal>,
    total_price: Decimal,
    service_date: Option<NaiveDate>,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    invoice_id: Uuid,
    amount: Decimal,
    payment_date: NaiveDate,
    method: String,
    reference: Option<String>,
    notes: Option<String>,
    recorded_by: Uuid,
    created_at: DateTime<Utc>,
}

impl PostgresInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_invoice(
        &self,
        owner: OwnerId,
        id: InvoiceId,
    ) -> Result<Option<Invoice>, PortError> {
        let header = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, invoice_number, invoice_date, due_date, case_id,
                   client_name, client_address, client_email, client_phone,
                   status, subtotal, tax_rate, tax_amount, total_amount,
                   amount_paid, payment_date, currency, notes,
                   terms_conditions, owner_id, version, created_at, updated_at
            FROM invoices
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(*id.as_uuid())
        .bind(*owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        let Some(header) = header else {
            return Ok(None);
        };
        Ok(Some(self.assemble(header).await?))
    }

    async fn assemble(&self, header: InvoiceRow) -> Result<Invoice, PortError> {
        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, description, pricing_type, quantity, unit_price,
                   hours_worked, hourly_rate, total_price, service_date
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY position
            "#,
        )
        .bind(header.id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        let payments = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, invoice_id, amount, payment_date, method, reference,
                   notes, recorded_by, created_at
            FROM invoice_payments
            WHERE invoice_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(header.id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        row_to_invoice(header, items, payments)
    }

    async fn write_items(
        tx: &mut Transaction<'_, Postgres>,
        invoice: &Invoice,
    ) -> Result<(), PortError> {
        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(*invoice.id.as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(classify_sqlx_error)?;

        for (position, item) in invoice.items.iter().enumerate() {
            let (pricing_type, quantity, unit_price, hours_worked, hourly_rate) =
                match item.pricing {
                    ItemPricing::Unit {
                        quantity,
                        unit_price,
                    } => ("unit", Some(quantity), Some(unit_price.amount()), None, None),
                    ItemPricing::Hourly {
                        hours_worked,
                        hourly_rate,
                    } => (
                        "hourly",
                        None,
                        None,
                        Some(hours_worked),
                        Some(hourly_rate.amount()),
                    ),
                };

            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, description, pricing_type, quantity,
                    unit_price, hours_worked, hourly_rate, total_price,
                    service_date, position
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(*item.id.as_uuid())
            .bind(*invoice.id.as_uuid())
            .bind(&item.description)
            .bind(pricing_type)
            .bind(quantity)
            .bind(unit_price)
            .bind(hours_worked)
            .bind(hourly_rate)
            .bind(item.total_price.amount())
            .bind(item.service_date)
            .bind(position as i32)
            .execute(&mut **tx)
            .await
            .map_err(classify_sqlx_error)?;
        }
        Ok(())
    }

    /// Payments are append-only; re-inserting an already stored payment
    /// is a no-op.
    async fn write_payments(
        tx: &mut Transaction<'_, Postgres>,
        invoice: &Invoice,
    ) -> Result<(), PortError> {
        for payment in &invoice.payments {
            sqlx::query(
                r#"
                INSERT INTO invoice_payments (
                    id, invoice_id, amount, payment_date, method, reference,
                    notes, recorded_by, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(*payment.id.as_uuid())
            .bind(*payment.invoice_id.as_uuid())
            .bind(payment.amount.amount())
            .bind(payment.payment_date)
            .bind(payment.method.as_str())
            .bind(&payment.reference)
            .bind(&payment.notes)
            .bind(*payment.recorded_by.as_uuid())
            .bind(payment.created_at)
            .execute(&mut **tx)
            .await
            .map_err(classify_sqlx_error)?;
        }
        Ok(())
    }
}

impl DomainPort for PostgresInvoiceStore {}

#[async_trait]
impl InvoiceStore for PostgresInvoiceStore {
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    async fn insert(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
        let mut tx = self.pool.begin().await.map_err(classify_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, invoice_date, due_date, case_id,
                client_name, client_address, client_email, client_phone,
                status, subtotal, tax_rate, tax_amount, total_amount,
                amount_paid, payment_date, currency, notes,
                terms_conditions, owner_id, version, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, 1, $21, $22
            )
            "#,
        )
        .bind(*invoice.id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(invoice.invoice_date)
        .bind(invoice.due_date)
        .bind(invoice.case_id.map(|id| *id.as_uuid()))
        .bind(&invoice.client.name)
        .bind(&invoice.client.address)
        .bind(&invoice.client.email)
        .bind(&invoice.client.phone)
        .bind(invoice.status.as_str())
        .bind(invoice.subtotal.amount())
        .bind(invoice.tax_rate.as_decimal())
        .bind(invoice.tax_amount.amount())
        .bind(invoice.total_amount.amount())
        .bind(invoice.amount_paid.amount())
        .bind(invoice.payment_date)
        .bind(invoice.currency.code())
        .bind(&invoice.notes)
        .bind(&invoice.terms_conditions)
        .bind(*invoice.owner.as_uuid())
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(classify_sqlx_error)?;

        Self::write_items(&mut tx, invoice).await?;
        tx.commit().await.map_err(classify_sqlx_error)?;

        debug!(number = %invoice.invoice_number, "invoice inserted");
        let mut stored = invoice.clone();
        stored.version = 1;
        Ok(stored)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn fetch(&self, owner: OwnerId, id: InvoiceId) -> Result<Invoice, PortError> {
        self.load_invoice(owner, id)
            .await?
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id, version = invoice.version))]
    async fn update(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
        let mut tx = self.pool.begin().await.map_err(classify_sqlx_error)?;

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                invoice_number = $3, invoice_date = $4, due_date = $5,
                case_id = $6, client_name = $7, client_address = $8,
                client_email = $9, client_phone = $10, status = $11,
                subtotal = $12, tax_rate = $13, tax_amount = $14,
                total_amount = $15, amount_paid = $16, payment_date = $17,
                currency = $18, notes = $19, terms_conditions = $20,
                updated_at = $21, version = version + 1
            WHERE id = $1 AND owner_id = $2 AND version = $22
            "#,
        )
        .bind(*invoice.id.as_uuid())
        .bind(*invoice.owner.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(invoice.invoice_date)
        .bind(invoice.due_date)
        .bind(invoice.case_id.map(|id| *id.as_uuid()))
        .bind(&invoice.client.name)
        .bind(&invoice.client.address)
        .bind(&invoice.client.email)
        .bind(&invoice.client.phone)
        .bind(invoice.status.as_str())
        .bind(invoice.subtotal.amount())
        .bind(invoice.tax_rate.as_decimal())
        .bind(invoice.tax_amount.amount())
        .bind(invoice.total_amount.amount())
        .bind(invoice.amount_paid.amount())
        .bind(invoice.payment_date)
        .bind(invoice.currency.code())
        .bind(&invoice.notes)
        .bind(&invoice.terms_conditions)
        .bind(invoice.updated_at)
        .bind(invoice.version)
        .execute(&mut *tx)
        .await
        .map_err(classify_sqlx_error)?;

        if result.rows_affected() == 0 {
            // Zero rows: either a concurrent writer bumped the version or
            // the invoice is outside the owner's scope
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM invoices WHERE id = $1 AND owner_id = $2)",
            )
            .bind(*invoice.id.as_uuid())
            .bind(*invoice.owner.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(classify_sqlx_error)?;

            return if exists {
                Err(PortError::stale("Invoice", invoice.id))
            } else {
                Err(PortError::not_found("Invoice", invoice.id))
            };
        }

        Self::write_items(&mut tx, invoice).await?;
        Self::write_payments(&mut tx, invoice).await?;
        tx.commit().await.map_err(classify_sqlx_error)?;

        let mut stored = invoice.clone();
        stored.version += 1;
        Ok(stored)
    }

    async fn list(&self, owner: OwnerId, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
        let headers = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, invoice_number, invoice_date, due_date, case_id,
                   client_name, client_address, client_email, client_phone,
                   status, subtotal, tax_rate, tax_amount, total_amount,
                   amount_paid, payment_date, currency, notes,
                   terms_conditions, owner_id, version, created_at, updated_at
            FROM invoices
            WHERE owner_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR case_id = $3)
            ORDER BY invoice_date DESC, invoice_number
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(*owner.as_uuid())
        .bind(query.status.map(|status| status.as_str()))
        .bind(query.case_id.map(|id| *id.as_uuid()))
        .bind(query.limit.map(i64::from))
        .bind(query.offset.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        let mut invoices = Vec::with_capacity(headers.len());
        for header in headers {
            invoices.push(self.assemble(header).await?);
        }
        Ok(invoices)
    }

    async fn find_by_invoice_date(
        &self,
        owner: OwnerId,
        range: DateRange,
    ) -> Result<Vec<Invoice>, PortError> {
        let headers = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, invoice_number, invoice_date, due_date, case_id,
                   client_name, client_address, client_email, client_phone,
                   status, subtotal, tax_rate, tax_amount, total_amount,
                   amount_paid, payment_date, currency, notes,
                   terms_conditions, owner_id, version, created_at, updated_at
            FROM invoices
            WHERE owner_id = $1 AND invoice_date BETWEEN $2 AND $3
            ORDER BY invoice_date
            "#,
        )
        .bind(*owner.as_uuid())
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        let mut invoices = Vec::with_capacity(headers.len());
        for header in headers {
            invoices.push(self.assemble(header).await?);
        }
        Ok(invoices)
    }
}

fn row_to_invoice(
    header: InvoiceRow,
    items: Vec<ItemRow>,
    payments: Vec<PaymentRow>,
) -> Result<Invoice, PortError> {
    let currency = Currency::from_code(&header.currency)
        .map_err(|e| PortError::internal(format!("stored currency: {}", e)))?;
    let status: InvoiceStatus = header
        .status
        .parse()
        .map_err(|e: String| PortError::internal(format!("stored status: {}", e)))?;

    let items = items
        .into_iter()
        .map(|row| row_to_item(row, currency))
        .collect::<Result<Vec<_>, _>>()?;
    let payments = payments
        .into_iter()
        .map(|row| row_to_payment(row, currency))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Invoice {
        id: InvoiceId::from(header.id),
        invoice_number: header.invoice_number,
        invoice_date: header.invoice_date,
        due_date: header.due_date,
        case_id: header.case_id.map(CaseId::from),
        client: ClientSnapshot {
            name: header.client_name,
            address: header.client_address,
            email: header.client_email,
            phone: header.client_phone,
        },
        status,
        items,
        subtotal: Money::new(header.subtotal, currency),
        tax_rate: Rate::new(header.tax_rate),
        tax_amount: Money::new(header.tax_amount, currency),
        total_amount: Money::new(header.total_amount, currency),
        amount_paid: Money::new(header.amount_paid, currency),
        payment_date: header.payment_date,
        payments,
        currency,
        notes: header.notes,
        terms_conditions: header.terms_conditions,
        owner: OwnerId::from(header.owner_id),
        version: header.version,
        created_at: header.created_at,
        updated_at: header.updated_at,
    })
}

fn row_to_item(row: ItemRow, currency: Currency) -> Result<InvoiceItem, PortError> {
    let pricing = match row.pricing_type.as_str() {
        "unit" => ItemPricing::Unit {
            quantity: row
                .quantity
                .ok_or_else(|| PortError::internal("unit item without quantity"))?,
            unit_price: Money::new(
                row.unit_price
                    .ok_or_else(|| PortError::internal("unit item without unit_price"))?,
                currency,
            ),
        },
        "hourly" => ItemPricing::Hourly {
            hours_worked: row
                .hours_worked
                .ok_or_else(|| PortError::internal("hourly item without hours_worked"))?,
            hourly_rate: Money::new(
                row.hourly_rate
                    .ok_or_else(|| PortError::internal("hourly item without hourly_rate"))?,
                currency,
            ),
        },
        other => {
            return Err(PortError::internal(format!(
                "stored pricing type: {}",
                other
            )))
        }
    };

    Ok(InvoiceItem {
        id: InvoiceItemId::from(row.id),
        description: row.description,
        pricing,
        total_price: Money::new(row.total_price, currency),
        service_date: row.service_date,
    })
}

fn row_to_payment(row: PaymentRow, currency: Currency) -> Result<Payment, PortError> {
    let method: PaymentMethod = row
        .method
        .parse()
        .map_err(|e: String| PortError::internal(format!("stored payment method: {}", e)))?;

    Ok(Payment {
        id: PaymentId::from(row.id),
        invoice_id: InvoiceId::from(row.invoice_id),
        amount: Money::new(row.amount, currency),
        payment_date: row.payment_date,
        method,
        reference: row.reference,
        notes: row.notes,
        recorded_by: OwnerId::from(row.recorded_by),
        created_at: row.created_at,
    })
}
