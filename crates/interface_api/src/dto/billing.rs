//! Billing DTOs
//!
//! Line items use the external vocabulary: `rate` for the unit price or
//! hourly rate and `amount` for the line total. `tax_rate` crosses the
//! wire as a percentage (`19.00`), not a fraction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{CaseId, Currency, Money, Rate};
use domain_billing::{
    ClientSnapshot, Invoice, InvoiceItem, ItemPricing, NewInvoice, NewInvoiceItem, Payment,
    PaymentDetails, PaymentMethod,
};

use crate::error::ApiError;

fn default_quantity() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientDto {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Generated when absent
    pub invoice_number: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub case_id: Option<Uuid>,
    pub client: ClientDto,
    /// ISO 4217 code, defaults to DZD
    pub currency: Option<String>,
    /// Percentage, defaults to 19.00
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub items: Vec<InvoiceItemRequest>,
    pub notes: Option<String>,
    pub terms_conditions: Option<String>,
}

/// One line item as the wire sees it
///
/// Hourly items carry `hours_worked` and `hourly_rate`; everything else
/// is a unit item with `quantity` (default 1) and `rate`.
#[derive(Debug, Deserialize)]
pub struct InvoiceItemRequest {
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    #[serde(alias = "unit_price")]
    pub rate: Option<Decimal>,
    pub hours_worked: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub service_date: Option<NaiveDate>,
}

impl InvoiceItemRequest {
    fn into_new_item(self, currency: Currency) -> Result<NewInvoiceItem, ApiError> {
        let pricing = match self.hours_worked {
            Some(hours_worked) => {
                let hourly_rate = self.hourly_rate.or(self.rate).ok_or_else(|| {
                    ApiError::Validation("hourly item requires a rate".to_string())
                })?;
                ItemPricing::Hourly {
                    hours_worked,
                    hourly_rate: Money::new(hourly_rate, currency),
                }
            }
            None => {
                let rate = self.rate.or(self.hourly_rate).ok_or_else(|| {
                    ApiError::Validation("item requires a rate".to_string())
                })?;
                ItemPricing::Unit {
                    quantity: self.quantity,
                    unit_price: Money::new(rate, currency),
                }
            }
        };

        Ok(NewInvoiceItem {
            description: self.description,
            pricing,
            service_date: self.service_date,
        })
    }
}

impl CreateInvoiceRequest {
    pub fn into_new_invoice(self) -> Result<NewInvoice, ApiError> {
        let currency = self
            .currency
            .as_deref()
            .map(str::parse::<Currency>)
            .transpose()
            .map_err(|e| ApiError::Validation(e.to_string()))?
            .unwrap_or_default();

        let items = self
            .items
            .into_iter()
            .map(|item| item.into_new_item(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewInvoice {
            invoice_number: self.invoice_number,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            case_id: self.case_id.map(CaseId::from),
            client: ClientSnapshot {
                name: self.client.name,
                address: self.client.address,
                email: self.client.email,
                phone: self.client.phone,
            },
            currency: Some(currency),
            tax_rate: self.tax_rate.map(Rate::from_percentage),
            items,
            notes: self.notes,
            terms_conditions: self.terms_conditions,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl RecordPaymentRequest {
    pub fn into_details(self, currency: Currency) -> Result<PaymentDetails, ApiError> {
        let method: PaymentMethod = self
            .method
            .parse()
            .map_err(|e: String| ApiError::Validation(e))?;
        Ok(PaymentDetails {
            amount: Money::new(self.amount, currency),
            payment_date: self.payment_date,
            method,
            reference: self.reference,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub status: Option<String>,
    pub case_id: Option<Uuid>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceItemResponse {
    pub id: Uuid,
    pub description: String,
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    /// Unit price or hourly rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_worked: Option<Decimal>,
    /// Line total
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_date: Option<NaiveDate>,
}

impl From<&InvoiceItem> for InvoiceItemResponse {
    fn from(item: &InvoiceItem) -> Self {
        let (item_type, quantity, rate, hours_worked) = match &item.pricing {
            ItemPricing::Unit {
                quantity,
                unit_price,
            } => ("unit", Some(*quantity), Some(unit_price.amount()), None),
            ItemPricing::Hourly {
                hours_worked,
                hourly_rate,
            } => ("hourly", None, Some(hourly_rate.amount()), Some(*hours_worked)),
        };
        Self {
            id: *item.id.as_uuid(),
            description: item.description.clone(),
            item_type: item_type.to_string(),
            quantity,
            rate,
            hours_worked,
            amount: item.total_price.amount(),
            service_date: item.service_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            amount: payment.amount.amount(),
            payment_date: payment.payment_date,
            method: payment.method.as_str().to_string(),
            reference: payment.reference.clone(),
            recorded_at: payment.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<Uuid>,
    pub client_name: String,
    pub status: String,
    pub items: Vec<InvoiceItemResponse>,
    pub subtotal: Decimal,
    /// Percentage
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub outstanding: Decimal,
    /// Derived against today's date at response time
    pub is_overdue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub payments: Vec<PaymentResponse>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceResponse {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: *invoice.id.as_uuid(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            case_id: invoice.case_id.map(|id| *id.as_uuid()),
            client_name: invoice.client.name.clone(),
            status: invoice.status.as_str().to_string(),
            items: invoice.items.iter().map(Into::into).collect(),
            subtotal: invoice.subtotal.amount(),
            tax_rate: invoice.tax_rate.as_percentage(),
            tax_amount: invoice.tax_amount.amount(),
            total_amount: invoice.total_amount.amount(),
            amount_paid: invoice.amount_paid.amount(),
            outstanding: invoice.outstanding_amount().amount(),
            is_overdue: invoice.is_overdue(Utc::now().date_naive()),
            payment_date: invoice.payment_date,
            payments: invoice.payments.iter().map(Into::into).collect(),
            currency: invoice.currency.code().to_string(),
            notes: invoice.notes.clone(),
            created_at: invoice.created_at,
        }
    }
}
