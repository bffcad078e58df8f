//! Invoice handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::InvoiceId;
use domain_billing::{InvoiceQuery, InvoiceStatus};

use crate::auth::AuthenticatedOwner;
use crate::dto::billing::{
    CreateInvoiceRequest, InvoiceResponse, ListInvoicesQuery, RecordPaymentRequest,
};
use crate::error::ApiError;
use crate::AppState;

/// Creates a draft invoice
pub async fn create_invoice(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let invoice = state
        .ledger
        .create_invoice(owner, request.into_new_invoice()?)
        .await?;
    Ok((StatusCode::CREATED, Json((&invoice).into())))
}

/// Lists the owner's invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<InvoiceStatus>)
        .transpose()
        .map_err(|e: String| ApiError::Validation(e))?;

    let invoices = state
        .ledger
        .list_invoices(
            owner,
            InvoiceQuery {
                status,
                case_id: query.case_id.map(Into::into),
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(Json(invoices.iter().map(Into::into).collect()))
}

/// Gets an invoice by ID
pub async fn get_invoice(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state.ledger.get_invoice(owner, InvoiceId::from(id)).await?;
    Ok(Json((&invoice).into()))
}

/// Transitions a draft invoice to sent
pub async fn send_invoice(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state
        .ledger
        .send_invoice(owner, InvoiceId::from(id))
        .await?;
    Ok(Json((&invoice).into()))
}

/// Cancels a non-terminal invoice
pub async fn cancel_invoice(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state
        .ledger
        .cancel_invoice(owner, InvoiceId::from(id))
        .await?;
    Ok(Json((&invoice).into()))
}

/// Applies a payment to an invoice
///
/// The payment currency is the invoice currency; the amount in the
/// request body is interpreted in that currency.
pub async fn record_payment(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let id = InvoiceId::from(id);
    let invoice = state.ledger.get_invoice(owner, id).await?;
    let details = request.into_details(invoice.currency)?;

    let (invoice, _payment) = state.ledger.apply_payment(owner, id, details).await?;
    Ok((StatusCode::CREATED, Json((&invoice).into())))
}
