//! API error handling
//!
//! Domain errors are translated into HTTP statuses here, in one place,
//! so handlers stay thin: `?` on a domain call produces the right
//! status and a structured JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_analytics::AnalyticsError;
use domain_billing::BillingError;
use domain_expense::ExpenseError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => {
                error!(message = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    msg.clone(),
                )
            }
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvoiceNotFound(_) => ApiError::NotFound(err.to_string()),
            BillingError::InvalidCaseOwnership(_) => ApiError::Forbidden(err.to_string()),
            BillingError::DuplicateInvoiceNumber(_)
            | BillingError::DuplicatePayment { .. }
            | BillingError::InvalidStateTransition { .. } => ApiError::Conflict(err.to_string()),
            BillingError::InvalidAmount { .. }
            | BillingError::MissingRequiredField(_)
            | BillingError::InvalidDateRange { .. }
            | BillingError::Money(_) => ApiError::Validation(err.to_string()),
            BillingError::Storage(port) => port.into(),
        }
    }
}

impl From<ExpenseError> for ApiError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::ExpenseNotFound(_) => ApiError::NotFound(err.to_string()),
            ExpenseError::InvalidReimbursement { .. } => ApiError::Conflict(err.to_string()),
            ExpenseError::InvalidAmount { .. }
            | ExpenseError::MissingRequiredField(_)
            | ExpenseError::Money(_) => ApiError::Validation(err.to_string()),
            ExpenseError::Storage(port) => port.into(),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::InvalidPeriod(_) | AnalyticsError::Money(_) => {
                ApiError::Validation(err.to_string())
            }
            AnalyticsError::Storage(port) => port.into(),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { .. } => ApiError::Validation(err.to_string()),
            PortError::Conflict { .. } | PortError::Stale { .. } => {
                ApiError::Conflict(err.to_string())
            }
            PortError::Connection { .. } | PortError::Internal { .. } => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
