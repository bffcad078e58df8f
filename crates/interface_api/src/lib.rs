//! HTTP API Layer
//!
//! REST API for the practice management system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers per domain
//! - **Middleware**: Authentication, tracing, audit logging
//! - **DTOs**: Request/Response mapping, including external field aliases
//! - **Error Handling**: Consistent JSON error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(pool, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_analytics::RevenueAggregator;
use domain_billing::ports::{CaseDirectory, InvoiceStore};
use domain_billing::InvoiceLedger;
use domain_expense::{ExpenseStore, ExpenseTracker};
use infra_db::{
    PostgresCaseDirectory, PostgresExpenseStore, PostgresInvoiceStore, PostgresSnapshotStore,
};

use crate::config::ApiConfig;
use crate::handlers::{analytics, billing, expense, health};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<InvoiceLedger>,
    pub expenses: Arc<ExpenseTracker>,
    pub aggregator: Arc<RevenueAggregator>,
    pub pool: PgPool,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the domain services onto PostgreSQL adapters
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        let invoices: Arc<dyn InvoiceStore> = Arc::new(PostgresInvoiceStore::new(pool.clone()));
        let expenses: Arc<dyn ExpenseStore> = Arc::new(PostgresExpenseStore::new(pool.clone()));
        let cases: Arc<dyn CaseDirectory> = Arc::new(PostgresCaseDirectory::new(pool.clone()));
        let snapshots = Arc::new(PostgresSnapshotStore::new(pool.clone()));

        Self {
            ledger: Arc::new(InvoiceLedger::new(invoices.clone(), cases.clone())),
            expenses: Arc::new(ExpenseTracker::new(expenses.clone())),
            aggregator: Arc::new(RevenueAggregator::new(
                invoices, expenses, cases, snapshots,
            )),
            pool,
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Invoice routes
    let invoice_routes = Router::new()
        .route("/", post(billing::create_invoice))
        .route("/", get(billing::list_invoices))
        .route("/:id", get(billing::get_invoice))
        .route("/:id/send", post(billing::send_invoice))
        .route("/:id/cancel", post(billing::cancel_invoice))
        .route("/:id/payments", post(billing::record_payment));

    // Expense routes
    let expense_routes = Router::new()
        .route("/", post(expense::create_expense))
        .route("/", get(expense::list_expenses))
        .route("/:id", get(expense::get_expense))
        .route("/:id", put(expense::update_expense))
        .route("/:id", delete(expense::delete_expense))
        .route("/:id/reimburse", post(expense::reimburse_expense));

    // Analytics routes
    let analytics_routes = Router::new()
        .route("/revenue", get(analytics::revenue_analytics))
        .route("/revenue/report", post(analytics::generate_report))
        .route("/revenue/report", get(analytics::list_reports));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/invoices", invoice_routes)
        .nest("/expenses", expense_routes)
        .nest("/analytics", analytics_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
