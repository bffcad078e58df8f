//! Revenue analytics handlers

use axum::{extract::{Query, State}, http::StatusCode, Json};
use chrono::Utc;

use domain_analytics::RevenueSnapshot;

use crate::auth::AuthenticatedOwner;
use crate::dto::analytics::{GenerateReportRequest, RevenueAnalyticsResponse, RevenuePeriodQuery};
use crate::error::ApiError;
use crate::AppState;

/// Computes revenue metrics for a period, without persisting anything
pub async fn revenue_analytics(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Query(query): Query<RevenuePeriodQuery>,
) -> Result<Json<RevenueAnalyticsResponse>, ApiError> {
    let period = query.into_range()?;
    let metrics = state
        .aggregator
        .compute_analytics(owner, period, Utc::now().date_naive())
        .await?;
    Ok(Json(metrics.into()))
}

/// Generates and persists a revenue report snapshot
pub async fn generate_report(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Json(request): Json<GenerateReportRequest>,
) -> Result<(StatusCode, Json<RevenueSnapshot>), ApiError> {
    let period = request.into_range()?;
    let snapshot = state
        .aggregator
        .generate_revenue_report(owner, period, Utc::now().date_naive())
        .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Lists the owner's persisted report snapshots
pub async fn list_reports(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
) -> Result<Json<Vec<RevenueSnapshot>>, ApiError> {
    let snapshots = state.aggregator.list_snapshots(owner).await?;
    Ok(Json(snapshots))
}
