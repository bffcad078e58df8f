//! Expense handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use core_kernel::ExpenseId;
use domain_expense::{ExpenseCategory, ExpenseQuery};

use crate::auth::AuthenticatedOwner;
use crate::dto::expense::{
    CreateExpenseRequest, ExpenseResponse, ListExpensesQuery, ReimburseRequest,
    UpdateExpenseRequest,
};
use crate::error::ApiError;
use crate::AppState;

/// Records a new expense
pub async fn create_expense(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let expense = state
        .expenses
        .record_expense(owner, request.into_new_expense()?)
        .await?;
    Ok((StatusCode::CREATED, Json((&expense).into())))
}

/// Lists the owner's expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Query(query): Query<ListExpensesQuery>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(str::parse::<ExpenseCategory>)
        .transpose()
        .map_err(|e: String| ApiError::Validation(e))?;

    let expenses = state
        .expenses
        .list_expenses(
            owner,
            ExpenseQuery {
                case_id: query.case_id.map(Into::into),
                category,
                from: query.from,
                to: query.to,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;
    Ok(Json(expenses.iter().map(Into::into).collect()))
}

/// Gets an expense by ID
pub async fn get_expense(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let expense = state
        .expenses
        .get_expense(owner, ExpenseId::from(id))
        .await?;
    Ok(Json((&expense).into()))
}

/// Updates an expense's mutable fields
pub async fn update_expense(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateExpenseRequest>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let expense = state
        .expenses
        .update_expense(owner, ExpenseId::from(id), request.into_update()?)
        .await?;
    Ok(Json((&expense).into()))
}

/// Deletes an expense
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .expenses
        .delete_expense(owner, ExpenseId::from(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Marks a reimbursable expense as reimbursed
pub async fn reimburse_expense(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<Uuid>,
    Json(request): Json<ReimburseRequest>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let on = request
        .reimbursement_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let expense = state
        .expenses
        .mark_reimbursed(owner, ExpenseId::from(id), on)
        .await?;
    Ok(Json((&expense).into()))
}
