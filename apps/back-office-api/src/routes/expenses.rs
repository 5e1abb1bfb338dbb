//! Expense mutations. A bank-funded expense also draws on the bank.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fuelbook_core::{Expense, ExpenseInput};

use super::entity_id;
use crate::context::Caller;
use crate::error::ApiResult;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    body: Result<Json<ExpenseInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let Json(input) = body?;
    let expense = state.db.ledger().create_expense(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    body: Result<Json<ExpenseInput>, JsonRejection>,
) -> ApiResult<Json<Expense>> {
    let id = entity_id(&id)?;
    let Json(input) = body?;
    let expense = state.db.ledger().update_expense(&ctx, id, input).await?;
    Ok(Json(expense))
}

pub async fn delete(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Expense>> {
    let expense = state.db.ledger().delete_expense(&ctx, entity_id(&id)?).await?;
    Ok(Json(expense))
}
