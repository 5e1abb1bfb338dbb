//! Bank deposit mutations.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fuelbook_core::{BankDeposit, BankDepositInput};

use super::entity_id;
use crate::context::Caller;
use crate::error::ApiResult;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    body: Result<Json<BankDepositInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BankDeposit>)> {
    let Json(input) = body?;
    let deposit = state.db.ledger().create_deposit(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(deposit)))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    body: Result<Json<BankDepositInput>, JsonRejection>,
) -> ApiResult<Json<BankDeposit>> {
    let id = entity_id(&id)?;
    let Json(input) = body?;
    let deposit = state.db.ledger().update_deposit(&ctx, id, input).await?;
    Ok(Json(deposit))
}

pub async fn delete(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<BankDeposit>> {
    let deposit = state.db.ledger().delete_deposit(&ctx, entity_id(&id)?).await?;
    Ok(Json(deposit))
}
