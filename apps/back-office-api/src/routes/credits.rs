//! Credit sale mutations.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fuelbook_core::{Credit, CreditInput};

use super::entity_id;
use crate::context::Caller;
use crate::error::ApiResult;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    body: Result<Json<CreditInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Credit>)> {
    let Json(input) = body?;
    let credit = state.db.ledger().create_credit(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(credit)))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    body: Result<Json<CreditInput>, JsonRejection>,
) -> ApiResult<Json<Credit>> {
    let id = entity_id(&id)?;
    let Json(input) = body?;
    let credit = state.db.ledger().update_credit(&ctx, id, input).await?;
    Ok(Json(credit))
}

pub async fn delete(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Credit>> {
    let credit = state.db.ledger().delete_credit(&ctx, entity_id(&id)?).await?;
    Ok(Json(credit))
}
