//! Sale mutations.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fuelbook_core::{Sale, SaleInput};

use super::entity_id;
use crate::context::Caller;
use crate::error::ApiResult;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    body: Result<Json<SaleInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let Json(input) = body?;
    let sale = state.db.ledger().create_sale(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    body: Result<Json<SaleInput>, JsonRejection>,
) -> ApiResult<Json<Sale>> {
    let id = entity_id(&id)?;
    let Json(input) = body?;
    let sale = state.db.ledger().update_sale(&ctx, id, input).await?;
    Ok(Json(sale))
}

pub async fn delete(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    let sale = state.db.ledger().delete_sale(&ctx, entity_id(&id)?).await?;
    Ok(Json(sale))
}
