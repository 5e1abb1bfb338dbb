//! Customer and supplier payment mutations.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fuelbook_core::{Payment, PaymentInput};

use super::entity_id;
use crate::context::Caller;
use crate::error::ApiResult;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    body: Result<Json<PaymentInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let Json(input) = body?;
    let payment = state.db.ledger().create_payment(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
    body: Result<Json<PaymentInput>, JsonRejection>,
) -> ApiResult<Json<Payment>> {
    let id = entity_id(&id)?;
    let Json(input) = body?;
    let payment = state.db.ledger().update_payment(&ctx, id, input).await?;
    Ok(Json(payment))
}

pub async fn delete(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Payment>> {
    let payment = state.db.ledger().delete_payment(&ctx, entity_id(&id)?).await?;
    Ok(Json(payment))
}
