//! Meter-reading batch ingestion.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use fuelbook_core::MeterReadingBatch;
use serde::Serialize;

use crate::context::Caller;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub ok: bool,
    pub count: usize,
    pub batch_id: String,
}

/// All lines are committed or none are. Rejections come back as 400 with
/// the offending fuel type or nozzle in the message.
pub async fn commit_batch(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    body: Result<Json<MeterReadingBatch>, JsonRejection>,
) -> ApiResult<Json<BatchResponse>> {
    let Json(batch) = body?;
    let outcome = state.db.stock().commit_batch(&ctx, batch).await?;
    Ok(Json(BatchResponse {
        ok: true,
        count: outcome.count,
        batch_id: outcome.batch_id,
    }))
}
