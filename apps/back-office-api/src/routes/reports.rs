//! Daily report.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use fuelbook_core::validation::validate_uuid_field;
use fuelbook_core::DayKey;
use fuelbook_db::DailyReport;
use serde::Deserialize;

use crate::context::Caller;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub day: String,
    pub branch: Option<String>,
}

/// `GET /reports/daily?day=YYYY-MM-DD&branch=<id>`
pub async fn daily(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    query: Result<Query<DailyQuery>, QueryRejection>,
) -> ApiResult<Json<DailyReport>> {
    let Query(query) = query?;
    let day: DayKey = query.day.parse()?;
    if let Some(branch) = &query.branch {
        validate_uuid_field("branch", branch)?;
    }

    let report = state
        .db
        .totals()
        .daily_report(&ctx, query.branch.as_deref(), day)
        .await?;
    Ok(Json(report))
}
