//! Route table.

mod credits;
mod deposits;
mod expenses;
mod health;
mod meter_readings;
mod payments;
mod reports;
mod sales;

use std::time::Duration;

use axum::routing::{get, patch, post};
use axum::Router;
use fuelbook_core::validation::validate_uuid;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiResult;
use crate::AppState;

/// Builds the router with tracing and a per-request timeout.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/sales", post(sales::create))
        .route("/sales/{id}", patch(sales::update).delete(sales::delete))
        .route("/expenses", post(expenses::create))
        .route("/expenses/{id}", patch(expenses::update).delete(expenses::delete))
        .route("/payments", post(payments::create))
        .route("/payments/{id}", patch(payments::update).delete(payments::delete))
        .route("/bank-deposits", post(deposits::create))
        .route("/bank-deposits/{id}", patch(deposits::update).delete(deposits::delete))
        .route("/credits", post(credits::create))
        .route("/credits/{id}", patch(credits::update).delete(credits::delete))
        .route("/meter-readings/batch", post(meter_readings::commit_batch))
        .route("/reports/daily", get(reports::daily))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Rejects a malformed path id before any lookup.
fn entity_id(id: &str) -> ApiResult<&str> {
    validate_uuid(id)?;
    Ok(id)
}
