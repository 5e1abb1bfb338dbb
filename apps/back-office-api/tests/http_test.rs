//! Drives the router end to end against an in-memory database.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use back_office_api::{build_router, AppState};
use chrono::Utc;
use fuelbook_core::{Bank, Money, Nozzle, Tank, Volume};
use fuelbook_db::{Database, DbConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

struct TestApp {
    app: Router,
    db: Database,
    branch_id: String,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let app = build_router(AppState::new(db.clone()), Duration::from_secs(5));
        TestApp {
            app,
            db,
            branch_id: Uuid::new_v4().to_string(),
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(&self.branch_id, "manager", method, uri, body).await
    }

    async fn send_as(
        &self,
        branch_id: &str,
        role: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-actor-id", "user-1")
            .header("x-branch-id", branch_id)
            .header("x-role", role)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        read(self.app.clone().oneshot(request).await.unwrap()).await
    }

    async fn bank(&self) -> String {
        let now = Utc::now();
        let bank = Bank {
            id: Uuid::new_v4().to_string(),
            branch_id: self.branch_id.clone(),
            name: "Test Bank".to_string(),
            balance_amount: Money::zero(),
            created_at: now,
            updated_at: now,
        };
        self.db.banks().insert(&bank).await.unwrap();
        bank.id
    }

    async fn petrol_nozzle(&self, tank_level_ml: i64) -> String {
        let now = Utc::now();
        self.db
            .fuel()
            .insert_tank(&Tank {
                id: Uuid::new_v4().to_string(),
                branch_id: self.branch_id.clone(),
                fuel_type: "petrol".to_string(),
                capacity: Volume::from_litres(20_000),
                current_level: Volume::from_ml(tank_level_ml),
                updated_at: now,
            })
            .await
            .unwrap();
        let nozzle = Nozzle {
            id: Uuid::new_v4().to_string(),
            branch_id: self.branch_id.clone(),
            machine_id: "MPD-1".to_string(),
            fuel_type: "petrol".to_string(),
            opening_reading: Volume::zero(),
            updated_at: now,
        };
        self.db.fuel().insert_nozzle(&nozzle).await.unwrap();
        nozzle.id
    }
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn sale(date: &str, cash: i64) -> Value {
    json!({ "date": date, "cashPayment": cash, "rate": cash })
}

fn reading(nozzle_id: &str, date: &str, opening: i64, closing: i64) -> Value {
    json!({
        "nozzleId": nozzle_id,
        "fuelType": "petrol",
        "sale": closing - opening,
        "fuelRate": 10_000,
        "totalAmount": (closing - opening) / 10,
        "openingReading": opening,
        "closingReading": closing,
        "date": date,
    })
}

#[tokio::test]
async fn health_check_works() {
    let t = TestApp::new().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = read(t.app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn sale_lifecycle_moves_the_daily_balance() {
    let t = TestApp::new().await;

    let (status, created) = t
        .send(Method::POST, "/sales", Some(sale("2024-01-05T06:00:00Z", 10_000)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["branchId"], t.branch_id.as_str());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = t
        .send(
            Method::PATCH,
            &format!("/sales/{id}"),
            Some(sale("2024-01-05T06:00:00Z", 15_000)),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["cashPayment"], 15_000);

    let (status, report) = t.send(Method::GET, "/reports/daily?day=2024-01-05", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totals"]["cashBalance"], 15_000);
    assert_eq!(report["totals"]["ledgerBalance"], 15_000);
    assert_eq!(report["sales"].as_array().unwrap().len(), 1);

    let (status, deleted) = t.send(Method::DELETE, &format!("/sales/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id.as_str());

    let (_, report) = t.send(Method::GET, "/reports/daily?day=2024-01-05", None).await;
    assert_eq!(report["totals"]["cashBalance"], 0);
    assert!(report["sales"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deposit_and_bank_expense_round_trip() {
    let t = TestApp::new().await;
    let bank = t.bank().await;

    let (status, _) = t
        .send(Method::POST, "/sales", Some(sale("2024-01-05T06:00:00Z", 50_000)))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, deposit) = t
        .send(
            Method::POST,
            "/bank-deposits",
            Some(json!({ "bankId": bank, "date": "2024-01-05T10:00:00Z", "amount": 20_000 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(deposit["bankId"], bank.as_str());

    let (status, _) = t
        .send(
            Method::POST,
            "/expenses",
            Some(json!({ "date": "2024-01-05T11:00:00Z", "amount": 5_000, "bankId": bank })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let balance = t.db.banks().get_by_id(&bank).await.unwrap().unwrap().balance_amount;
    assert_eq!(balance, Money::from_paise(15_000));

    let (_, report) = t.send(Method::GET, "/reports/daily?day=2024-01-05", None).await;
    // 50000 - 20000 - 5000
    assert_eq!(report["totals"]["cashBalance"], 25_000);
    assert_eq!(report["deposits"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_id_is_a_validation_error() {
    let t = TestApp::new().await;

    let (status, body) = t
        .send(Method::PATCH, "/sales/not-a-uuid", Some(sale("2024-01-05T06:00:00Z", 100)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = t.send(Method::DELETE, "/credits/42", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let t = TestApp::new().await;
    let id = Uuid::new_v4();

    let (status, body) = t.send(Method::DELETE, &format!("/expenses/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = t
        .send(
            Method::PATCH,
            &format!("/sales/{id}"),
            Some(sale("2024-01-05T06:00:00Z", 100)),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_branch_is_not_found_for_non_admin() {
    let t = TestApp::new().await;
    let (_, created) = t
        .send(Method::POST, "/sales", Some(sale("2024-01-05T06:00:00Z", 100)))
        .await;
    let uri = format!("/sales/{}", created["id"].as_str().unwrap());

    let other = Uuid::new_v4().to_string();
    let (status, _) = t.send_as(&other, "staff", Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t.send_as(&other, "admin", Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_context_headers_are_rejected() {
    let t = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/sales")
        .header("content-type", "application/json")
        .body(Body::from(sale("2024-01-05T06:00:00Z", 100).to_string()))
        .unwrap();
    let (status, body) = read(t.app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("x-actor-id"));
}

#[tokio::test]
async fn invalid_body_is_a_validation_error() {
    let t = TestApp::new().await;

    let (status, body) = t
        .send(Method::POST, "/sales", Some(json!({ "cashPayment": "lots" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = t
        .send(
            Method::POST,
            "/expenses",
            Some(json!({ "date": "2024-01-05T06:00:00Z", "amount": -5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn meter_reading_batch_commits_all_or_nothing() {
    let t = TestApp::new().await;
    let nozzle = t.petrol_nozzle(1_000_000).await;

    let too_much = json!({ "items": [
        reading(&nozzle, "2024-01-05T06:00:00Z", 0, 600_000),
        reading(&nozzle, "2024-01-06T06:00:00Z", 600_000, 1_200_000),
    ]});
    let (status, body) = t
        .send(Method::POST, "/meter-readings/batch", Some(too_much))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert!(body["message"].as_str().unwrap().contains("petrol"));

    let batch = json!({ "items": [
        reading(&nozzle, "2024-01-05T06:00:00Z", 0, 300_000),
        reading(&nozzle, "2024-01-06T06:00:00Z", 300_000, 700_000),
    ]});
    let (status, body) = t
        .send(Method::POST, "/meter-readings/batch", Some(batch))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["count"], 2);

    let again = json!({ "items": [reading(&nozzle, "2024-01-05T08:00:00Z", 700_000, 710_000)] });
    let (status, body) = t
        .send(Method::POST, "/meter-readings/batch", Some(again))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_READING");

    let (status, body) = t
        .send(Method::POST, "/meter-readings/batch", Some(json!({ "items": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn report_rejects_bad_day() {
    let t = TestApp::new().await;

    let (status, body) = t.send(Method::GET, "/reports/daily?day=05-01-2024", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = t.send(Method::GET, "/reports/daily", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
