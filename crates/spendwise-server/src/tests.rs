//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use spendwise_core::{MockBackend, RequestPolicy};
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "spendwise-test-boundary";

/// Workbook with Title/Amount/Date/Notes headers and date-formatted cells
const MARCH_XLSX: &[u8] = include_bytes!("../../../fixtures/march.xlsx");

fn test_settings() -> AiSettings {
    AiSettings {
        request: RequestPolicy {
            timeout: Duration::from_millis(500),
            max_retries: 0,
            retry_base_delay: Duration::from_millis(1),
        },
        ..Default::default()
    }
}

fn setup_app_with(ai: Option<AIClient>) -> Router {
    let db = Database::in_memory().unwrap();
    let state = AppState::new(db, ai, &test_settings(), ServerConfig::default());
    create_router(state, None)
}

fn setup_test_app() -> Router {
    setup_app_with(Some(AIClient::mock()))
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn upload_request(filename: &str, content: &str) -> Request<Body> {
    upload_bytes_request(filename, content.as_bytes())
}

fn upload_bytes_request(filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        b = BOUNDARY,
        f = filename
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/expenses/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

// ========== Expense API Tests ==========

#[tokio::test]
async fn test_create_and_list_expense() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/expenses",
            serde_json::json!({"title": "Pizza", "amount": 15.0, "date": "2024-03-01"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Expense added");
    let id = json["id"].as_i64().unwrap();

    let response = app.oneshot(get("/expenses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let expenses = json.as_array().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0]["id"], id);
    assert_eq!(expenses[0]["title"], "Pizza");
    // Mock backend labels by keyword
    assert_eq!(expenses[0]["category"], "Food");
}

#[tokio::test]
async fn test_create_expense_without_backend_is_other() {
    let app = setup_app_with(None);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/expenses",
            serde_json::json!({"title": "Pizza", "amount": 15.0, "date": "2024-03-01"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(app.oneshot(get("/expenses")).await.unwrap()).await;
    assert_eq!(json[0]["category"], "Other");
}

#[tokio::test]
async fn test_create_expense_invalid_body() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/expenses",
            serde_json::json!({"title": "Pizza", "amount": "lots"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].is_string());

    let response = app
        .oneshot(json_request(
            "POST",
            "/expenses",
            serde_json::json!({"title": "Refund", "amount": -4.0, "date": "2024-03-01"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_expenses_by_month() {
    let app = setup_test_app();

    for (title, date) in [("Rent", "2024-03-15"), ("Rent", "2024-04-01")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/expenses",
                serde_json::json!({"title": title, "amount": 900.0, "date": date}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let json = get_body_json(app.oneshot(get("/expenses?month=2024-03")).await.unwrap()).await;
    let expenses = json.as_array().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0]["date"], "2024-03-15");
}

#[tokio::test]
async fn test_delete_expenses_is_idempotent() {
    let app = setup_test_app();

    let json = get_body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/expenses",
                serde_json::json!({"title": "Movie", "amount": 12.0, "date": "2024-03-20"}),
            ))
            .await
            .unwrap(),
    )
    .await;
    let id = json["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/expenses",
            serde_json::json!({"ids": [id, 9999]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Expenses deleted");
    assert_eq!(json["deleted"], 1);

    let response = app
        .oneshot(json_request(
            "DELETE",
            "/expenses",
            serde_json::json!({"ids": [id]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["deleted"], 0);
}

// ========== Upload API Tests ==========

#[tokio::test]
async fn test_upload_csv() {
    let app = setup_test_app();

    let csv = "title,amount,date\nPizza,15,2024-03-01\nUber,22.5,2024-03-02\nElectricity bill,80,2024-03-03";
    let response = app
        .clone()
        .oneshot(upload_request("march.csv", csv))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "3 expenses uploaded successfully");
    assert_eq!(json["count"], 3);

    let json = get_body_json(app.oneshot(get("/expenses")).await.unwrap()).await;
    let categories: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Food", "Travel", "Bills"]);
}

#[tokio::test]
async fn test_upload_missing_column_rejected() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(upload_request("march.csv", "title,date\nPizza,2024-03-01"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("amount"));

    let json = get_body_json(app.oneshot(get("/expenses")).await.unwrap()).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_unsupported_type() {
    let app = setup_test_app();

    let response = app
        .oneshot(upload_request("notes.txt", "title,amount,date"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = setup_test_app();

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/expenses/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["error"], "Missing file field");
}

#[tokio::test]
async fn test_upload_xlsx() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(upload_bytes_request("march.xlsx", MARCH_XLSX))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["count"], 3);

    let json = get_body_json(app.oneshot(get("/expenses")).await.unwrap()).await;
    let stored: Vec<(&str, f64, &str, &str)> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["title"].as_str().unwrap(),
                e["amount"].as_f64().unwrap(),
                e["date"].as_str().unwrap(),
                e["category"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        stored,
        vec![
            ("Pizza", 15.0, "2024-03-01", "Food"),
            ("Electricity bill", 80.25, "2024-03-03", "Bills"),
            ("Uber to airport", 22.5, "2024-03-04", "Travel"),
        ]
    );
}

#[tokio::test]
async fn test_upload_corrupt_workbook_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(upload_request("book.xlsx", "not a workbook"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = get_body_json(response).await["error"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(error.starts_with("Spreadsheet error"), "got: {}", error);

    let json = get_body_json(app.oneshot(get("/expenses")).await.unwrap()).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_non_utf8_csv_is_bad_request() {
    let app = setup_test_app();

    // Latin-1 "Café"
    let csv = b"title,amount,date\nCaf\xe9,3,2024-03-01\n";
    let response = app
        .oneshot(upload_bytes_request("latin1.csv", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = get_body_json(response).await["error"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(error.starts_with("CSV parsing error"), "got: {}", error);
}

// ========== Summary and Insights API Tests ==========

#[tokio::test]
async fn test_expense_summary() {
    let app = setup_test_app();

    let csv = "title,amount,date\nLunch,10,2024-03-01\nDinner,30,2024-03-02\nTrain,25,2024-03-05";
    app.clone()
        .oneshot(upload_request("march.csv", csv))
        .await
        .unwrap();

    let response = app
        .oneshot(get("/expenses/summary?month=2024-03"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let totals = json.as_array().unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0]["category"], "Food");
    assert_eq!(totals[0]["total"], 40.0);
    assert_eq!(totals[0]["count"], 2);
}

#[tokio::test]
async fn test_insights_within_budget() {
    let mock = MockBackend::new().with_response("Mostly food.");
    let app = setup_app_with(Some(AIClient::Mock(mock.clone())));

    app.clone()
        .oneshot(json_request(
            "POST",
            "/expenses",
            serde_json::json!({"title": "Groceries", "amount": 120.0, "date": "2024-03-03"}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get("/insights?budget=1000&month=2024-03"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["summary"], "Mostly food.");
    assert_eq!(
        json["budget_alert"],
        "✅ You are within budget. Total spent: ₹120.00"
    );
    // One categorization call plus one summary call
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_insights_empty_month() {
    let app = setup_test_app();

    let response = app
        .oneshot(get("/insights?budget=500&month=2030-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["summary"], "No expenses recorded yet.");
    assert!(json["budget_alert"].as_str().unwrap().contains('0'));
}

#[tokio::test]
async fn test_insights_requires_parameters() {
    let app = setup_test_app();

    let response = app.oneshot(get("/insights?month=2024-03")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_insights_backend_failure_is_bad_gateway() {
    let app = setup_app_with(Some(AIClient::Mock(MockBackend::failing())));

    app.clone()
        .oneshot(json_request(
            "POST",
            "/expenses",
            serde_json::json!({"title": "Flight", "amount": 5000.0, "date": "2024-03-03"}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get("/insights?budget=1000&month=2024-03"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "AI insights are currently unavailable");
}

// ========== Health and Hardening Tests ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["ai_backend"], "mock");
    assert_eq!(json["ai_available"], true);
}

#[tokio::test]
async fn test_health_without_backend() {
    let app = setup_app_with(None);

    let json = get_body_json(app.oneshot(get("/health")).await.unwrap()).await;
    assert!(json["ai_backend"].is_null());
    assert_eq!(json["ai_available"], false);
}

#[tokio::test]
async fn test_health_stalled_backend_reports_unavailable() {
    let stalled = MockBackend::new().with_delay(Duration::from_secs(30));
    let app = setup_app_with(Some(AIClient::Mock(stalled)));

    let started = std::time::Instant::now();
    let response = app.oneshot(get("/health")).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["ai_backend"], "mock");
    assert_eq!(json["ai_available"], false);
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}

#[test]
fn test_core_error_status_mapping() {
    let err: AppError = spendwise_core::Error::InvalidImportSchema("amount".into()).into();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let err: AppError = spendwise_core::Error::NotFound("Expense 3".into()).into();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let err: AppError = spendwise_core::Error::Config("bad".into()).into();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_server_config_default_is_same_origin() {
    assert!(ServerConfig::default().allowed_origins.is_empty());
}
