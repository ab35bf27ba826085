#![allow(clippy::unwrap_used)]

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use super::*;
use crate::auth::TokenService;
use crate::db::Database;

fn test_server() -> TestServer {
    let db = Database::open_in_memory().unwrap();
    let state = AppState::new(db, TokenService::new("test-secret"));
    TestServer::new(create_router(state)).unwrap()
}

fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

async fn register(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "name": "Test User", "password": "hunter2" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["access_token"].as_str().unwrap().to_string()
}

async fn food_category_id(server: &TestServer) -> i64 {
    let body: Value = server.get("/api/categories").await.json();
    body.as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Food & Dining")
        .unwrap()["id"]
        .as_i64()
        .unwrap()
}

async fn create_expense(server: &TestServer, token: &str, category_id: i64, amount: f64) -> Value {
    let (name, value) = auth_header(token);
    let response = server
        .post("/api/expenses")
        .add_header(name, value)
        .json(&json!({
            "amount": amount,
            "category_id": category_id,
            "description": "Lunch",
            // Stored timestamps carry millisecond precision
            "date": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

// ── Health and categories ─────────────────────────────────────

#[tokio::test]
async fn test_health_check() {
    let server = test_server();
    let response = server.get("/api/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_categories_are_public_and_seeded() {
    let server = test_server();
    let response = server.get("/api/categories").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 9);
}

// ── Auth ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_then_login() {
    let server = test_server();
    register(&server, "alice@example.com").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "hunter2" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_rejected() {
    let server = test_server();
    register(&server, "alice@example.com").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "alice@example.com", "name": "Again", "password": "x" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "ALREADY_REGISTERED");
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let server = test_server();
    register(&server, "alice@example.com").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = test_server();

    let response = server.get("/api/expenses").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let (name, value) = auth_header("garbage");
    let response = server.get("/api/dashboard").add_header(name, value).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

// ── Expenses ──────────────────────────────────────────────────

#[tokio::test]
async fn test_expense_create_and_list_round_trip() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;
    let food = food_category_id(&server).await;

    let created = create_expense(&server, &token, food, 25.5).await;
    assert_eq!(created["amount"], json!(25.5));
    assert_eq!(created["category_name"], "Food & Dining");

    let (name, value) = auth_header(&token);
    let response = server.get("/api/expenses").add_header(name, value).await;
    response.assert_status_ok();
    let body: Value = response.json();
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["amount"], json!(25.5));
    assert_eq!(listed[0]["description"], "Lunch");
    assert_eq!(listed[0]["date"], created["date"]);
}

#[tokio::test]
async fn test_expense_unknown_category_rejected() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;

    let (name, value) = auth_header(&token);
    let response = server
        .post("/api/expenses")
        .add_header(name, value)
        .json(&json!({
            "amount": 10.0,
            "category_id": 9999,
            "description": "???",
            "date": chrono::Utc::now().to_rfc3339(),
        }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "CATEGORY_NOT_FOUND");
}

#[tokio::test]
async fn test_expense_non_positive_amount_rejected() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;
    let food = food_category_id(&server).await;

    let (name, value) = auth_header(&token);
    let response = server
        .post("/api/expenses")
        .add_header(name, value)
        .json(&json!({
            "amount": 0.0,
            "category_id": food,
            "description": "free lunch",
            "date": chrono::Utc::now().to_rfc3339(),
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expense_update_restamps_category_name() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;
    let food = food_category_id(&server).await;

    let categories: Value = server.get("/api/categories").await.json();
    let travel = categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Travel")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let created = create_expense(&server, &token, food, 25.5).await;
    let id = created["id"].as_i64().unwrap();

    let (name, value) = auth_header(&token);
    let response = server
        .put(&format!("/api/expenses/{id}"))
        .add_header(name, value)
        .json(&json!({
            "amount": 320.0,
            "category_id": travel,
            "description": "Flight home",
            "date": chrono::Utc::now().to_rfc3339(),
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["category_name"], "Travel");
    assert_eq!(body["amount"], json!(320.0));
}

#[tokio::test]
async fn test_expense_delete_second_time_fails() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;
    let food = food_category_id(&server).await;

    let created = create_expense(&server, &token, food, 10.0).await;
    let id = created["id"].as_i64().unwrap();

    let (name, value) = auth_header(&token);
    let response = server
        .delete(&format!("/api/expenses/{id}"))
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();

    let response = server
        .delete(&format!("/api/expenses/{id}"))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expenses_isolated_between_users() {
    let server = test_server();
    let alice = register(&server, "alice@example.com").await;
    let bob = register(&server, "bob@example.com").await;
    let food = food_category_id(&server).await;

    let created = create_expense(&server, &alice, food, 25.5).await;
    let id = created["id"].as_i64().unwrap();

    let (name, value) = auth_header(&bob);
    let response = server
        .get("/api/expenses")
        .add_header(name.clone(), value.clone())
        .await;
    let body: Value = response.json();
    assert!(body.as_array().unwrap().is_empty());

    // Bob cannot delete Alice's expense either
    let response = server
        .delete(&format!("/api/expenses/{id}"))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

// ── Budgets ───────────────────────────────────────────────────

#[tokio::test]
async fn test_budget_create_reports_current_spend() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;
    let food = food_category_id(&server).await;

    create_expense(&server, &token, food, 25.5).await;

    let (name, value) = auth_header(&token);
    let response = server
        .post("/api/budgets")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "category_id": food, "monthly_limit": 100.0 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["category_name"], "Food & Dining");
    assert_eq!(body["spent_amount"], json!(25.5));

    let response = server.get("/api/budgets").add_header(name, value).await;
    response.assert_status_ok();
    let body: Value = response.json();
    let budgets = body.as_array().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0]["spent_amount"], json!(25.5));
}

#[tokio::test]
async fn test_budget_duplicate_rejected() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;
    let food = food_category_id(&server).await;

    let (name, value) = auth_header(&token);
    let response = server
        .post("/api/budgets")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "category_id": food, "monthly_limit": 100.0 }))
        .await;
    response.assert_status_ok();

    let response = server
        .post("/api/budgets")
        .add_header(name, value)
        .json(&json!({ "category_id": food, "monthly_limit": 200.0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "DUPLICATE_BUDGET");
}

#[tokio::test]
async fn test_budget_update_and_delete() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;
    let food = food_category_id(&server).await;

    let (name, value) = auth_header(&token);
    let response = server
        .post("/api/budgets")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "category_id": food, "monthly_limit": 100.0 }))
        .await;
    let id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/budgets/{id}"))
        .add_header(name.clone(), value.clone())
        .json(&json!({ "monthly_limit": 150.0 }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["monthly_limit"], json!(150.0));

    let response = server
        .delete(&format!("/api/budgets/{id}"))
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();

    let response = server
        .delete(&format!("/api/budgets/{id}"))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

// ── Dashboard ─────────────────────────────────────────────────

#[tokio::test]
async fn test_dashboard_empty_user() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;

    let (name, value) = auth_header(&token);
    let response = server.get("/api/dashboard").add_header(name, value).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total_expenses"], json!(0.0));
    assert_eq!(body["monthly_expenses"], json!(0.0));
    assert!(body["categories_breakdown"].as_array().unwrap().is_empty());
    assert!(body["recent_expenses"].as_array().unwrap().is_empty());
    assert!(body["budget_status"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_reflects_activity() {
    let server = test_server();
    let token = register(&server, "alice@example.com").await;
    let food = food_category_id(&server).await;

    create_expense(&server, &token, food, 25.5).await;
    create_expense(&server, &token, food, 10.0).await;

    let (name, value) = auth_header(&token);
    let response = server
        .post("/api/budgets")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "category_id": food, "monthly_limit": 100.0 }))
        .await;
    response.assert_status_ok();

    let response = server.get("/api/dashboard").add_header(name, value).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total_expenses"], json!(35.5));
    assert_eq!(body["monthly_expenses"], json!(35.5));
    assert_eq!(body["categories_breakdown"][0]["name"], "Food & Dining");
    assert_eq!(body["categories_breakdown"][0]["amount"], json!(35.5));
    assert_eq!(body["recent_expenses"].as_array().unwrap().len(), 2);
    assert_eq!(body["budget_status"][0]["spent_amount"], json!(35.5));
    assert_eq!(body["budget_status"][0]["percentage"], json!(35.5));
}
