//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tally_core::{ExpenseStore, FileStorage, MemoryStorage};
use tempfile::TempDir;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    create_router(ExpenseRepository::in_memory(), None, ServerConfig::default())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Create an expense through the API and return its id
async fn create(app: &Router, amount: f64, category: &str, description: &str, date: &str) -> String {
    let body = serde_json::json!({
        "amount": amount,
        "category": category,
        "description": description,
        "date": date,
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/expenses", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    json["id"].as_str().unwrap().to_string()
}

async fn seed(app: &Router) {
    create(app, 10.0, "Food", "Groceries", "2024-01-05").await;
    create(app, 20.0, "Food", "Dinner out", "2024-01-10").await;
    create(app, 5.0, "Bills", "Parking meter", "2024-02-01").await;
}

// ========== Status API Tests ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["expenses"], 0);
    assert_eq!(json["storage"], "memory");
}

#[tokio::test]
async fn test_list_categories() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories = json.as_array().unwrap();
    assert_eq!(categories.len(), 7);
    assert_eq!(categories[0]["name"], "Food");
    assert_eq!(categories[0]["color"], "#10b981");
    assert_eq!(categories[6]["name"], "Other");
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

// ========== Expense API Tests ==========

#[tokio::test]
async fn test_create_and_get_expense() {
    let app = setup_test_app();
    let id = create(&app, 12.5, "Food", "  Lunch  ", "2024-01-05").await;

    let response = app
        .oneshot(get(&format!("/api/expenses/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["amount"], 12.5);
    assert_eq!(json["category"], "Food");
    assert_eq!(json["description"], "Lunch");
    assert_eq!(json["date"], "2024-01-05");
    assert!(json.get("createdAt").is_some());
    assert!(json.get("updatedAt").is_some());
}

#[tokio::test]
async fn test_create_expense_validation_error() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "amount": 0,
        "category": "Food",
        "description": "Lunch",
        "date": "2024-01-05",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/expenses", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Amount must be greater than 0");

    let body = serde_json::json!({
        "amount": 5,
        "category": "Food",
        "description": "Lunch",
        "date": "2999-01-01",
    });
    let response = app
        .oneshot(send_json("POST", "/api/expenses", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Date cannot be in the future");
}

#[tokio::test]
async fn test_create_expense_category_defaults_to_other() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "amount": 3.5,
        "description": "Stamps",
        "date": "2024-01-05",
    });
    let response = app
        .oneshot(send_json("POST", "/api/expenses", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["category"], "Other");
}

#[tokio::test]
async fn test_list_expenses_sorted_and_filtered() {
    let app = setup_test_app();
    seed(&app).await;

    let response = app.clone().oneshot(get("/api/expenses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let all = json.as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["description"], "Parking meter");
    assert_eq!(all[2]["description"], "Groceries");

    let response = app
        .clone()
        .oneshot(get("/api/expenses?category=food&search=DINNER"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    let matched = json.as_array().unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0]["description"], "Dinner out");

    let response = app
        .oneshot(get("/api/expenses?from=2024-01-06&to=2024-01-31"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_expenses_bad_params() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(get("/api/expenses?category=Gadgets"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get("/api/expenses?from=01/05/2024"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("from"));
}

#[tokio::test]
async fn test_update_expense() {
    let app = setup_test_app();
    let id = create(&app, 12.5, "Food", "Lunch", "2024-01-05").await;

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/expenses/{}", id),
            serde_json::json!({"amount": 15.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["id"], id);
    assert_eq!(json["amount"], 15.0);
    assert_eq!(json["description"], "Lunch");
    assert_ne!(json["updatedAt"], json["createdAt"]);
}

#[tokio::test]
async fn test_update_expense_errors() {
    let app = setup_test_app();
    let id = create(&app, 12.5, "Food", "Lunch", "2024-01-05").await;

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/expenses/missing",
            serde_json::json!({"amount": 15.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Expense missing not found");

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/expenses/{}", id),
            serde_json::json!({"description": "x"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/expenses/missing",
            serde_json::json!({"amount": -1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(send_json(
            "PUT",
            "/api/expenses/missing",
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_expense_empty_body_touches() {
    let app = setup_test_app();
    let id = create(&app, 12.5, "Food", "Lunch", "2024-01-05").await;

    let response = app
        .oneshot(send_json(
            "PUT",
            &format!("/api/expenses/{}", id),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["amount"], 12.5);
    assert_eq!(json["description"], "Lunch");
    assert_ne!(json["updatedAt"], json["createdAt"]);
}

#[tokio::test]
async fn test_delete_expense() {
    let app = setup_test_app();
    let id = create(&app, 12.5, "Food", "Lunch", "2024-01-05").await;

    let response = app
        .clone()
        .oneshot(delete(&format!("/api/expenses/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/expenses/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again is a no-op
    let response = app
        .clone()
        .oneshot(delete(&format!("/api/expenses/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);

    let response = app.oneshot(get("/api/expenses")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_clear_expenses() {
    let app = setup_test_app();
    seed(&app).await;

    let response = app.clone().oneshot(delete("/api/expenses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);

    let response = app.oneshot(get("/api/expenses")).await.unwrap();
    let json = get_body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_write_still_serves_change() {
    let store = ExpenseStore::new(MemoryStorage::with_quota(16));
    let app = create_router(ExpenseRepository::open(store), None, ServerConfig::default());

    create(&app, 12.5, "Food", "Lunch", "2024-01-05").await;

    let response = app.oneshot(get("/api/expenses")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_file_backed_router_persists() {
    let dir = TempDir::new().unwrap();
    let open = || {
        let backend = FileStorage::new(dir.path()).unwrap();
        ExpenseRepository::open(ExpenseStore::new(backend))
    };

    let app = create_router(open(), None, ServerConfig::default());
    create(&app, 12.5, "Food", "Lunch", "2024-01-05").await;

    assert_eq!(open().len(), 1);
}

// ========== Report API Tests ==========

#[tokio::test]
async fn test_summary() {
    let app = setup_test_app();
    seed(&app).await;

    let response = app.oneshot(get("/api/summary")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["totalSpending"], 35.0);
    assert_eq!(json["categoryBreakdown"]["Food"], 30.0);
    assert_eq!(json["categoryBreakdown"]["Bills"], 5.0);
    assert_eq!(json["categoryBreakdown"]["Shopping"], 0.0);

    let top = json["topCategories"].as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["category"], "Food");
    assert_eq!(top[1]["category"], "Bills");
}

#[tokio::test]
async fn test_summary_empty() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/summary")).await.unwrap();
    let json = get_body_json(response).await;

    assert_eq!(json["totalSpending"], 0.0);
    assert_eq!(json["monthlySpending"], 0.0);
    assert!(json["topCategories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_trends() {
    let app = setup_test_app();

    let response = app.clone().oneshot(get("/api/trends")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 6);

    let response = app
        .clone()
        .oneshot(get("/api/trends?months=12"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    let trend = json.as_array().unwrap();
    assert_eq!(trend.len(), 12);
    assert!(trend[0].get("month").is_some());
    assert_eq!(trend[11]["count"], 0);

    let response = app.oneshot(get("/api/trends?months=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_trend() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(get("/api/trends/food?months=3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let trend = json.as_array().unwrap();
    assert_eq!(trend.len(), 3);
    // Category trends use month-only labels
    assert_eq!(trend[0]["month"].as_str().unwrap().len(), 3);

    let response = app.oneshot(get("/api/trends/Gadgets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Export API Tests ==========

#[tokio::test]
async fn test_export_csv() {
    let app = setup_test_app();
    create(&app, 12.5, "Food", "Lunch \"special\"", "2024-01-05").await;

    let response = app.oneshot(get("/api/export?format=csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"expenses.csv\""
    );

    let body = get_body_text(response).await;
    assert_eq!(
        body,
        "Date,Category,Description,Amount\nJan 5, 2024,Food,\"Lunch \"\"special\"\"\",12.50"
    );
}

#[tokio::test]
async fn test_export_json_filtered() {
    let app = setup_test_app();
    seed(&app).await;

    let response = app
        .oneshot(get("/api/export?format=json&category=Bills"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"expenses.json\""
    );

    let json = get_body_json(response).await;
    let exported = json.as_array().unwrap();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0]["description"], "Parking meter");
}

#[tokio::test]
async fn test_export_invalid_format() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/export?format=xlsx")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Invalid format. Use 'csv' or 'json'");
}

// ========== Error Mapping Tests ==========

#[test]
fn test_app_error_from_core() {
    use tally_core::Error;

    assert_eq!(
        AppError::from_core(Error::NotFound("x".into())).status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::from_core(Error::Validation("x".into())).status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::from_core(Error::Storage("disk full".into())).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
