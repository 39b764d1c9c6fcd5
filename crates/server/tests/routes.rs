use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use engine::Engine;

async fn app() -> (Router, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let user = engine
        .create_user("alice@example.com", "Alice")
        .await
        .unwrap();
    (server::router(engine), user.id)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn missing_or_unknown_caller_is_unauthorized() {
    let (app, _user) = app().await;

    let (status, body) = send(&app, "GET", "/accounts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "GET", "/accounts", Some(Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn posting_a_transaction_moves_the_balance() {
    let (app, user) = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/accounts",
        Some(user),
        Some(json!({"name": "Checking", "type": "checking", "opening_balance_minor": 50000})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let account_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(user),
        Some(json!({
            "account_id": account_id,
            "type": "expense",
            "amount_minor": 12000,
            "description": "Groceries",
            "transaction_date": "2024-03-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["account_name"], "Checking");
    let tx_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/transactions/{tx_id}"),
        Some(user),
        Some(json!({"amount_minor": 20000, "notes": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount_minor"], 20000);

    let (_, body) = send(&app, "GET", &format!("/accounts/{account_id}"), Some(user), None).await;
    assert_eq!(body["data"]["balance_minor"], 30000);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/accounts/{account_id}/audit"),
        Some(user),
        None,
    )
    .await;
    assert_eq!(body["data"]["consistent"], true);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/accounts/{account_id}"),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/transactions/{tx_id}"),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &format!("/accounts/{account_id}"), Some(user), None).await;
    assert_eq!(body["data"]["balance_minor"], 50000);
}

#[tokio::test]
async fn list_reports_page_meta() {
    let (app, user) = app().await;
    let (_, body) = send(
        &app,
        "POST",
        "/accounts",
        Some(user),
        Some(json!({"name": "Cash", "type": "cash"})),
    )
    .await;
    let account_id = body["data"]["id"].as_str().unwrap().to_string();

    for day in 1..=3 {
        send(
            &app,
            "POST",
            "/transactions",
            Some(user),
            Some(json!({
                "account_id": account_id,
                "type": "income",
                "amount_minor": 1000,
                "description": "Tip",
                "transaction_date": format!("2024-03-0{day}")
            })),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        "GET",
        "/transactions?page=2&limit=2&type=income",
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["total_pages"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "GET",
        "/transactions/summary?start_date=2024-03-01&end_date=2024-03-31",
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_income_minor"], 3000);
}

#[tokio::test]
async fn malformed_body_reports_field_errors() {
    let (app, user) = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/accounts",
        Some(user),
        Some(json!({"type": "checking"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["field"], "name");

    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(user),
        Some(json!({
            "account_id": Uuid::new_v4(),
            "type": "expense",
            "amount_minor": 0,
            "description": "Zero",
            "transaction_date": "2024-03-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn foreign_and_default_records_are_hidden_or_read_only() {
    let (app, user) = app().await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/transactions/{}", Uuid::new_v4()),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/categories?type=expense", Some(user), None).await;
    let categories = body["data"].as_array().unwrap();
    assert_eq!(categories.len(), 7);
    let default_id = categories[0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/categories/{default_id}"),
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/budgets",
        Some(user),
        Some(json!({
            "category_id": default_id,
            "amount_minor": 10000,
            "period": "monthly",
            "start_date": "2024-03-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["alert_threshold"], 80);

    let (status, body) = send(&app, "GET", "/budgets/alerts", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_path_and_query_use_the_error_envelope() {
    let (app, user) = app().await;

    let (status, body) = send(&app, "GET", "/transactions/not-a-uuid", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["field"], "id");

    let (status, body) = send(
        &app,
        "GET",
        "/transactions?start_date=2024-13-40",
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["errors"][0]["message"].is_string());

    let (status, body) = send(&app, "DELETE", "/budgets/123", Some(user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn dashboard_projections() {
    let (app, user) = app().await;
    let (_, body) = send(
        &app,
        "POST",
        "/accounts",
        Some(user),
        Some(json!({"name": "Checking", "type": "checking", "opening_balance_minor": 10000})),
    )
    .await;
    let account_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(&app, "GET", "/categories?type=expense", Some(user), None).await;
    let food_id = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Food & Dining")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    for (kind, amount, day, category) in [
        ("income", 4000, "2024-03-01", None),
        ("expense", 1500, "2024-03-02", Some(food_id.clone())),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/transactions",
            Some(user),
            Some(json!({
                "account_id": account_id,
                "category_id": category,
                "type": kind,
                "amount_minor": amount,
                "description": "Entry",
                "transaction_date": day
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/dashboard/stats?as_of=2024-03-15",
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_balance_minor"], 12500);
    assert_eq!(body["data"]["net_savings_minor"], 2500);
    assert_eq!(body["data"]["monthly_change"], 100.0);

    let (_, body) = send(
        &app,
        "GET",
        "/dashboard/monthly-trend?months=2&as_of=2024-03-15",
        Some(user),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["month"], "2024-02");
    assert_eq!(body["data"][1]["expense_minor"], 1500);

    let (_, body) = send(
        &app,
        "GET",
        "/dashboard/expense-by-category?start_date=2024-03-01&end_date=2024-03-31",
        Some(user),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["category_id"], food_id.as_str());
    assert_eq!(body["data"][0]["percentage"], 100.0);

    let (_, body) = send(
        &app,
        "GET",
        "/dashboard/recent-transactions?limit=1",
        Some(user),
        None,
    )
    .await;
    let recent = body["data"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["type"], "expense");
    assert_eq!(recent[0]["category_name"], "Food & Dining");

    let (status, body) = send(
        &app,
        "GET",
        "/dashboard/monthly-trend?months=abc",
        Some(user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
