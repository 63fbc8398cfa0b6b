//! End-to-end HTTP tests against in-memory stores

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use pricing_server::pricing::ReferenceCatalog;
use pricing_server::{Config, ServerState, build_app};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let catalog = ReferenceCatalog::builtin().unwrap();
    build_app(ServerState::in_memory(Config::for_tests(), catalog))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
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

fn scenario_a_row() -> Value {
    json!({
        "Marca": "Acubat",
        "Tipo": "12X45",
        "Precio Lista": 136490,
        "Costo": 81954
    })
}

#[tokio::test]
async fn health_reports_memory_storage() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
    assert!(body["catalog_products"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn pricing_run_prices_matched_row() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/pricing/run",
        Some(json!({ "rows": [scenario_a_row()] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_rows"], 1);
    assert_eq!(body["matched"], 1);
    assert_eq!(body["config_source"], "defaults");

    let product = &body["products"][0];
    assert_eq!(product["resolution"]["status"], "matched");
    assert_eq!(product["resolution"]["reference_code"], "VA45BD");
    assert_eq!(product["retail"]["final_price_rounded"].as_f64(), Some(198330.0));
    assert_eq!(product["wholesale"]["final_price_rounded"].as_f64(), Some(80.0));
    assert_eq!(product["wholesale"]["profitability"], "excellent");
    assert_eq!(product["list"]["final_price_rounded"].as_f64(), Some(165152.9));
}

#[tokio::test]
async fn pricing_run_keeps_malformed_and_unmatched_rows() {
    let app = app();
    let rows = json!([
        scenario_a_row(),
        { "Tipo": "UNKNOWN-999", "Costo": 1000 },
        { "Marca": "Willard", "Costo": 10 },
    ]);
    let (status, body) =
        call(&app, Method::POST, "/api/pricing/run", Some(json!({ "rows": rows }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["priced_products"], 2);
    assert_eq!(body["unmatched"], 1);
    assert_eq!(body["error_rows"], 1);
    assert_eq!(body["errors"][0]["row_index"], 2);

    let unmatched = &body["products"][1];
    assert_eq!(unmatched["resolution"]["status"], "unmatched");
    assert!(unmatched.get("list").is_none());
    assert_eq!(unmatched["wholesale"]["used_fallback_basis"], true);
}

#[tokio::test]
async fn pricing_run_with_column_mapping() {
    let app = app();
    let request = json!({
        "rows": [{ "Articulo": "VA60DD/E", "Neto": "1.500,00" }],
        "mapping": { "model": "Articulo", "cost": "Neto" }
    });
    let (status, body) = call(&app, Method::POST, "/api/pricing/run", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    let product = &body["products"][0];
    assert_eq!(product["resolution"]["strategy"], "exact_code");
    assert_eq!(product["cost_basis"].as_f64(), Some(1500.0));
}

#[tokio::test]
async fn single_product_pricing() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/pricing/product",
        Some(json!({ "row": scenario_a_row() })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resolution"]["reference_code"], "VA45BD");
    assert_eq!(body["retail"]["final_price_rounded"].as_f64(), Some(198330.0));
    assert_eq!(body["wholesale"]["profitability"], "excellent");

    let (_, runs) = call(&app, Method::GET, "/api/pricing/runs", None).await;
    assert_eq!(runs.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn single_product_without_model_is_bad_request() {
    let app = app();
    let row = json!({ "Marca": "Willard", "Costo": 10 });
    let (status, body) =
        call(&app, Method::POST, "/api/pricing/product", Some(json!({ "row": row }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6003);
    assert_eq!(body["message"], "missing type/model");
    assert_eq!(body["details"]["row_index"], 0);
}

#[tokio::test]
async fn empty_batch_is_bad_request() {
    let app = app();
    let (status, body) =
        call(&app, Method::POST, "/api/pricing/run", Some(json!({ "rows": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6001);
}

#[tokio::test]
async fn runs_are_recorded_newest_first() {
    let app = app();
    for _ in 0..2 {
        call(
            &app,
            Method::POST,
            "/api/pricing/run",
            Some(json!({ "rows": [scenario_a_row()] })),
        )
        .await;
    }

    let (status, body) = call(&app, Method::GET, "/api/pricing/runs?limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    let runs = body.as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs[0]["started_at"].as_i64() >= runs[1]["started_at"].as_i64());
    assert_eq!(runs[0]["matched"], 1);
}

#[tokio::test]
async fn config_update_applies_to_next_run() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/api/pricing/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "defaults");
    assert_eq!(body["config"]["tax_rate_percent"].as_f64(), Some(21.0));

    let mut config = body["config"].clone();
    config["markups"]["retail_percent"] = json!(70);
    let (status, body) = call(&app, Method::PUT, "/api/pricing/config", Some(config)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "stored");
    assert!(body["config"]["updated_at"].as_i64().is_some());

    let row = json!({ "Tipo": "UNKNOWN-999", "Costo": 100 });
    let (_, run) =
        call(&app, Method::POST, "/api/pricing/run", Some(json!({ "rows": [row] }))).await;
    assert_eq!(run["config_source"], "stored");
    assert_eq!(run["products"][0]["retail"]["net_price"].as_f64(), Some(170.0));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let app = app();
    let (_, body) = call(&app, Method::GET, "/api/pricing/config", None).await;

    let mut config = body["config"].clone();
    config["tax_rate_percent"] = json!(150);
    let (status, body) = call(&app, Method::PUT, "/api/pricing/config", Some(config)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6002);
    assert_eq!(body["details"]["field"], "tax_rate_percent");

    let (_, body) = call(&app, Method::GET, "/api/pricing/config", None).await;
    assert_eq!(body["source"], "defaults");
}

#[tokio::test]
async fn config_reset_restores_defaults() {
    let app = app();
    let (_, body) = call(&app, Method::GET, "/api/pricing/config", None).await;
    let mut config = body["config"].clone();
    config["tax_rate_percent"] = json!(10);
    call(&app, Method::PUT, "/api/pricing/config", Some(config)).await;

    let (status, body) = call(&app, Method::DELETE, "/api/pricing/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"]["tax_rate_percent"].as_f64(), Some(21.0));
}

#[tokio::test]
async fn catalog_lookup_and_search() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/api/pricing/catalog/VA45BD", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["net_price"].as_f64(), Some(42.8));

    let (status, body) = call(&app, Method::GET, "/api/pricing/catalog/va60dd%2Fe", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "VA60DD/E");

    let (status, body) = call(&app, Method::GET, "/api/pricing/catalog/search?q=hilux", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = call(&app, Method::GET, "/api/pricing/catalog/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["priceless_products"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn catalog_missing_code_is_not_found() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/pricing/catalog/NOPE-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 7001);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
