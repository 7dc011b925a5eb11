//! Integration tests for the recommendation API
//!
//! Raw records are normalized into a temporary catalog database, loaded into
//! a recommender, and the axum router is driven in-process.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use catalog_harvest::catalog::normalize_file;
use catalog_harvest::config::ServerConfig;
use catalog_harvest::recommend::Recommender;
use catalog_harvest::server::build_router;
use catalog_harvest::storage::open_catalog;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use tower::ServiceExt;

const RAW_RECORDS: &str = concat!(
    r#"{"name":"Java 8","url":"https://x.com/solutions/java-8","category":"Knowledge","test_type_hint":"Knowledge & Skills","short_description":"Multi-choice test of Java programming","full_text":"Java"}"#,
    "\n",
    r#"{"assessment_name":"Sales Negotiation","url":"https://x.com/solutions/sales","categories":"Sales","description":"Negotiation scenarios for sales staff","adaptive":"yes","remote":"Remote testing available","duration":"25 minutes"}"#,
    "\n",
    "{not json\n",
    r#"{"name":"Java 8 duplicate","url":"https://x.com/solutions/java-8"}"#,
    "\n",
    r#"{"name":"Customer Care","url":"https://x.com/solutions/care","category":"Simulation","full_text":"Customer service call simulation","duration_minutes":"15"}"#,
    "\n",
);

fn build_app(dir: &TempDir) -> Router {
    let raw = dir.path().join("raw.jsonl");
    fs::write(&raw, RAW_RECORDS).unwrap();

    let mut store = open_catalog(&dir.path().join("catalog.db")).unwrap();
    normalize_file(&raw, &mut store).unwrap();

    let recommender = Recommender::load(&store).unwrap();
    build_router(recommender, &ServerConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn recommend_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/recommend")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_item_count() {
    let dir = TempDir::new().unwrap();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(build_app(&dir), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "n_items": 3}));
}

#[tokio::test]
async fn test_recommend_ranks_best_match_first() {
    let dir = TempDir::new().unwrap();
    let request = recommend_request(json!({"query": "sales negotiation", "top_k": 2}));

    let (status, body) = send(build_app(&dir), request).await;

    assert_eq!(status, StatusCode::OK);
    let items = body["recommended_assessments"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        json!({
            "url": "https://x.com/solutions/sales",
            "name": "Sales Negotiation",
            "adaptive_support": "Yes",
            "description": "Negotiation scenarios for sales staff",
            "duration": 25,
            "remote_support": "Yes",
            "test_type": ["Sales"]
        })
    );
}

#[tokio::test]
async fn test_recommend_normalizes_fields() {
    let dir = TempDir::new().unwrap();
    let request = recommend_request(json!({"query": "java programming"}));

    let (_, body) = send(build_app(&dir), request).await;
    let java = &body["recommended_assessments"][0];

    assert_eq!(java["name"], "Java 8");
    assert_eq!(java["adaptive_support"], "No");
    assert_eq!(java["remote_support"], "No");
    assert_eq!(java["duration"], 0);
    assert_eq!(java["test_type"], json!(["Knowledge & Skills"]));
}

#[tokio::test]
async fn test_default_top_k_returns_whole_small_catalog() {
    let dir = TempDir::new().unwrap();
    let request = recommend_request(json!({"query": "customer"}));

    let (_, body) = send(build_app(&dir), request).await;
    let items = body["recommended_assessments"].as_array().unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "Customer Care");
    assert_eq!(items[0]["description"], "Customer service call simulation");
    assert_eq!(items[0]["duration"], 15);
}

#[tokio::test]
async fn test_top_k_clamped_to_one() {
    let dir = TempDir::new().unwrap();
    let request = recommend_request(json!({"query": "java", "top_k": 0}));

    let (status, body) = send(build_app(&dir), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommended_assessments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let request = recommend_request(json!({"query": "   "}));

    let (status, body) = send(build_app(&dir), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "query must be non-empty"}));
}

#[tokio::test]
async fn test_empty_catalog_returns_no_results() {
    let app = build_router(Recommender::from_rows(&[]), &ServerConfig::default());
    let request = recommend_request(json!({"query": "java"}));

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"recommended_assessments": []}));
}
