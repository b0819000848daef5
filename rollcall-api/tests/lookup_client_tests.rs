//! Lookup client tests against a local mock of the three lookup services

use axum::{
    extract::Query,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rollcall_api::services::lookup_client::{LookupError, LookupService};
use rollcall_api::services::{enrich, LookupClient, NameLookup};
use rollcall_common::config::LookupConfig;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;

#[derive(Deserialize)]
struct NameQuery {
    name: String,
}

async fn age(Query(q): Query<NameQuery>) -> Json<Value> {
    Json(json!({ "count": 1234, "name": q.name, "age": 30 }))
}

async fn gender(Query(q): Query<NameQuery>) -> Json<Value> {
    Json(json!({ "count": 1234, "name": q.name, "gender": "female", "probability": 0.98 }))
}

async fn nationality(Query(q): Query<NameQuery>) -> Json<Value> {
    Json(json!({
        "count": 1234,
        "name": q.name,
        "country": [
            { "country_id": "US", "probability": 0.4 },
            { "country_id": "GB", "probability": 0.2 }
        ]
    }))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::TOO_MANY_REQUESTS, "rate limited")
}

async fn garbage() -> &'static str {
    "<html>not json</html>"
}

/// Test helper: Start the mock services, return their base URL
async fn start_mock() -> String {
    let app = Router::new()
        .route("/age", get(age))
        .route("/gender", get(gender))
        .route("/nationality", get(nationality))
        .route("/broken", get(broken))
        .route("/garbage", get(garbage));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn endpoints(base: &str, age: &str, gender: &str, nationality: &str) -> LookupConfig {
    LookupConfig {
        age_url: format!("{}{}", base, age),
        gender_url: format!("{}{}", base, gender),
        nationality_url: format!("{}{}", base, nationality),
    }
}

#[tokio::test]
async fn test_decodes_all_three_services() {
    let base = start_mock().await;
    let client = LookupClient::new(endpoints(&base, "/age", "/gender", "/nationality")).unwrap();

    assert_eq!(client.age("Alice").await.unwrap().age, Some(30));
    assert_eq!(
        client.gender("Alice").await.unwrap().gender.as_deref(),
        Some("female")
    );

    let nationality = client.nationality("Alice").await.unwrap();
    assert_eq!(nationality.country.len(), 2);
    assert_eq!(nationality.top_country(), Some("US"));
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let base = start_mock().await;
    let client = LookupClient::new(endpoints(&base, "/broken", "/gender", "/nationality")).unwrap();

    let err = client.age("Alice").await.unwrap_err();

    match err {
        LookupError::Status {
            service,
            status,
            body,
        } => {
            assert_eq!(service, LookupService::Age);
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let base = start_mock().await;
    let client = LookupClient::new(endpoints(&base, "/age", "/garbage", "/nationality")).unwrap();

    let err = client.gender("Alice").await.unwrap_err();

    assert!(matches!(err, LookupError::Decode { .. }));
    assert_eq!(err.service(), Some(LookupService::Gender));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base = format!("http://{}", addr);
    let client = LookupClient::new(endpoints(&base, "/age", "/gender", "/nationality")).unwrap();

    let err = client.nationality("Alice").await.unwrap_err();

    assert!(matches!(
        err,
        LookupError::Transport {
            service: LookupService::Nationality,
            ..
        }
    ));
}

#[tokio::test]
async fn test_enrich_end_to_end() {
    let base = start_mock().await;
    let client = LookupClient::new(endpoints(&base, "/age", "/gender", "/nationality")).unwrap();

    let enrichment = enrich(&client, "Alice").await.unwrap();

    assert_eq!(enrichment.age, Some(30));
    assert_eq!(enrichment.gender.as_deref(), Some("female"));
    assert_eq!(enrichment.country.as_deref(), Some("US"));
}

#[tokio::test]
async fn test_enrich_stops_on_failing_service() {
    let base = start_mock().await;
    let client = LookupClient::new(endpoints(&base, "/age", "/broken", "/nationality")).unwrap();

    let err = enrich(&client, "Alice").await.unwrap_err();

    assert_eq!(err.0.service(), Some(LookupService::Gender));
}
