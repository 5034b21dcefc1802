//! Dashboard client against an in-process stub of the charityhub API.
//!
//! The stub serves the two list shapes the client must accept (a bare array
//! and a `data` envelope) with loosely-typed fields, and can be switched to
//! fail so stale-value handling can be observed.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use charityhub::dashboard::{ApiClient, ClientError, DashboardState, Resource};
use rust_decimal_macros::dec;
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

const TOKEN: &str = "stub-token";

#[derive(Clone, Default)]
struct Stub {
    failing: Arc<AtomicBool>,
}

fn campaign_id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TOKEN}"))
        .unwrap_or(false)
}

async fn donations(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(_charity): Path<Uuid>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "data": null, "error": { "code": "UNAUTHORIZED", "message": "Authentication required" } })),
        );
    }
    if stub.failing.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "data": null, "error": { "code": "INTERNAL_ERROR", "message": "upstream down" } })),
        );
    }
    // Bare array with mixed amount encodings.
    (
        StatusCode::OK,
        Json(json!([
            { "id": Uuid::from_u128(1), "campaign_id": campaign_id(10), "amount": "500.00", "status": "completed" },
            { "id": Uuid::from_u128(2), "campaign_id": campaign_id(20), "amount": 300, "status": "COMPLETED" },
            { "id": Uuid::from_u128(3), "campaign_id": campaign_id(10), "amount": "abc", "status": "completed" },
            { "id": Uuid::from_u128(4), "campaign_id": campaign_id(10), "amount": 900, "status": "pending" },
            { "id": Uuid::from_u128(5), "campaign_id": null, "amount": 50, "status": "completed" },
            { "amount": 1000, "status": "completed" }
        ])),
    )
}

async fn campaigns(State(stub): State<Stub>, Path(_charity): Path<Uuid>) -> impl IntoResponse {
    if stub.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!("boom")));
    }
    (
        StatusCode::OK,
        Json(json!({
            "data": [
                { "id": campaign_id(10), "title": "Wells", "target_amount": "1000", "current_amount": 500,
                  "beneficiary_category": "[\"water\",\"health\"]", "status": "published" },
                { "id": campaign_id(20), "title": "Books", "target_amount": 0,
                  "beneficiary_category": ["education", "water"], "status": "published" },
                { "id": campaign_id(30), "title": "Kennels", "target_amount": null,
                  "beneficiary_category": null }
            ],
            "error": null
        })),
    )
}

async fn analytics(Path(_charity): Path<Uuid>) -> impl IntoResponse {
    Json(json!({ "data": { "not": "a summary" }, "error": null }))
}

async fn start_stub() -> (String, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/api/v1/charities/{id}/donations", get(donations))
        .route("/api/v1/charities/{id}/campaigns", get(campaigns))
        .route("/api/v1/charities/{id}/analytics", get(analytics))
        .with_state(stub.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{addr}/api/v1/"), stub)
}

fn client(base: &str, token: Option<&str>) -> ApiClient {
    ApiClient::new(base, token.map(str::to_string), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetches_both_list_shapes_leniently() {
    let (base, _stub) = start_stub().await;
    let api = client(&base, Some(TOKEN));
    let charity = Uuid::from_u128(99);

    let donations = api.fetch_donations(charity).await.unwrap();
    assert_eq!(donations.len(), 5, "record without id is skipped");
    assert_eq!(donations[0].amount, dec!(500));
    assert_eq!(donations[2].amount, dec!(0));

    let campaigns = api.fetch_campaigns(charity).await.unwrap();
    assert_eq!(campaigns.len(), 3);
    assert_eq!(campaigns[0].beneficiary_category, vec!["water", "health"]);
    assert_eq!(campaigns[0].target_amount, dec!(1000));
    assert!(campaigns[2].beneficiary_category.is_empty());
}

#[tokio::test]
async fn refresh_aggregates_fetched_data() {
    let (base, _stub) = start_stub().await;
    let api = client(&base, Some(TOKEN));
    let mut state = DashboardState::new(Uuid::from_u128(99));

    state.refresh(&api).await;

    let summary = state.summary();
    assert!(state.notices().is_empty());
    assert!(!state.is_loading());
    // 500 + 300 + 0 (malformed); pending and campaign-less gifts excluded.
    assert_eq!(summary.total_raised, dec!(800));
    assert_eq!(summary.verified_donations, 3);
    assert_eq!(summary.general_raised, dec!(50));
    assert_eq!(summary.goal_ratios, vec![dec!(50)]);
    assert_eq!(summary.avg_goal_achievement, dec!(50));
    assert_eq!(summary.beneficiary_breakdown[0].category, "water");
    assert_eq!(summary.beneficiary_breakdown[0].count, 2);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_values() {
    let (base, stub) = start_stub().await;
    let api = client(&base, Some(TOKEN));
    let mut state = DashboardState::new(Uuid::from_u128(99));

    state.refresh(&api).await;
    let before = state.summary().clone();

    stub.failing.store(true, Ordering::SeqCst);
    state.refresh(&api).await;

    assert_eq!(state.summary(), &before);
    assert_eq!(state.notices().len(), 2);
    assert_eq!(state.notices()[0].resource, Resource::Donations);
    assert!(state.notices()[0].message.contains("upstream down"));
    assert_eq!(state.notices()[1].resource, Resource::Campaigns);
}

#[tokio::test]
async fn status_errors_carry_envelope_message() {
    let (base, _stub) = start_stub().await;
    let api = client(&base, None);

    match api.fetch_donations(Uuid::from_u128(99)).await {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Authentication required");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_summary_is_a_parse_error() {
    let (base, _stub) = start_stub().await;
    let api = client(&base, Some(TOKEN));

    assert!(matches!(
        api.fetch_summary(Uuid::from_u128(99)).await,
        Err(ClientError::Parse(_))
    ));
}

#[tokio::test]
async fn unreachable_server_is_an_http_error() {
    let api = client("http://127.0.0.1:9", Some(TOKEN));
    assert!(matches!(
        api.fetch_campaigns(Uuid::from_u128(1)).await,
        Err(ClientError::Http(_))
    ));
}
