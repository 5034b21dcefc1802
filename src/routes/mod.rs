//! Route definitions for the charityhub API.

pub mod analytics;
pub mod auth;
pub mod campaigns;
pub mod charities;
pub mod donations;
pub mod health;
pub mod refunds;
pub mod users;

use axum::{
    http::header::InvalidHeaderValue,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::middleware::{cors::cors_layer, sanitize, session, suspension};
use crate::AppState;

/// Assemble the full application router with its middleware stack.
///
/// Per-request order: trace, CORS, compression, body limit, sanitizer,
/// session tracking, suspension check, handler.
pub fn router(state: AppState) -> Result<Router, InvalidHeaderValue> {
    let api = Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/users", post(auth::create_user))
        .route("/charities", get(charities::list).post(charities::create))
        .route(
            "/charities/{id}",
            get(charities::get_by_id).put(charities::update),
        )
        .route("/charities/{id}/suspend", post(charities::suspend))
        .route("/charities/{id}/unsuspend", post(charities::unsuspend))
        .route(
            "/charities/{id}/campaigns",
            get(charities::list_campaigns).post(charities::create_campaign),
        )
        .route("/charities/{id}/donations", get(donations::list_for_charity))
        .route(
            "/charities/{id}/donations/export",
            get(donations::export_for_charity),
        )
        .route("/charities/{id}/refunds", get(refunds::list_for_charity))
        .route("/charities/{id}/analytics", get(analytics::charity_summary))
        .route(
            "/campaigns/{id}",
            get(campaigns::get_by_id).put(campaigns::update),
        )
        .route("/campaigns/{id}/status", patch(campaigns::update_status))
        .route("/donations", post(donations::create))
        .route("/donations/{id}/status", patch(donations::update_status))
        .route("/donations/{id}/refunds", post(donations::request_refund))
        .route("/refunds/{id}/review", patch(refunds::review))
        .route("/users/{id}/suspend", post(users::suspend))
        .route("/users/{id}/unsuspend", post(users::unsuspend))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            suspension::reject_suspended,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::track_session,
        ))
        .layer(middleware::from_fn(sanitize::sanitize_json_body));

    let cors = cors_layer(&state.config)?;
    let body_limit = state.config.request_body_limit_bytes;

    Ok(Router::new()
        .nest("/api/v1", api)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
