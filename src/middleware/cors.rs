//! CORS policy for the dashboard frontend.

use std::time::Duration;

use axum::http::{
    header::{self, HeaderName, InvalidHeaderValue},
    HeaderValue, Method,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AppConfig;

/// Build the CORS layer from the configured frontend origins.
pub fn cors_layer(config: &AppConfig) -> Result<CorsLayer, InvalidHeaderValue> {
    let origins = config
        .allowed_origins()
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    fn config(frontend_url: &str) -> AppConfig {
        AppConfig {
            database_url: String::new(),
            database_max_connections: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "s".to_string(),
            jwt_access_token_expiry_secs: 60,
            jwt_refresh_token_expiry_secs: 60,
            frontend_url: frontend_url.to_string(),
            request_body_limit_bytes: 1024,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }

    fn app() -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(cors_layer(&config("http://localhost:5173,https://admin.example.org")).unwrap())
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/ping")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn allowed_origin_is_echoed() {
        let response = app().oneshot(preflight("https://admin.example.org")).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://admin.example.org"
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn unknown_origin_gets_no_allow_header() {
        let response = app().oneshot(preflight("https://evil.example.com")).await.unwrap();
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn invalid_origin_is_an_error() {
        assert!(cors_layer(&config("http://bad\norigin")).is_err());
    }
}
