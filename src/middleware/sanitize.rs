//! Input sanitization for JSON request bodies.
//!
//! Every string value is stripped of markup and control characters and
//! trimmed. Secret fields are left byte-for-byte intact.

use std::sync::OnceLock;

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use regex::Regex;
use serde_json::Value;

use crate::errors::AppError;

/// Upper bound on buffered bodies; the router's body-limit layer is normally tighter.
const MAX_SANITIZED_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Keys whose values are never rewritten.
const PRESERVED_KEYS: &[&str] = &[
    "password",
    "current_password",
    "new_password",
    "refresh_token",
];

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<[A-Za-z/!][^>]*>")
            .expect("markup pattern is valid")
    })
}

/// Strip markup and control characters, then trim.
pub fn sanitize_str(raw: &str) -> String {
    let without_markup = markup_pattern().replace_all(raw, "");
    without_markup
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitize every string in a JSON document, skipping preserved keys.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::String(s) => *s = sanitize_str(s),
        Value::Array(items) => items.iter_mut().for_each(sanitize_value),
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if !PRESERVED_KEYS.contains(&key.as_str()) {
                    sanitize_value(inner);
                }
            }
        }
        _ => {}
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

/// Rewrite JSON request bodies through [`sanitize_value`]. Bodies that are
/// not valid JSON pass through untouched for the handler to reject.
pub async fn sanitize_json_body(request: Request, next: Next) -> Result<Response, AppError> {
    if !is_json(request.headers()) {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_SANITIZED_BODY_BYTES)
        .await
        .map_err(|e| AppError::Validation(format!("Unreadable request body: {e}")))?;

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            sanitize_value(&mut value);
            let cleaned = serde_json::to_vec(&value)
                .map_err(|e| AppError::Internal(format!("Re-encoding body failed: {e}")))?;
            parts
                .headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from(cleaned.len()));
            Body::from(cleaned)
        }
        Err(_) => Body::from(bytes),
    };

    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::post, Json, Router};
    use serde_json::json;
    use tower::ServiceExt;

    #[test]
    fn strips_tags_and_scripts() {
        assert_eq!(sanitize_str("  <b>Food</b> bank "), "Food bank");
        assert_eq!(
            sanitize_str("Hello<script>alert('x')</script> world"),
            "Hello world"
        );
        assert_eq!(sanitize_str("<style>p{}</style>Clean"), "Clean");
    }

    #[test]
    fn literal_angle_brackets_in_text_survive() {
        assert_eq!(sanitize_str("ages 5 < x > 3"), "ages 5 < x > 3");
        assert_eq!(sanitize_str("a <= b and c >= d"), "a <= b and c >= d");
        assert_eq!(sanitize_str("<!-- note -->Hi </em>there"), "Hi there");
    }

    #[test]
    fn keeps_newlines_drops_other_controls() {
        assert_eq!(sanitize_str("line1\nline2\u{0007}"), "line1\nline2");
    }

    #[test]
    fn sanitizes_nested_values_but_not_passwords() {
        let mut value = json!({
            "title": " <i>Winter</i> Meals ",
            "beneficiary_category": ["<b>Elderly</b>", " Homeless "],
            "password": " <keep>me ",
            "amount": 25,
            "meta": {"note": "<p>hi</p>"}
        });
        sanitize_value(&mut value);
        assert_eq!(
            value,
            json!({
                "title": "Winter Meals",
                "beneficiary_category": ["Elderly", "Homeless"],
                "password": " <keep>me ",
                "amount": 25,
                "meta": {"note": "hi"}
            })
        );
    }

    async fn echo(Json(body): Json<Value>) -> Json<Value> {
        Json(body)
    }

    fn app() -> Router {
        Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(sanitize_json_body))
    }

    #[tokio::test]
    async fn middleware_rewrites_json_bodies() {
        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"<h1>Clean water</h1>"}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"title": "Clean water"}));
    }

    #[tokio::test]
    async fn invalid_json_passes_through_to_handler() {
        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
