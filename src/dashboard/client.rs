//! HTTP client for the charityhub API as seen by the dashboard.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::config::DashboardConfig;
use crate::models::snapshot::{CampaignRecord, DonationRecord};
use crate::services::aggregation::AnalyticsSummary;

/// Errors raised while talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure, timeout, or undecodable body
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("API returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Response body had an unexpected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Accept either a bare JSON array or an object wrapping one in `data`.
pub fn normalize_list(value: Value) -> Result<Vec<Value>, ClientError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(ClientError::Parse(format!(
                "`data` is not a list (found {})",
                json_kind(&other)
            ))),
            None => Err(ClientError::Parse(
                "object response has no `data` list".to_string(),
            )),
        },
        other => Err(ClientError::Parse(format!(
            "expected a list, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Decode each list item, dropping ones that cannot be read at all.
fn decode_records<T: DeserializeOwned>(items: Vec<Value>, kind: &str) -> Vec<T> {
    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind, error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect();
    if records.len() < total {
        tracing::debug!(kind, kept = records.len(), total, "Decoded records");
    }
    records
}

/// Message from an error envelope, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// API client for fetching one charity's dashboard data.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.api_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status,
                message: error_message(&body),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// All donations for a charity.
    pub async fn fetch_donations(
        &self,
        charity_id: Uuid,
    ) -> Result<Vec<DonationRecord>, ClientError> {
        let value = self
            .get_json(&format!("/charities/{charity_id}/donations"))
            .await?;
        Ok(decode_records(normalize_list(value)?, "donation"))
    }

    /// All campaigns for a charity.
    pub async fn fetch_campaigns(
        &self,
        charity_id: Uuid,
    ) -> Result<Vec<CampaignRecord>, ClientError> {
        let value = self
            .get_json(&format!("/charities/{charity_id}/campaigns"))
            .await?;
        Ok(decode_records(normalize_list(value)?, "campaign"))
    }

    /// Server-computed analytics for a charity.
    pub async fn fetch_summary(&self, charity_id: Uuid) -> Result<AnalyticsSummary, ClientError> {
        let mut value = self
            .get_json(&format!("/charities/{charity_id}/analytics"))
            .await?;
        let payload = match value.get_mut("data") {
            Some(data) => data.take(),
            None => value,
        };
        serde_json::from_value(payload)
            .map_err(|e| ClientError::Parse(format!("analytics summary: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_accepts_bare_array() {
        let items = normalize_list(json!([{ "id": 1 }, { "id": 2 }])).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn normalize_accepts_data_envelope() {
        let items = normalize_list(json!({ "data": [{ "id": 1 }], "error": null })).unwrap();
        assert_eq!(items, vec![json!({ "id": 1 })]);
    }

    #[test]
    fn normalize_rejects_other_shapes() {
        assert!(matches!(
            normalize_list(json!({ "data": { "id": 1 } })),
            Err(ClientError::Parse(_))
        ));
        assert!(matches!(
            normalize_list(json!({ "items": [] })),
            Err(ClientError::Parse(_))
        ));
        assert!(matches!(normalize_list(json!("nope")), Err(ClientError::Parse(_))));
        assert!(matches!(normalize_list(Value::Null), Err(ClientError::Parse(_))));
    }

    #[test]
    fn decode_skips_records_without_id() {
        let items = vec![
            json!({ "id": Uuid::from_u128(1), "amount": "12.50", "status": "completed" }),
            json!({ "amount": 5 }),
        ];
        let records: Vec<DonationRecord> = decode_records(items, "donation");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Uuid::from_u128(1));
    }

    #[test]
    fn error_message_reads_envelope() {
        let body = r#"{"data":null,"error":{"code":"FORBIDDEN","message":"You do not manage this charity"}}"#;
        assert_eq!(error_message(body), "You do not manage this charity");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = ApiClient::new("http://localhost:8000/api/v1/", None, Duration::from_secs(1))
            .unwrap();
        assert_eq!(client.base_url, "http://localhost:8000/api/v1");
    }
}
