use std::env;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Dashboard settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub charity_id: Uuid,
    pub timeout_secs: u64,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let charity_id =
            env::var("CHARITY_ID").map_err(|_| ConfigError::Missing("CHARITY_ID"))?;
        let charity_id = charity_id
            .trim()
            .parse::<Uuid>()
            .map_err(|_| ConfigError::Invalid {
                key: "CHARITY_ID",
                value: charity_id.clone(),
            })?;

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/v1".to_string()),
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            charity_id,
            timeout_secs: env::var("API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }
}
