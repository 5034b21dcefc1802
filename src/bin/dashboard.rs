//! Fetch one charity's donations and campaigns, aggregate them, and print
//! the dashboard summary as JSON.
//!
//! Usage: `CHARITY_ID=<uuid> API_TOKEN=<jwt> cargo run --bin dashboard`

use anyhow::Context;
use charityhub::dashboard::{ApiClient, DashboardConfig, DashboardState};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "charityhub=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DashboardConfig::from_env().context("Failed to load dashboard configuration")?;
    let client = ApiClient::from_config(&config).context("Failed to build API client")?;

    let mut state = DashboardState::new(config.charity_id);
    state.refresh(&client).await;

    // Server figures for comparison; a failure here is not fatal.
    let server_summary = match client.fetch_summary(config.charity_id).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::warn!(error = %e, "Server analytics unavailable");
            None
        }
    };
    if let Some(server) = &server_summary {
        if server.total_raised != state.summary().total_raised {
            tracing::warn!(
                local = %state.summary().total_raised,
                server = %server.total_raised,
                "Local and server totals differ"
            );
        }
    }

    let output = json!({
        "charity_id": state.charity_id(),
        "summary": state.summary(),
        "server_summary": server_summary,
        "notices": state.notices(),
        "last_updated": state.last_updated(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
