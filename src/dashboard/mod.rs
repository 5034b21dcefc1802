//! Charity-admin dashboard: API client, configuration, and view state.
//!
//! The dashboard pulls a charity's donations and campaigns from the API,
//! aggregates them locally with [`crate::services::aggregation::summarize`],
//! and keeps the last good figures on screen when a fetch fails.

pub mod client;
pub mod config;
pub mod state;

pub use client::{ApiClient, ClientError};
pub use config::DashboardConfig;
pub use state::{DashboardEvent, DashboardState, Notice, Resource};
