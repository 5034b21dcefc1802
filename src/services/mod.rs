//! Business logic services.

pub mod aggregation;
pub mod analytics;
pub mod auth;
pub mod campaign;
pub mod charity;
pub mod donation;
pub mod refund;
pub mod session;
