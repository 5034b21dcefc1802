//! Database models and DTOs for all domain entities.

pub mod amount;
pub mod campaign;
pub mod charity;
pub mod donation;
pub mod pagination;
pub mod refund;
pub mod session;
pub mod snapshot;
pub mod user;
