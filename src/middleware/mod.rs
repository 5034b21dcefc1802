//! Request extractors and HTTP middleware.

pub mod auth;
pub mod cors;
pub mod rbac;
pub mod sanitize;
pub mod session;
pub mod suspension;
