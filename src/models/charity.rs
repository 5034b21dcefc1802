//! Charity profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Charity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub website: Option<String>,
    pub is_verified: bool,
    pub is_suspended: bool,
    pub suspension_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCharity {
    #[validate(length(min = 2, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateCharity {
    #[validate(length(min = 2, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    /// Only honoured for platform admins.
    pub is_verified: Option<bool>,
}

/// Summary DTO for list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CharitySummary {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub is_verified: bool,
    pub is_suspended: bool,
}
