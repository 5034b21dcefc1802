//! Donation model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "donation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    #[default]
    Pending,
    Completed,
    Rejected,
}

impl DonationStatus {
    /// Lenient parse used for upstream payloads; unknown values count as pending.
    pub fn from_loose(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" => Self::Completed,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Donation {
    pub id: Uuid,
    /// `None` for anonymous donations.
    pub donor_id: Option<Uuid>,
    pub charity_id: Uuid,
    /// `None` for general donations to the charity as a whole.
    pub campaign_id: Option<Uuid>,
    pub amount: Decimal,
    pub message: Option<String>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDonation {
    pub charity_id: Uuid,
    pub campaign_id: Option<Uuid>,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

/// Body of PATCH /donations/{id}/status.
#[derive(Debug, Clone, Deserialize)]
pub struct DonationStatusChange {
    pub status: DonationStatus,
}

fn validate_positive(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}
