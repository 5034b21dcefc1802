//! Fundraising campaign model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "campaign_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Published,
    Closed,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub charity_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Zero means the campaign has no fundraising goal.
    pub target_amount: Decimal,
    /// Maintained by donation status changes; not authoritative for analytics.
    pub current_amount: Decimal,
    pub beneficiary_category: serde_json::Value,
    pub status: CampaignStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateCampaign {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_non_negative"))]
    pub target_amount: Option<Decimal>,
    #[validate(length(max = 20, message = "at most 20 beneficiary categories"))]
    pub beneficiary_category: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
#[validate(schema(function = "validate_update_dates"))]
pub struct UpdateCampaign {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_non_negative"))]
    pub target_amount: Option<Decimal>,
    #[validate(length(max = 20, message = "at most 20 beneficiary categories"))]
    pub beneficiary_category: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Body of PATCH /campaigns/{id}/status.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignStatusChange {
    pub status: CampaignStatus,
}

pub(crate) fn validate_non_negative(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

fn check_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            let mut err = ValidationError::new("date_order");
            err.message = Some("end_date must not precede start_date".into());
            return Err(err);
        }
    }
    Ok(())
}

fn validate_create_dates(input: &CreateCampaign) -> Result<(), ValidationError> {
    check_date_order(input.start_date, input.end_date)
}

fn validate_update_dates(input: &UpdateCampaign) -> Result<(), ValidationError> {
    check_date_order(input.start_date, input.end_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create(target: Option<Decimal>) -> CreateCampaign {
        CreateCampaign {
            title: "School Supplies Drive".to_string(),
            description: None,
            target_amount: target,
            beneficiary_category: Some(vec!["Education".to_string()]),
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn status_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&CampaignStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
        let parsed: CampaignStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(parsed, CampaignStatus::Archived);
    }

    #[test]
    fn negative_target_rejected() {
        assert!(create(Some(dec!(-1))).validate().is_err());
        assert!(create(Some(dec!(0))).validate().is_ok());
        assert!(create(None).validate().is_ok());
    }

    #[test]
    fn end_before_start_rejected() {
        let mut input = create(Some(dec!(100)));
        input.start_date = NaiveDate::from_ymd_opt(2026, 5, 10);
        input.end_date = NaiveDate::from_ymd_opt(2026, 5, 1);
        assert!(input.validate().is_err());

        input.end_date = NaiveDate::from_ymd_opt(2026, 6, 1);
        assert!(input.validate().is_ok());
    }
}
