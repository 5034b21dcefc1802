//! Read-only donation and campaign snapshots consumed by the aggregator.
//!
//! These are decoded leniently from API payloads (see [`super::amount`])
//! and can also be built from database rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::amount::{deserialize_amount, deserialize_tags, to_tags};
use super::campaign::{Campaign, CampaignStatus};
use super::donation::{Donation, DonationStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: Uuid,
    #[serde(default)]
    pub donor_id: Option<Uuid>,
    #[serde(default)]
    pub campaign_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "deserialize_donation_status")]
    pub status: DonationStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DonationRecord {
    /// Campaign credited by this donation, if it is completed and attached
    /// to one. Completed general gifts return `None`.
    pub fn verified_campaign(&self) -> Option<Uuid> {
        self.campaign_id
            .filter(|_| self.status == DonationStatus::Completed)
    }
}

impl From<Donation> for DonationRecord {
    fn from(d: Donation) -> Self {
        Self {
            id: d.id,
            donor_id: d.donor_id,
            campaign_id: d.campaign_id,
            amount: d.amount,
            status: d.status,
            created_at: Some(d.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub target_amount: Decimal,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub current_amount: Decimal,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub beneficiary_category: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_campaign_status")]
    pub status: Option<CampaignStatus>,
}

impl From<Campaign> for CampaignRecord {
    fn from(c: Campaign) -> Self {
        Self {
            id: c.id,
            title: Some(c.title),
            target_amount: c.target_amount,
            current_amount: c.current_amount,
            beneficiary_category: to_tags(&c.beneficiary_category),
            status: Some(c.status),
        }
    }
}

fn deserialize_donation_status<'de, D>(deserializer: D) -> Result<DonationStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(DonationStatus::from_loose)
        .unwrap_or_default())
}

fn deserialize_campaign_status<'de, D>(
    deserializer: D,
) -> Result<Option<CampaignStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| serde_json::from_value(Value::String(s.trim().to_ascii_lowercase())).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn donation_record_from_string_amount() {
        let record: DonationRecord = serde_json::from_value(json!({
            "id": Uuid::from_u128(1),
            "donor_id": null,
            "campaign_id": Uuid::from_u128(9),
            "amount": "120.50",
            "status": "completed",
            "created_at": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.amount, dec!(120.50));
        assert_eq!(record.verified_campaign(), Some(Uuid::from_u128(9)));
    }

    #[test]
    fn donation_record_tolerates_missing_and_odd_fields() {
        let record: DonationRecord = serde_json::from_value(json!({
            "id": Uuid::from_u128(2),
            "amount": {"currency": "USD"},
            "status": 3
        }))
        .unwrap();
        assert_eq!(record.amount, Decimal::ZERO);
        assert_eq!(record.status, DonationStatus::Pending);
        assert!(record.campaign_id.is_none());
        assert_eq!(record.verified_campaign(), None);
    }

    #[test]
    fn general_donation_is_not_campaign_verified() {
        let record: DonationRecord = serde_json::from_value(json!({
            "id": Uuid::from_u128(3),
            "campaign_id": null,
            "amount": 50,
            "status": "completed"
        }))
        .unwrap();
        assert_eq!(record.verified_campaign(), None);
    }

    #[test]
    fn campaign_record_with_encoded_categories() {
        let record: CampaignRecord = serde_json::from_value(json!({
            "id": Uuid::from_u128(4),
            "title": "Winter Meals",
            "target_amount": "2000.00",
            "current_amount": null,
            "beneficiary_category": "[\"Elderly\",\"Homeless\"]",
            "status": "Published"
        }))
        .unwrap();
        assert_eq!(record.target_amount, dec!(2000));
        assert_eq!(record.current_amount, Decimal::ZERO);
        assert_eq!(record.beneficiary_category, vec!["Elderly", "Homeless"]);
        assert_eq!(record.status, Some(CampaignStatus::Published));
    }

    #[test]
    fn campaign_record_unknown_status_is_none() {
        let record: CampaignRecord = serde_json::from_value(json!({
            "id": Uuid::from_u128(5),
            "status": "paused"
        }))
        .unwrap();
        assert!(record.status.is_none());
        assert!(record.beneficiary_category.is_empty());
    }
}
