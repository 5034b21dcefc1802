//! Dashboard view state.
//!
//! All mutation goes through [`DashboardState::apply`]. A failed fetch adds a
//! [`Notice`] and leaves the last loaded data for that resource on screen.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::client::ApiClient;
use crate::models::snapshot::{CampaignRecord, DonationRecord};
use crate::services::aggregation::{summarize, AnalyticsSummary};

const MAX_NOTICES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Donations,
    Campaigns,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Donations => f.write_str("donations"),
            Resource::Campaigns => f.write_str("campaigns"),
        }
    }
}

/// Non-fatal message shown to the user after a failed fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub resource: Resource,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    /// Switch to another charity; its data must be fetched afresh.
    CharitySelected(Uuid),
    RefreshStarted,
    DonationsLoaded(Vec<DonationRecord>),
    CampaignsLoaded(Vec<CampaignRecord>),
    FetchFailed { resource: Resource, message: String },
    NoticesDismissed,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    charity_id: Uuid,
    donations: Option<Vec<DonationRecord>>,
    campaigns: Option<Vec<CampaignRecord>>,
    summary: AnalyticsSummary,
    notices: Vec<Notice>,
    pending: u8,
    last_updated: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn new(charity_id: Uuid) -> Self {
        Self {
            charity_id,
            donations: None,
            campaigns: None,
            summary: AnalyticsSummary::empty(),
            notices: Vec::new(),
            pending: 0,
            last_updated: None,
        }
    }

    pub fn charity_id(&self) -> Uuid {
        self.charity_id
    }

    pub fn summary(&self) -> &AnalyticsSummary {
        &self.summary
    }

    pub fn donations(&self) -> &[DonationRecord] {
        self.donations.as_deref().unwrap_or_default()
    }

    pub fn campaigns(&self) -> &[CampaignRecord] {
        self.campaigns.as_deref().unwrap_or_default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Apply one event to the state.
    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::CharitySelected(charity_id) => {
                if charity_id != self.charity_id {
                    *self = Self::new(charity_id);
                }
            }
            DashboardEvent::RefreshStarted => self.pending = 2,
            DashboardEvent::DonationsLoaded(donations) => {
                self.donations = Some(donations);
                self.finish_one(true);
            }
            DashboardEvent::CampaignsLoaded(campaigns) => {
                self.campaigns = Some(campaigns);
                self.finish_one(true);
            }
            DashboardEvent::FetchFailed { resource, message } => {
                if self.notices.len() >= MAX_NOTICES {
                    self.notices.remove(0);
                }
                self.notices.push(Notice {
                    resource,
                    message,
                    at: Utc::now(),
                });
                self.finish_one(false);
            }
            DashboardEvent::NoticesDismissed => self.notices.clear(),
        }
    }

    fn finish_one(&mut self, changed: bool) {
        self.pending = self.pending.saturating_sub(1);
        if changed {
            self.summary = summarize(self.donations(), self.campaigns());
            self.last_updated = Some(Utc::now());
        }
    }

    /// Fetch donations and campaigns concurrently and fold the results in.
    pub async fn refresh(&mut self, client: &ApiClient) {
        self.apply(DashboardEvent::RefreshStarted);
        let charity_id = self.charity_id;

        let (donations, campaigns) = tokio::join!(
            client.fetch_donations(charity_id),
            client.fetch_campaigns(charity_id)
        );

        let donations_event = match donations {
            Ok(records) => DashboardEvent::DonationsLoaded(records),
            Err(e) => failed(Resource::Donations, charity_id, &e),
        };
        let campaigns_event = match campaigns {
            Ok(records) => DashboardEvent::CampaignsLoaded(records),
            Err(e) => failed(Resource::Campaigns, charity_id, &e),
        };

        self.apply(donations_event);
        self.apply(campaigns_event);
    }
}

fn failed(resource: Resource, charity_id: Uuid, err: &super::ClientError) -> DashboardEvent {
    tracing::warn!(%charity_id, %resource, error = %err, "Dashboard fetch failed");
    DashboardEvent::FetchFailed {
        resource,
        message: format!("Could not load {resource}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::donation::DonationStatus;
    use rust_decimal_macros::dec;

    fn charity() -> Uuid {
        Uuid::from_u128(100)
    }

    fn donation(id: u128, campaign: u128, amount: rust_decimal::Decimal) -> DonationRecord {
        DonationRecord {
            id: Uuid::from_u128(id),
            donor_id: None,
            campaign_id: Some(Uuid::from_u128(campaign)),
            amount,
            status: DonationStatus::Completed,
            created_at: None,
        }
    }

    fn campaign(id: u128, target: rust_decimal::Decimal) -> CampaignRecord {
        CampaignRecord {
            id: Uuid::from_u128(id),
            title: None,
            target_amount: target,
            current_amount: dec!(0),
            beneficiary_category: vec!["education".to_string()],
            status: None,
        }
    }

    fn loaded_state() -> DashboardState {
        let mut state = DashboardState::new(charity());
        state.apply(DashboardEvent::RefreshStarted);
        state.apply(DashboardEvent::DonationsLoaded(vec![donation(1, 1, dec!(500))]));
        state.apply(DashboardEvent::CampaignsLoaded(vec![campaign(1, dec!(1000))]));
        state
    }

    #[test]
    fn new_state_is_all_zero() {
        let state = DashboardState::new(charity());
        assert_eq!(state.summary(), &AnalyticsSummary::empty());
        assert!(!state.is_loading());
        assert!(state.last_updated().is_none());
    }

    #[test]
    fn loads_recompute_summary() {
        let state = loaded_state();
        assert!(!state.is_loading());
        assert_eq!(state.summary().total_raised, dec!(500));
        assert_eq!(state.summary().avg_goal_achievement, dec!(50));
        assert!(state.last_updated().is_some());
    }

    #[test]
    fn failure_keeps_stale_values_and_adds_notice() {
        let mut state = loaded_state();
        let before = state.summary().clone();

        state.apply(DashboardEvent::RefreshStarted);
        assert!(state.is_loading());
        state.apply(DashboardEvent::FetchFailed {
            resource: Resource::Donations,
            message: "Could not load donations: timeout".to_string(),
        });
        state.apply(DashboardEvent::FetchFailed {
            resource: Resource::Campaigns,
            message: "Could not load campaigns: timeout".to_string(),
        });

        assert!(!state.is_loading());
        assert_eq!(state.summary(), &before);
        assert_eq!(state.donations().len(), 1);
        assert_eq!(state.notices().len(), 2);
        assert_eq!(state.notices()[0].resource, Resource::Donations);
    }

    #[test]
    fn partial_failure_uses_fresh_half() {
        let mut state = loaded_state();
        state.apply(DashboardEvent::RefreshStarted);
        state.apply(DashboardEvent::DonationsLoaded(vec![
            donation(1, 1, dec!(500)),
            donation(2, 1, dec!(250)),
        ]));
        state.apply(DashboardEvent::FetchFailed {
            resource: Resource::Campaigns,
            message: "Could not load campaigns: 502".to_string(),
        });

        assert_eq!(state.summary().total_raised, dec!(750));
        assert_eq!(state.summary().avg_goal_achievement, dec!(75));
        assert_eq!(state.campaigns().len(), 1);
    }

    #[test]
    fn selecting_another_charity_resets() {
        let mut state = loaded_state();
        state.apply(DashboardEvent::CharitySelected(charity()));
        assert_eq!(state.summary().total_raised, dec!(500));

        state.apply(DashboardEvent::CharitySelected(Uuid::from_u128(7)));
        assert_eq!(state.charity_id(), Uuid::from_u128(7));
        assert!(state.donations().is_empty());
        assert_eq!(state.summary(), &AnalyticsSummary::empty());
    }

    #[test]
    fn notices_are_capped_and_dismissable() {
        let mut state = DashboardState::new(charity());
        for i in 0..(MAX_NOTICES + 5) {
            state.apply(DashboardEvent::FetchFailed {
                resource: Resource::Campaigns,
                message: format!("failure {i}"),
            });
        }
        assert_eq!(state.notices().len(), MAX_NOTICES);
        assert_eq!(state.notices()[0].message, "failure 5");

        state.apply(DashboardEvent::NoticesDismissed);
        assert!(state.notices().is_empty());
    }
}
