//! Donation/campaign aggregation for charity analytics.
//!
//! Pure function of its inputs: the same snapshots always produce the same
//! summary. Only completed donations attached to a campaign count toward
//! totals; `current_amount` on campaigns is carried through for comparison
//! but never used in the computation.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::donation::DonationStatus;
use crate::models::snapshot::{CampaignRecord, DonationRecord};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Summary statistics for one charity's donations and campaigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_raised: Decimal,
    pub verified_donations: u64,
    pub avg_donation: Decimal,
    /// Completed donations without a campaign; excluded from every total above.
    pub general_raised: Decimal,
    pub raised_by_campaign: BTreeMap<Uuid, Decimal>,
    /// Goal ratios (percent) for campaigns with a positive target, in campaign order.
    pub goal_ratios: Vec<Decimal>,
    pub avg_goal_achievement: Decimal,
    pub campaign_progress: Vec<CampaignProgress>,
    pub beneficiary_breakdown: Vec<CategoryCount>,
}

/// Per-campaign progress row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignProgress {
    pub campaign_id: Uuid,
    pub title: Option<String>,
    pub target_amount: Decimal,
    /// Backend-maintained figure, shown alongside `raised` to surface drift.
    pub current_amount: Decimal,
    pub raised: Decimal,
    /// `None` when the campaign has no positive target.
    pub goal_ratio: Option<Decimal>,
}

/// Number of campaigns tagged with a beneficiary category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

impl AnalyticsSummary {
    /// Summary of no data at all.
    pub fn empty() -> Self {
        summarize(&[], &[])
    }
}

/// Aggregate donations and campaigns (both scoped to one charity).
pub fn summarize(donations: &[DonationRecord], campaigns: &[CampaignRecord]) -> AnalyticsSummary {
    let mut total_raised = Decimal::ZERO;
    let mut verified_donations: u64 = 0;
    let mut general_raised = Decimal::ZERO;
    let mut raised_by_campaign: BTreeMap<Uuid, Decimal> = BTreeMap::new();

    for donation in donations {
        match donation.verified_campaign() {
            Some(campaign_id) => {
                total_raised = total_raised.saturating_add(donation.amount);
                verified_donations += 1;
                let raised = raised_by_campaign.entry(campaign_id).or_insert(Decimal::ZERO);
                *raised = raised.saturating_add(donation.amount);
            }
            None if donation.status == DonationStatus::Completed => {
                general_raised = general_raised.saturating_add(donation.amount);
            }
            None => {}
        }
    }

    let avg_donation = safe_div(total_raised, Decimal::from(verified_donations));

    let mut goal_ratios = Vec::new();
    let mut campaign_progress = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        let raised = raised_by_campaign
            .get(&campaign.id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let goal_ratio = goal_ratio(raised, campaign.target_amount);
        if let Some(ratio) = goal_ratio {
            goal_ratios.push(ratio);
        }
        campaign_progress.push(CampaignProgress {
            campaign_id: campaign.id,
            title: campaign.title.clone(),
            target_amount: campaign.target_amount,
            current_amount: campaign.current_amount,
            raised,
            goal_ratio,
        });
    }

    let ratio_sum = goal_ratios
        .iter()
        .fold(Decimal::ZERO, |sum, ratio| sum.saturating_add(*ratio));
    let avg_goal_achievement = safe_div(ratio_sum, Decimal::from(goal_ratios.len()));

    AnalyticsSummary {
        total_raised,
        verified_donations,
        avg_donation,
        general_raised,
        raised_by_campaign,
        goal_ratios,
        avg_goal_achievement,
        campaign_progress,
        beneficiary_breakdown: beneficiary_breakdown(campaigns),
    }
}

/// `raised / target * 100`, defined only for a positive target. Saturates at
/// `Decimal::MAX` when the ratio is too large to represent.
pub fn goal_ratio(raised: Decimal, target: Decimal) -> Option<Decimal> {
    if target <= Decimal::ZERO {
        return None;
    }
    let ratio = raised
        .checked_div(target)
        .and_then(|fraction| fraction.checked_mul(ONE_HUNDRED))
        .unwrap_or(Decimal::MAX);
    Some(ratio)
}

/// Count campaigns per category tag, most frequent first. Ties keep the
/// order in which the tag first appeared.
pub fn beneficiary_breakdown(campaigns: &[CampaignRecord]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tag in campaigns.iter().flat_map(|c| c.beneficiary_category.iter()) {
        match index.get(tag.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(tag.as_str(), counts.len());
                counts.push(CategoryCount {
                    category: tag.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}
