//! Charity analytics: loads snapshots and runs the aggregator.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::snapshot::{CampaignRecord, DonationRecord};
use crate::services::aggregation::{self, AnalyticsSummary};
use crate::services::{campaign as campaign_service, charity as charity_service};
use crate::services::donation as donation_service;

/// Aggregate a charity's donations and campaigns.
pub async fn charity_summary(pool: &PgPool, charity_id: Uuid) -> Result<AnalyticsSummary, AppError> {
    charity_service::find_by_id(pool, charity_id).await?;

    let (donations, campaigns) = tokio::try_join!(
        donation_service::list_by_charity(pool, charity_id),
        campaign_service::list_by_charity(pool, charity_id),
    )?;

    let donations: Vec<DonationRecord> = donations.into_iter().map(Into::into).collect();
    let campaigns: Vec<CampaignRecord> = campaigns.into_iter().map(Into::into).collect();

    let summary = aggregation::summarize(&donations, &campaigns);

    let drifted = summary
        .campaign_progress
        .iter()
        .filter(|p| p.current_amount != p.raised)
        .count();
    if drifted > 0 {
        tracing::debug!(
            charity_id = %charity_id,
            campaigns = drifted,
            "Stored campaign totals differ from verified donation sums"
        );
    }

    Ok(summary)
}
