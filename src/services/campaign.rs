//! Campaign service: CRUD and the publish/close/archive lifecycle.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::campaign::{Campaign, CampaignStatus, CreateCampaign, UpdateCampaign};

/// Check whether a campaign status transition is allowed.
pub fn is_valid_transition(from: CampaignStatus, to: CampaignStatus) -> bool {
    matches!(
        (from, to),
        (CampaignStatus::Draft, CampaignStatus::Published)
            | (CampaignStatus::Draft, CampaignStatus::Archived)
            | (CampaignStatus::Published, CampaignStatus::Closed)
            | (CampaignStatus::Closed, CampaignStatus::Published)
            | (CampaignStatus::Closed, CampaignStatus::Archived)
    )
}

/// Whether a campaign in this status can receive donations.
pub fn accepts_donations(status: CampaignStatus) -> bool {
    status == CampaignStatus::Published
}

fn tags_json(tags: &Option<Vec<String>>) -> Option<serde_json::Value> {
    tags.as_ref().map(|list| {
        serde_json::Value::Array(
            list.iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(|t| serde_json::Value::String(t.to_string()))
                .collect(),
        )
    })
}

/// Create a draft campaign for a charity.
pub async fn create(
    pool: &PgPool,
    charity_id: Uuid,
    input: &CreateCampaign,
) -> Result<Campaign, AppError> {
    let categories = tags_json(&input.beneficiary_category).unwrap_or(serde_json::json!([]));

    let campaign = sqlx::query_as::<_, Campaign>(
        r#"
        INSERT INTO campaigns (charity_id, title, description, target_amount,
            beneficiary_category, start_date, end_date)
        VALUES ($1, $2, $3, COALESCE($4, 0), $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(charity_id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.target_amount)
    .bind(&categories)
    .bind(input.start_date)
    .bind(input.end_date)
    .fetch_one(pool)
    .await?;

    tracing::info!(campaign_id = %campaign.id, charity_id = %charity_id, "Campaign created");
    Ok(campaign)
}

/// Find campaign by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Campaign, AppError> {
    sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))
}

/// All campaigns of a charity, newest first.
pub async fn list_by_charity(pool: &PgPool, charity_id: Uuid) -> Result<Vec<Campaign>, AppError> {
    let rows = sqlx::query_as::<_, Campaign>(
        "SELECT * FROM campaigns WHERE charity_id = $1 ORDER BY created_at DESC",
    )
    .bind(charity_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Update campaign fields. Archived campaigns are read-only.
pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateCampaign) -> Result<Campaign, AppError> {
    let existing = find_by_id(pool, id).await?;
    if existing.status == CampaignStatus::Archived {
        return Err(AppError::Conflict("Archived campaigns cannot be edited".to_string()));
    }

    let start_date = input.start_date.or(existing.start_date);
    let end_date = input.end_date.or(existing.end_date);
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(AppError::Validation(
                "end_date must not precede start_date".to_string(),
            ));
        }
    }

    let campaign = sqlx::query_as::<_, Campaign>(
        r#"
        UPDATE campaigns SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            target_amount = COALESCE($3, target_amount),
            beneficiary_category = COALESCE($4, beneficiary_category),
            start_date = $5,
            end_date = $6,
            updated_at = NOW()
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.target_amount)
    .bind(tags_json(&input.beneficiary_category))
    .bind(start_date)
    .bind(end_date)
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(campaign)
}

/// Move a campaign to a new lifecycle status.
pub async fn transition(
    pool: &PgPool,
    id: Uuid,
    to: CampaignStatus,
) -> Result<Campaign, AppError> {
    let existing = find_by_id(pool, id).await?;

    if !is_valid_transition(existing.status, to) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot move campaign from {:?} to {:?}",
            existing.status, to
        )));
    }

    // Guard against a concurrent transition by matching the old status.
    let campaign = sqlx::query_as::<_, Campaign>(
        "UPDATE campaigns SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3 RETURNING *",
    )
    .bind(to)
    .bind(id)
    .bind(existing.status)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Campaign status changed concurrently".to_string()))?;

    tracing::info!(campaign_id = %id, from = ?existing.status, to = ?to, "Campaign status changed");
    Ok(campaign)
}
