//! Donation service: intake, review, listing, and CSV export.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::donation::{CreateDonation, Donation, DonationStatus};
use crate::services::{campaign as campaign_service, charity as charity_service};

/// Check whether a donation status transition is allowed through review.
pub fn is_valid_transition(from: DonationStatus, to: DonationStatus) -> bool {
    matches!(
        (from, to),
        (DonationStatus::Pending, DonationStatus::Completed)
            | (DonationStatus::Pending, DonationStatus::Rejected)
    )
}

/// Record a new pending donation.
pub async fn create(
    pool: &PgPool,
    donor_id: Uuid,
    input: &CreateDonation,
) -> Result<Donation, AppError> {
    let charity = charity_service::find_by_id(pool, input.charity_id).await?;
    if charity.is_suspended {
        return Err(AppError::Conflict(
            "This charity is not accepting donations".to_string(),
        ));
    }

    if let Some(campaign_id) = input.campaign_id {
        let campaign = campaign_service::find_by_id(pool, campaign_id).await?;
        if campaign.charity_id != charity.id {
            return Err(AppError::Validation(
                "Campaign does not belong to this charity".to_string(),
            ));
        }
        if !campaign_service::accepts_donations(campaign.status) {
            return Err(AppError::Conflict(
                "Campaign is not accepting donations".to_string(),
            ));
        }
    }

    let donor = (!input.anonymous).then_some(donor_id);

    let donation = sqlx::query_as::<_, Donation>(
        r#"
        INSERT INTO donations (donor_id, charity_id, campaign_id, amount, message)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(donor)
    .bind(input.charity_id)
    .bind(input.campaign_id)
    .bind(input.amount)
    .bind(&input.message)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        donation_id = %donation.id,
        charity_id = %donation.charity_id,
        campaign_id = ?donation.campaign_id,
        "Donation recorded"
    );
    Ok(donation)
}

/// Find donation by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Donation, AppError> {
    sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))
}

/// All donations received by a charity, newest first.
pub async fn list_by_charity(pool: &PgPool, charity_id: Uuid) -> Result<Vec<Donation>, AppError> {
    let rows = sqlx::query_as::<_, Donation>(
        "SELECT * FROM donations WHERE charity_id = $1 ORDER BY created_at DESC",
    )
    .bind(charity_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Lock a donation row for the rest of the transaction.
pub(crate) async fn lock_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Donation, AppError> {
    sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))
}

/// Add `delta` (possibly negative) to a campaign's running total.
pub(crate) async fn adjust_campaign_total(
    tx: &mut Transaction<'_, Postgres>,
    campaign_id: Uuid,
    delta: Decimal,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE campaigns SET current_amount = GREATEST(current_amount + $1, 0), updated_at = NOW() WHERE id = $2",
    )
    .bind(delta)
    .bind(campaign_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Confirm or reject a pending donation. Confirmed campaign donations are
/// added to the campaign's `current_amount`.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    to: DonationStatus,
) -> Result<Donation, AppError> {
    let mut tx = pool.begin().await?;
    let existing = lock_for_update(&mut tx, id).await?;

    if !is_valid_transition(existing.status, to) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot move donation from {:?} to {:?}",
            existing.status, to
        )));
    }

    let donation = sqlx::query_as::<_, Donation>(
        "UPDATE donations SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(to)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if to == DonationStatus::Completed {
        if let Some(campaign_id) = donation.campaign_id {
            adjust_campaign_total(&mut tx, campaign_id, donation.amount).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(donation_id = %id, status = ?to, "Donation reviewed");
    Ok(donation)
}

/// Render donations as CSV for report downloads.
pub fn export_csv(donations: &[Donation]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "created_at",
            "donor_id",
            "campaign_id",
            "amount",
            "status",
        ])
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;

    for d in donations {
        let status = match d.status {
            DonationStatus::Pending => "pending",
            DonationStatus::Completed => "completed",
            DonationStatus::Rejected => "rejected",
        };
        writer
            .write_record([
                d.id.to_string(),
                d.created_at.to_rfc3339(),
                d.donor_id.map(|id| id.to_string()).unwrap_or_default(),
                d.campaign_id.map(|id| id.to_string()).unwrap_or_default(),
                d.amount.to_string(),
                status.to_string(),
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn pending_can_complete_or_reject() {
        assert!(is_valid_transition(DonationStatus::Pending, DonationStatus::Completed));
        assert!(is_valid_transition(DonationStatus::Pending, DonationStatus::Rejected));
    }

    #[test]
    fn reviewed_donations_are_final() {
        assert!(!is_valid_transition(DonationStatus::Completed, DonationStatus::Rejected));
        assert!(!is_valid_transition(DonationStatus::Rejected, DonationStatus::Completed));
        assert!(!is_valid_transition(DonationStatus::Completed, DonationStatus::Pending));
        assert!(!is_valid_transition(DonationStatus::Pending, DonationStatus::Pending));
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let created = Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap();
        let donations = vec![Donation {
            id: Uuid::from_u128(1),
            donor_id: None,
            charity_id: Uuid::from_u128(2),
            campaign_id: Some(Uuid::from_u128(3)),
            amount: dec!(75.50),
            message: Some("for the kids".to_string()),
            status: DonationStatus::Completed,
            created_at: created,
            updated_at: created,
        }];

        let csv = String::from_utf8(export_csv(&donations).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,created_at,donor_id,campaign_id,amount,status")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("00000000-0000-0000-0000-000000000001,2026-04-02T09:30:00+00:00,,"));
        assert!(row.ends_with(",75.50,completed"));
        assert!(lines.next().is_none());
    }
}
