//! Refund requests: donors ask, charity staff decide.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::donation::DonationStatus;
use crate::models::refund::{CreateRefundRequest, RefundRequest, RefundStatus, ReviewRefund};
use crate::services::donation as donation_service;

/// Check whether a refund status transition is allowed.
pub fn is_valid_transition(from: RefundStatus, to: RefundStatus) -> bool {
    matches!(
        (from, to),
        (RefundStatus::Pending, RefundStatus::Approved)
            | (RefundStatus::Pending, RefundStatus::Rejected)
    )
}

/// Open a refund request for one of the requester's own donations.
pub async fn request(
    pool: &PgPool,
    donation_id: Uuid,
    requester_id: Uuid,
    input: &CreateRefundRequest,
) -> Result<RefundRequest, AppError> {
    let donation = donation_service::find_by_id(pool, donation_id).await?;

    if donation.donor_id != Some(requester_id) {
        return Err(AppError::Forbidden(
            "Only the donor can request a refund".to_string(),
        ));
    }
    if donation.status == DonationStatus::Rejected {
        return Err(AppError::Conflict(
            "Donation was already rejected or refunded".to_string(),
        ));
    }

    let refund = sqlx::query_as::<_, RefundRequest>(
        r#"
        INSERT INTO refund_requests (donation_id, charity_id, requested_by, reason)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(donation.id)
    .bind(donation.charity_id)
    .bind(requester_id)
    .bind(&input.reason)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        AppError::conflict_on_unique(e, "A refund request for this donation is already pending")
    })?;

    tracing::info!(refund_id = %refund.id, donation_id = %donation.id, "Refund requested");
    Ok(refund)
}

/// Find refund request by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<RefundRequest, AppError> {
    sqlx::query_as::<_, RefundRequest>("SELECT * FROM refund_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Refund request not found".to_string()))
}

/// Refund requests against a charity, optionally filtered by status.
pub async fn list_by_charity(
    pool: &PgPool,
    charity_id: Uuid,
    status: Option<RefundStatus>,
) -> Result<Vec<RefundRequest>, AppError> {
    let rows = sqlx::query_as::<_, RefundRequest>(
        r#"
        SELECT * FROM refund_requests
        WHERE charity_id = $1 AND ($2::refund_status IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(charity_id)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Approve or reject a pending refund.
///
/// Approval marks the donation rejected, which drops it from every total,
/// and takes a completed campaign donation back out of `current_amount`.
pub async fn review(
    pool: &PgPool,
    id: Uuid,
    reviewer_id: Uuid,
    input: &ReviewRefund,
) -> Result<RefundRequest, AppError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, RefundRequest>(
        "SELECT * FROM refund_requests WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Refund request not found".to_string()))?;

    if !is_valid_transition(existing.status, input.status) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot move refund from {:?} to {:?}",
            existing.status, input.status
        )));
    }

    let refund = sqlx::query_as::<_, RefundRequest>(
        r#"
        UPDATE refund_requests SET
            status = $1, reviewed_by = $2, review_note = $3,
            reviewed_at = NOW(), updated_at = NOW()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(input.status)
    .bind(reviewer_id)
    .bind(&input.review_note)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    if input.status == RefundStatus::Approved {
        let donation = donation_service::lock_for_update(&mut tx, existing.donation_id).await?;
        if donation.status != DonationStatus::Rejected {
            sqlx::query(
                "UPDATE donations SET status = 'rejected', updated_at = NOW() WHERE id = $1",
            )
            .bind(donation.id)
            .execute(&mut *tx)
            .await?;
        }
        if donation.status == DonationStatus::Completed {
            if let Some(campaign_id) = donation.campaign_id {
                donation_service::adjust_campaign_total(&mut tx, campaign_id, -donation.amount)
                    .await?;
            }
        }
    }

    tx.commit().await?;

    tracing::info!(refund_id = %id, status = ?input.status, reviewer = %reviewer_id, "Refund reviewed");
    Ok(refund)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_refunds_can_be_decided() {
        assert!(is_valid_transition(RefundStatus::Pending, RefundStatus::Approved));
        assert!(is_valid_transition(RefundStatus::Pending, RefundStatus::Rejected));
    }

    #[test]
    fn decided_refunds_are_final() {
        assert!(!is_valid_transition(RefundStatus::Approved, RefundStatus::Rejected));
        assert!(!is_valid_transition(RefundStatus::Rejected, RefundStatus::Approved));
        assert!(!is_valid_transition(RefundStatus::Approved, RefundStatus::Pending));
        assert!(!is_valid_transition(RefundStatus::Pending, RefundStatus::Pending));
    }
}
