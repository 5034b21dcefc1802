//! Refund routes: charity-side listing and review.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireCharityStaff;
use crate::models::refund::{RefundRequest, RefundStatus, ReviewRefund};
use crate::services::charity as charity_service;
use crate::services::refund as refund_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RefundFilters {
    pub status: Option<RefundStatus>,
}

/// GET /api/v1/charities/{id}/refunds: refunds against the charity, `?status=` optional.
pub async fn list_for_charity(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
    Query(filters): Query<RefundFilters>,
) -> Result<Json<ApiResponse<Vec<RefundRequest>>>, AppError> {
    user.ensure_can_manage(id)?;
    charity_service::find_by_id(&state.db, id).await?;
    let refunds = refund_service::list_by_charity(&state.db, id, filters.status).await?;
    Ok(ApiResponse::success(refunds))
}

/// PATCH /api/v1/refunds/{id}/review: approve or reject a pending refund.
pub async fn review(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewRefund>,
) -> Result<Json<ApiResponse<RefundRequest>>, AppError> {
    body.validate()?;
    let existing = refund_service::find_by_id(&state.db, id).await?;
    user.ensure_can_manage(existing.charity_id)?;
    let refund = refund_service::review(&state.db, id, user.id, &body).await?;
    Ok(ApiResponse::success(refund))
}
