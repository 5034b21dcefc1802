//! Campaign routes: detail, update, and lifecycle transitions.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireCharityStaff;
use crate::models::campaign::{Campaign, CampaignStatusChange, UpdateCampaign};
use crate::services::campaign as campaign_service;
use crate::AppState;

/// GET /api/v1/campaigns/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Campaign>>, AppError> {
    let campaign = campaign_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(campaign))
}

/// PUT /api/v1/campaigns/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCampaign>,
) -> Result<Json<ApiResponse<Campaign>>, AppError> {
    body.validate()?;
    let existing = campaign_service::find_by_id(&state.db, id).await?;
    user.ensure_can_manage(existing.charity_id)?;
    let campaign = campaign_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(campaign))
}

/// PATCH /api/v1/campaigns/{id}/status: publish, close, reopen, or archive.
pub async fn update_status(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
    Json(body): Json<CampaignStatusChange>,
) -> Result<Json<ApiResponse<Campaign>>, AppError> {
    let existing = campaign_service::find_by_id(&state.db, id).await?;
    user.ensure_can_manage(existing.charity_id)?;
    let campaign = campaign_service::transition(&state.db, id, body.status).await?;
    Ok(ApiResponse::success(campaign))
}
