//! Charity routes: registry CRUD, suspension, and charity-scoped listings.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::{RequireAdmin, RequireCharityStaff};
use crate::models::campaign::{Campaign, CreateCampaign};
use crate::models::charity::{Charity, CharitySummary, CreateCharity, UpdateCharity};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::user::SuspendRequest;
use crate::services::campaign as campaign_service;
use crate::services::charity::{self as charity_service, CharityFilters};
use crate::AppState;

/// GET /api/v1/charities: list charities with filters and pagination.
pub async fn list(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<CharityFilters>,
) -> Result<Json<ApiResponse<PagedResult<CharitySummary>>>, AppError> {
    let result = charity_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/charities: register a charity (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateCharity>,
) -> Result<Json<ApiResponse<Charity>>, AppError> {
    body.validate()?;
    let charity = charity_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(charity))
}

/// GET /api/v1/charities/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Charity>>, AppError> {
    let charity = charity_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(charity))
}

/// PUT /api/v1/charities/{id}: update profile (charity admin of this charity, or admin).
pub async fn update(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCharity>,
) -> Result<Json<ApiResponse<Charity>>, AppError> {
    user.ensure_can_manage(id)?;
    body.validate()?;
    let charity =
        charity_service::update(&state.db, id, &body, user.is_platform_admin()).await?;
    Ok(ApiResponse::success(charity))
}

/// POST /api/v1/charities/{id}/suspend (admin)
pub async fn suspend(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<SuspendRequest>,
) -> Result<Json<ApiResponse<Charity>>, AppError> {
    body.validate()?;
    let charity = charity_service::set_suspension(&state.db, id, Some(&body.reason)).await?;
    Ok(ApiResponse::success(charity))
}

/// POST /api/v1/charities/{id}/unsuspend (admin)
pub async fn unsuspend(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Charity>>, AppError> {
    let charity = charity_service::set_suspension(&state.db, id, None).await?;
    Ok(ApiResponse::success(charity))
}

/// GET /api/v1/charities/{id}/campaigns: public campaign list.
pub async fn list_campaigns(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Campaign>>>, AppError> {
    charity_service::find_by_id(&state.db, id).await?;
    let campaigns = campaign_service::list_by_charity(&state.db, id).await?;
    Ok(ApiResponse::success(campaigns))
}

/// POST /api/v1/charities/{id}/campaigns: create a draft campaign.
pub async fn create_campaign(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateCampaign>,
) -> Result<Json<ApiResponse<Campaign>>, AppError> {
    user.ensure_can_manage(id)?;
    body.validate()?;
    charity_service::find_by_id(&state.db, id).await?;
    let campaign = campaign_service::create(&state.db, id, &body).await?;
    Ok(ApiResponse::success(campaign))
}
