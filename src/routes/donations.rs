//! Donation routes: giving, review, CSV export, and refund requests.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireCharityStaff;
use crate::models::donation::{CreateDonation, Donation, DonationStatusChange};
use crate::models::refund::{CreateRefundRequest, RefundRequest};
use crate::services::charity as charity_service;
use crate::services::donation as donation_service;
use crate::services::refund as refund_service;
use crate::AppState;

/// GET /api/v1/charities/{id}/donations: every donation to the charity.
pub async fn list_for_charity(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Donation>>>, AppError> {
    user.ensure_can_manage(id)?;
    charity_service::find_by_id(&state.db, id).await?;
    let donations = donation_service::list_by_charity(&state.db, id).await?;
    Ok(ApiResponse::success(donations))
}

/// GET /api/v1/charities/{id}/donations/export: CSV download.
pub async fn export_for_charity(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    user.ensure_can_manage(id)?;
    charity_service::find_by_id(&state.db, id).await?;
    let donations = donation_service::list_by_charity(&state.db, id).await?;
    let body = donation_service::export_csv(&donations)?;

    tracing::info!(charity_id = %id, rows = donations.len(), "Donations exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"donations-{id}.csv\""),
            ),
        ],
        body,
    ))
}

/// POST /api/v1/donations: give to a charity, optionally to one of its campaigns.
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateDonation>,
) -> Result<Json<ApiResponse<Donation>>, AppError> {
    body.validate()?;
    let donation = donation_service::create(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(donation))
}

/// PATCH /api/v1/donations/{id}/status: confirm or reject a pending donation.
pub async fn update_status(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
    Json(body): Json<DonationStatusChange>,
) -> Result<Json<ApiResponse<Donation>>, AppError> {
    let existing = donation_service::find_by_id(&state.db, id).await?;
    user.ensure_can_manage(existing.charity_id)?;
    let donation = donation_service::update_status(&state.db, id, body.status).await?;
    Ok(ApiResponse::success(donation))
}

/// POST /api/v1/donations/{id}/refunds: donor asks for their money back.
pub async fn request_refund(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateRefundRequest>,
) -> Result<Json<ApiResponse<RefundRequest>>, AppError> {
    body.validate()?;
    let refund = refund_service::request(&state.db, id, current_user.id, &body).await?;
    Ok(ApiResponse::success(refund))
}
