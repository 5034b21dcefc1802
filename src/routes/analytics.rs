//! Charity analytics route.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireCharityStaff;
use crate::services::aggregation::AnalyticsSummary;
use crate::services::analytics as analytics_service;
use crate::AppState;

/// GET /api/v1/charities/{id}/analytics: donation and campaign summary.
pub async fn charity_summary(
    State(state): State<AppState>,
    RequireCharityStaff(user): RequireCharityStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnalyticsSummary>>, AppError> {
    user.ensure_can_manage(id)?;
    let summary = analytics_service::charity_summary(&state.db, id).await?;
    Ok(ApiResponse::success(summary))
}
