//! User moderation routes.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::models::user::{SuspendRequest, UserResponse};
use crate::services::auth as auth_service;
use crate::AppState;

/// POST /api/v1/users/{id}/suspend (admin): also revokes the user's sessions.
pub async fn suspend(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<SuspendRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    body.validate()?;
    if admin.id == id {
        return Err(AppError::Validation(
            "You cannot suspend your own account".to_string(),
        ));
    }
    let user = auth_service::set_user_suspension(&state.db, id, Some(&body.reason)).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// POST /api/v1/users/{id}/unsuspend (admin)
pub async fn unsuspend(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service::set_user_suspension(&state.db, id, None).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}
