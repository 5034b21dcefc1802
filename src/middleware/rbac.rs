//! Role-based access control extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserRole;
use crate::AppState;

/// Extractor that requires the user to have Platform_Admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::PlatformAdmin {
            return Err(AppError::Forbidden(
                "Platform admin access required".to_string(),
            ));
        }
        Ok(RequireAdmin(user))
    }
}

/// Extractor that requires Platform_Admin or Charity_Admin role.
///
/// Handlers still check the specific charity with
/// [`CurrentUser::ensure_can_manage`].
#[derive(Debug, Clone)]
pub struct RequireCharityStaff(pub CurrentUser);

impl FromRequestParts<AppState> for RequireCharityStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        match user.role {
            UserRole::PlatformAdmin | UserRole::CharityAdmin => Ok(RequireCharityStaff(user)),
            UserRole::Donor => Err(AppError::Forbidden(
                "Charity admin access required".to_string(),
            )),
        }
    }
}
