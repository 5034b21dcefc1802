//! JWT authentication extractor for Axum handlers.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::services::auth as auth_service;
use crate::AppState;

/// Authenticated user extracted from JWT Bearer token.
///
/// Use as an Axum extractor in handlers that require authentication:
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    /// Charity administered by this user (charity admins only).
    pub charity_id: Option<Uuid>,
    pub session_id: Uuid,
}

impl CurrentUser {
    pub fn is_platform_admin(&self) -> bool {
        self.role == UserRole::PlatformAdmin
    }

    /// Platform admins manage every charity; charity admins only their own.
    pub fn can_manage(&self, charity_id: Uuid) -> bool {
        match self.role {
            UserRole::PlatformAdmin => true,
            UserRole::CharityAdmin => self.charity_id == Some(charity_id),
            UserRole::Donor => false,
        }
    }

    /// Error unless [`CurrentUser::can_manage`] holds.
    pub fn ensure_can_manage(&self, charity_id: Uuid) -> Result<(), AppError> {
        if self.can_manage(charity_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not manage this charity".to_string(),
            ))
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;

        let claims = auth_service::validate_access_token(token, &state.config.jwt_secret)?;

        let user_id: Uuid = claims
            .user_id
            .parse()
            .map_err(|_| AppError::Unauthorized)?;
        let session_id: Uuid = claims.sid.parse().map_err(|_| AppError::Unauthorized)?;
        let charity_id = match claims.charity_id.as_deref() {
            Some(raw) => Some(raw.parse().map_err(|_| AppError::Unauthorized)?),
            None => None,
        };

        let role: UserRole =
            serde_json::from_str(&format!("\"{}\"", claims.role)).map_err(|_| {
                AppError::Internal(format!("Invalid role in token: {}", claims.role))
            })?;

        Ok(CurrentUser {
            id: user_id,
            username: claims.sub,
            role,
            charity_id,
            session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user(role: UserRole, charity_id: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "u".to_string(),
            role,
            charity_id,
            session_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn charity_admin_manages_only_own_charity() {
        let own = Uuid::from_u128(1);
        let admin = user(UserRole::CharityAdmin, Some(own));
        assert!(admin.can_manage(own));
        assert!(!admin.can_manage(Uuid::from_u128(2)));
        assert!(admin.ensure_can_manage(Uuid::from_u128(2)).is_err());
    }

    #[test]
    fn platform_admin_manages_all_and_donor_none() {
        assert!(user(UserRole::PlatformAdmin, None).can_manage(Uuid::from_u128(5)));
        assert!(!user(UserRole::Donor, None).can_manage(Uuid::from_u128(5)));
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }
}
