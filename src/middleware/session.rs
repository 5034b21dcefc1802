//! Session activity tracking.
//!
//! Requests carrying a valid access token must belong to a live session;
//! the session's `last_activity_at` and the user's `last_seen_at` are
//! bumped on every such request. Requests without a token pass through and
//! are left to the handler's extractors.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::bearer_token;
use crate::services::auth as auth_service;
use crate::services::session as session_service;
use crate::AppState;

/// Session attached to the request by [`track_session`].
#[derive(Debug, Clone, Copy)]
pub struct ActiveSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
}

pub async fn track_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = bearer_token(request.headers())
        .and_then(|token| auth_service::validate_access_token(token, &state.config.jwt_secret).ok());

    let Some(claims) = claims else {
        return Ok(next.run(request).await);
    };

    let (Ok(session_id), Ok(user_id)) = (claims.sid.parse::<Uuid>(), claims.user_id.parse::<Uuid>())
    else {
        return Err(AppError::Unauthorized);
    };

    if !session_service::touch(&state.db, session_id).await? {
        tracing::debug!(session_id = %session_id, "Rejected token for inactive session");
        return Err(AppError::Unauthorized);
    }

    request
        .extensions_mut()
        .insert(ActiveSession { session_id, user_id });

    Ok(next.run(request).await)
}
