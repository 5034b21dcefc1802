//! Suspension check for authenticated requests.
//!
//! Runs after [`super::session::track_session`]. A suspended user, or a
//! charity admin whose charity is suspended, is refused everything except
//! reading their own profile and logging out.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::session::ActiveSession;
use crate::AppState;

/// Paths a suspended account may still reach.
const EXEMPT_SUFFIXES: &[&str] = &["/auth/me", "/auth/logout"];

#[derive(Debug, sqlx::FromRow)]
struct SuspensionRow {
    user_suspended: bool,
    user_reason: Option<String>,
    charity_suspended: Option<bool>,
    charity_reason: Option<String>,
}

/// Reason the account is blocked, if any.
fn suspension_reason(row: &SuspensionRow) -> Option<String> {
    if row.user_suspended {
        return Some(
            row.user_reason
                .clone()
                .unwrap_or_else(|| "This account has been suspended".to_string()),
        );
    }
    if row.charity_suspended == Some(true) {
        return Some(
            row.charity_reason
                .clone()
                .unwrap_or_else(|| "This charity has been suspended".to_string()),
        );
    }
    None
}

fn is_exempt(path: &str) -> bool {
    EXEMPT_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

async fn load(pool: &sqlx::PgPool, user_id: Uuid) -> Result<Option<SuspensionRow>, AppError> {
    let row = sqlx::query_as::<_, SuspensionRow>(
        r#"
        SELECT
            u.is_suspended      AS user_suspended,
            u.suspension_reason AS user_reason,
            c.is_suspended      AS charity_suspended,
            c.suspension_reason AS charity_reason
        FROM users u
        LEFT JOIN charities c ON c.id = u.charity_id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn reject_suspended(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(session) = request.extensions().get::<ActiveSession>().copied() else {
        return Ok(next.run(request).await);
    };

    if is_exempt(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let row = load(&state.db, session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if let Some(reason) = suspension_reason(&row) {
        tracing::info!(user_id = %session.user_id, path = %request.uri().path(), "Blocked suspended account");
        return Err(AppError::Suspended(reason));
    }

    Ok(next.run(request).await)
}
