//! Session tracking: one row per login, rotated on refresh, revoked on logout.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{ClientInfo, Session};

/// SHA-256 hex digest of a refresh token; only the digest is stored.
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Insert a new session row.
pub async fn create(
    pool: &PgPool,
    session_id: Uuid,
    user_id: Uuid,
    refresh_token: &str,
    client: &ClientInfo,
    expires_at: DateTime<Utc>,
) -> Result<Session, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, user_id, refresh_token_hash, ip_address, user_agent, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(hash_refresh_token(refresh_token))
    .bind(&client.ip_address)
    .bind(&client.user_agent)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

/// Find a session by ID.
pub async fn find_by_id(pool: &PgPool, session_id: Uuid) -> Result<Option<Session>, AppError> {
    let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
        .bind(session_id)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

/// Record activity on a live session and the owning user.
///
/// Returns `false` when the session is unknown, revoked, or expired.
pub async fn touch(pool: &PgPool, session_id: Uuid) -> Result<bool, AppError> {
    let user_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE sessions SET last_activity_at = NOW()
        WHERE id = $1 AND revoked_at IS NULL AND expires_at > NOW()
        RETURNING user_id
        "#,
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    let Some(user_id) = user_id else {
        return Ok(false);
    };

    sqlx::query("UPDATE users SET last_seen_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(true)
}

/// Replace the stored refresh-token digest after a refresh.
pub async fn rotate(
    pool: &PgPool,
    session_id: Uuid,
    refresh_token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE sessions SET refresh_token_hash = $1, expires_at = $2, last_activity_at = NOW() WHERE id = $3",
    )
    .bind(hash_refresh_token(refresh_token))
    .bind(expires_at)
    .bind(session_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Revoke a session. Revoking twice is a no-op.
pub async fn revoke(pool: &PgPool, session_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Revoke every live session of a user (used on suspension).
pub async fn revoke_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE sessions SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
