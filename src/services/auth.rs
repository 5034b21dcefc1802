//! Authentication service: password hashing, JWT, login sessions, and user management.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::session::ClientInfo;
use crate::models::user::{CreateUser, User, UserRole};
use crate::services::session as session_service;

/// Maximum failed login attempts before account lockout.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Lockout duration in minutes after exceeding max failed attempts.
const LOCKOUT_DURATION_MINUTES: i64 = 15;

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub role: String,
    pub charity_id: Option<String>,
    /// Session the token belongs to.
    pub sid: String,
    pub jti: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned on successful login.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Signing secret and token lifetimes.
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings<'a> {
    pub secret: &'a str,
    pub access_expiry_secs: i64,
    pub refresh_expiry_secs: i64,
}

impl<'a> From<&'a AppConfig> for TokenSettings<'a> {
    fn from(config: &'a AppConfig) -> Self {
        Self {
            secret: &config.jwt_secret,
            access_expiry_secs: config.jwt_access_token_expiry_secs,
            refresh_expiry_secs: config.jwt_refresh_token_expiry_secs,
        }
    }
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn role_name(role: &UserRole) -> String {
    serde_json::to_string(role)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

/// Generate a JWT token pair (access + refresh) bound to a session.
pub fn generate_tokens(
    user: &User,
    session_id: Uuid,
    settings: TokenSettings<'_>,
) -> Result<TokenPair, AppError> {
    let now = Utc::now();
    let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());

    let claims_for = |token_type: &str, expiry_secs: i64| Claims {
        sub: user.username.clone(),
        user_id: user.id.to_string(),
        role: role_name(&user.role),
        charity_id: user.charity_id.map(|id| id.to_string()),
        sid: session_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        token_type: token_type.to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    let access_claims = claims_for("access", settings.access_expiry_secs);
    let refresh_claims = claims_for("refresh", settings.refresh_expiry_secs);

    let access_token = jsonwebtoken::encode(&Header::default(), &access_claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    let refresh_token = jsonwebtoken::encode(&Header::default(), &refresh_claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: settings.access_expiry_secs,
    })
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::default();

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

/// Validate a JWT and require it to be an access token.
pub fn validate_access_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let claims = validate_token(token, jwt_secret)?;
    if claims.token_type != "access" {
        return Err(AppError::Unauthorized);
    }
    Ok(claims)
}

/// Create a new user with hashed password.
pub async fn create_user(pool: &PgPool, input: &CreateUser) -> Result<User, AppError> {
    if input.role == UserRole::CharityAdmin && input.charity_id.is_none() {
        return Err(AppError::Validation(
            "Charity admins must be linked to a charity".to_string(),
        ));
    }

    let password_hash = hash_password(&input.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, display_name, role, charity_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&input.username)
    .bind(&input.email)
    .bind(&password_hash)
    .bind(&input.display_name)
    .bind(&input.role)
    .bind(input.charity_id)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Username or email already exists"))?;

    Ok(user)
}

/// Authenticate a user by username and password, opening a session.
pub async fn login(
    pool: &PgPool,
    username: &str,
    password: &str,
    client: &ClientInfo,
    settings: TokenSettings<'_>,
) -> Result<TokenPair, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Unauthorized);
        }
    }

    if !user.is_active {
        return Err(AppError::Unauthorized);
    }

    if !verify_password(password, &user.password_hash)? {
        let new_attempts = user.failed_login_attempts + 1;
        let lock_until = (new_attempts >= MAX_FAILED_ATTEMPTS)
            .then(|| Utc::now() + Duration::minutes(LOCKOUT_DURATION_MINUTES));
        sqlx::query(
            "UPDATE users SET failed_login_attempts = $1, locked_until = COALESCE($2, locked_until) WHERE id = $3",
        )
        .bind(new_attempts)
        .bind(lock_until)
        .bind(user.id)
        .execute(pool)
        .await?;
        tracing::warn!(username = %user.username, attempts = new_attempts, "Failed login attempt");
        return Err(AppError::Unauthorized);
    }

    // Credentials are valid; a suspended account learns why it cannot proceed.
    if user.is_suspended {
        return Err(AppError::Suspended(
            user.suspension_reason
                .clone()
                .unwrap_or_else(|| "This account has been suspended".to_string()),
        ));
    }

    sqlx::query(
        "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, last_login = NOW(), last_seen_at = NOW() WHERE id = $1",
    )
    .bind(user.id)
    .execute(pool)
    .await?;

    let session_id = Uuid::new_v4();
    let tokens = generate_tokens(&user, session_id, settings)?;
    let expires_at = Utc::now() + Duration::seconds(settings.refresh_expiry_secs);
    session_service::create(pool, session_id, user.id, &tokens.refresh_token, client, expires_at)
        .await?;

    tracing::info!(user_id = %user.id, session_id = %session_id, "User logged in");
    Ok(tokens)
}

/// Exchange a refresh token for a new pair, rotating the session's token digest.
pub async fn refresh_token(
    pool: &PgPool,
    refresh_token_str: &str,
    settings: TokenSettings<'_>,
) -> Result<TokenPair, AppError> {
    let claims = validate_token(refresh_token_str, settings.secret)?;

    if claims.token_type != "refresh" {
        return Err(AppError::Unauthorized);
    }

    let session_id: Uuid = claims.sid.parse().map_err(|_| AppError::Unauthorized)?;
    let session = session_service::find_by_id(pool, session_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !session.is_active(Utc::now())
        || session.refresh_token_hash != session_service::hash_refresh_token(refresh_token_str)
    {
        return Err(AppError::Unauthorized);
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = true")
        .bind(session.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if user.is_suspended {
        return Err(AppError::Suspended("This account has been suspended".to_string()));
    }

    let tokens = generate_tokens(&user, session_id, settings)?;
    let expires_at = Utc::now() + Duration::seconds(settings.refresh_expiry_secs);
    session_service::rotate(pool, session_id, &tokens.refresh_token, expires_at).await?;

    Ok(tokens)
}

/// Find a user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Suspend (`Some(reason)`) or reinstate (`None`) a user. Suspension revokes
/// every open session.
pub async fn set_user_suspension(
    pool: &PgPool,
    user_id: Uuid,
    reason: Option<&str>,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET is_suspended = $1, suspension_reason = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(reason.is_some())
    .bind(reason)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if reason.is_some() {
        let revoked = session_service::revoke_all_for_user(pool, user_id).await?;
        tracing::info!(user_id = %user_id, revoked_sessions = revoked, "User suspended");
    } else {
        tracing::info!(user_id = %user_id, "User reinstated");
    }

    Ok(user)
}
