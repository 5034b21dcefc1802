//! User model with role-based access control.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    #[sqlx(rename = "Platform_Admin")]
    PlatformAdmin,
    #[sqlx(rename = "Charity_Admin")]
    CharityAdmin,
    Donor,
}

/// Full user row from database (includes password_hash: never serialize to API).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: UserRole,
    pub charity_id: Option<Uuid>,
    pub is_active: bool,
    pub is_suspended: bool,
    pub suspension_reason: Option<String>,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response DTO: excludes password_hash and internal fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub charity_id: Option<Uuid>,
    pub is_active: bool,
    pub is_suspended: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            display_name: u.display_name,
            role: u.role,
            charity_id: u.charity_id,
            is_active: u.is_active,
            is_suspended: u.is_suspended,
            last_login: u.last_login,
            last_seen_at: u.last_seen_at,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 120))]
    pub display_name: String,
    pub role: UserRole,
    pub charity_id: Option<Uuid>,
}

/// Body of a suspend request (users or charities).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SuspendRequest {
    #[validate(length(min = 1, max = 500, message = "a reason is required"))]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::nil(),
            username: "helper".to_string(),
            email: "helper@charity.test".to_string(),
            password_hash: "secret_hash".to_string(),
            display_name: "Helper".to_string(),
            role: UserRole::CharityAdmin,
            charity_id: Some(Uuid::from_u128(7)),
            is_active: true,
            is_suspended: false,
            suspension_reason: None,
            failed_login_attempts: 0,
            locked_until: None,
            last_login: None,
            last_seen_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_role_serialization() {
        let json = serde_json::to_string(&UserRole::CharityAdmin).unwrap();
        assert_eq!(json, "\"CharityAdmin\"");
    }

    #[test]
    fn user_response_excludes_password() {
        let json = serde_json::to_string(&UserResponse::from(sample_user())).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
        assert!(json.contains("charity_id"));
    }

    #[test]
    fn create_user_requires_valid_email() {
        let input = CreateUser {
            username: "donor1".to_string(),
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
            display_name: "Donor".to_string(),
            role: UserRole::Donor,
            charity_id: None,
        };
        assert!(input.validate().is_err());
    }
}
