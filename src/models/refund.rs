//! Refund request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "refund_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefundRequest {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub charity_id: Uuid,
    pub requested_by: Uuid,
    pub reason: String,
    pub status: RefundStatus,
    pub reviewed_by: Option<Uuid>,
    pub review_note: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRefundRequest {
    #[validate(length(min = 10, max = 2000, message = "explain the refund in at least 10 characters"))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewRefund {
    pub status: RefundStatus,
    #[validate(length(max = 2000))]
    pub review_note: Option<String>,
}
