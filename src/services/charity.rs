//! Charity profile service: CRUD, listing, and suspension.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::charity::{Charity, CharitySummary, CreateCharity, UpdateCharity};
use crate::models::pagination::{PagedResult, Pagination};

/// Filters for listing charities.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CharityFilters {
    pub search: Option<String>,
    pub verified: Option<bool>,
    /// Suspended charities are hidden unless explicitly requested.
    #[serde(default)]
    pub include_suspended: bool,
}

/// Create a new charity.
pub async fn create(pool: &PgPool, input: &CreateCharity) -> Result<Charity, AppError> {
    let charity = sqlx::query_as::<_, Charity>(
        r#"
        INSERT INTO charities (name, description, contact_email, website, is_verified)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.contact_email)
    .bind(&input.website)
    .bind(input.is_verified)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        AppError::conflict_on_unique(e, format!("Charity '{}' already exists", input.name))
    })?;

    tracing::info!(charity_id = %charity.id, name = %charity.name, "Charity created");
    Ok(charity)
}

/// Find charity by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Charity, AppError> {
    sqlx::query_as::<_, Charity>("SELECT * FROM charities WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Charity not found".to_string()))
}

/// List charities with optional filters and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &CharityFilters,
    pagination: &Pagination,
) -> Result<PagedResult<CharitySummary>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if !filters.include_suspended {
        conditions.push("is_suspended = false".to_string());
    }
    if filters.verified.is_some() {
        param_index += 1;
        conditions.push(format!("is_verified = ${param_index}"));
    }
    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(name ILIKE ${param_index} OR description ILIKE ${param_index})"
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM charities {where_clause}");
    let data_sql = format!(
        "SELECT id, name, website, is_verified, is_suspended FROM charities {where_clause} \
         ORDER BY name ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, CharitySummary>(&data_sql);

    if let Some(verified) = filters.verified {
        count_query = count_query.bind(verified);
        data_query = data_query.bind(verified);
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{search}%");
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Update a charity profile. `allow_verify` gates the verification flag.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateCharity,
    allow_verify: bool,
) -> Result<Charity, AppError> {
    let is_verified = if allow_verify { input.is_verified } else { None };

    sqlx::query_as::<_, Charity>(
        r#"
        UPDATE charities SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            contact_email = COALESCE($3, contact_email),
            website = COALESCE($4, website),
            is_verified = COALESCE($5, is_verified),
            updated_at = NOW()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.contact_email)
    .bind(&input.website)
    .bind(is_verified)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Charity name already in use"))?
    .ok_or_else(|| AppError::NotFound("Charity not found".to_string()))
}

/// Suspend (`Some(reason)`) or reinstate (`None`) a charity.
pub async fn set_suspension(
    pool: &PgPool,
    id: Uuid,
    reason: Option<&str>,
) -> Result<Charity, AppError> {
    let charity = sqlx::query_as::<_, Charity>(
        r#"
        UPDATE charities SET is_suspended = $1, suspension_reason = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(reason.is_some())
    .bind(reason)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Charity not found".to_string()))?;

    tracing::info!(charity_id = %id, suspended = charity.is_suspended, "Charity suspension changed");
    Ok(charity)
}
