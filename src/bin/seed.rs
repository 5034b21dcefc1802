//! Seed script for development: populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Every step skips itself when its
//! rows already exist, so the script can be re-run safely.

use anyhow::Context;
use charityhub::db;
use charityhub::services::auth::hash_password;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

const ADMIN_PASSWORD: &str = "Admin123!";
const STAFF_PASSWORD: &str = "Charity123!";
const DONOR_PASSWORD: &str = "Donor123!";

/// (name, description, website, verified)
const CHARITIES: &[(&str, &str, &str, bool)] = &[
    (
        "Clean Water Trust",
        "Wells and filtration for rural communities",
        "https://cleanwater.example.org",
        true,
    ),
    (
        "Open Books Foundation",
        "School libraries and literacy programmes",
        "https://openbooks.example.org",
        true,
    ),
    (
        "Harbour Animal Rescue",
        "Shelter and rehoming for stray animals",
        "https://harbour-rescue.example.org",
        false,
    ),
];

/// (charity index, title, target, categories, status)
const CAMPAIGNS: &[(usize, &str, i64, &[&str], &str)] = &[
    (0, "Village Wells 2026", 25_000, &["water", "health"], "published"),
    (0, "Emergency Filters", 5_000, &["water", "disaster-relief"], "published"),
    (0, "School Taps", 8_000, &["water", "education"], "closed"),
    (1, "Library in a Box", 12_000, &["education", "children"], "published"),
    (1, "Teacher Training", 0, &["education"], "draft"),
    (2, "Winter Kennels", 3_000, &["animals"], "published"),
];

/// (donor index, campaign index or None for a general gift, amount, status)
const DONATIONS: &[(usize, Option<usize>, i64, &str)] = &[
    (0, Some(0), 500, "completed"),
    (1, Some(0), 1_200, "completed"),
    (2, Some(0), 75, "pending"),
    (0, Some(1), 300, "completed"),
    (1, Some(1), 40, "rejected"),
    (2, Some(2), 8_000, "completed"),
    (0, Some(3), 150, "completed"),
    (1, Some(3), 2_500, "completed"),
    (2, None, 100, "completed"),
    (0, Some(5), 60, "pending"),
    (1, Some(5), 250, "completed"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = db::create_pool(&db_url, 5).await?;

    // Run migrations first
    db::run_migrations(&pool).await?;

    println!("=== charityhub Seed Script ===");

    seed_admin_user(&pool).await?;
    let charity_ids = seed_charities(&pool).await?;
    seed_charity_admins(&pool, &charity_ids).await?;
    let donor_ids = seed_donors(&pool).await?;
    let campaign_ids = seed_campaigns(&pool, &charity_ids).await?;
    seed_donations(&pool, &charity_ids, &campaign_ids, &donor_ids).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: admin / {ADMIN_PASSWORD}");
    println!("Charity admin logins: charity1..charity{} / {STAFF_PASSWORD}", CHARITIES.len());
    println!("Donor logins: donor1..donor3 / {DONOR_PASSWORD}");

    Ok(())
}

async fn upsert_user(
    pool: &PgPool,
    username: &str,
    display_name: &str,
    role: &str,
    password: &str,
    charity_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    if let Some(id) = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?
    {
        println!("[skip] User {username} already exists");
        return Ok(id);
    }

    let hash = hash_password(password)?;
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (username, email, password_hash, display_name, role, charity_id)
         VALUES ($1, $2, $3, $4, $5::user_role, $6)
         RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@charityhub.local"))
    .bind(&hash)
    .bind(display_name)
    .bind(role)
    .bind(charity_id)
    .fetch_one(pool)
    .await?;

    println!("[done] Created user {username}");
    Ok(id)
}

async fn seed_admin_user(pool: &PgPool) -> anyhow::Result<()> {
    upsert_user(
        pool,
        "admin",
        "Platform Administrator",
        "Platform_Admin",
        ADMIN_PASSWORD,
        None,
    )
    .await?;
    Ok(())
}

async fn seed_charities(pool: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(CHARITIES.len());
    for (name, description, website, verified) in CHARITIES {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO charities (name, description, contact_email, website, is_verified)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(name)
        .bind(description)
        .bind(format!(
            "contact@{}",
            website.trim_start_matches("https://")
        ))
        .bind(website)
        .bind(verified)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }
    println!("[done] {} charities ready", ids.len());
    Ok(ids)
}

async fn seed_charity_admins(pool: &PgPool, charity_ids: &[Uuid]) -> anyhow::Result<()> {
    for (i, (charity_id, (name, ..))) in charity_ids.iter().zip(CHARITIES).enumerate() {
        upsert_user(
            pool,
            &format!("charity{}", i + 1),
            &format!("{name} Admin"),
            "Charity_Admin",
            STAFF_PASSWORD,
            Some(*charity_id),
        )
        .await?;
    }
    Ok(())
}

async fn seed_donors(pool: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::new();
    for (i, name) in ["Ada Donor", "Ben Giver", "Cleo Patron"].iter().enumerate() {
        let id = upsert_user(
            pool,
            &format!("donor{}", i + 1),
            name,
            "Donor",
            DONOR_PASSWORD,
            None,
        )
        .await?;
        ids.push(id);
    }
    Ok(ids)
}

async fn seed_campaigns(pool: &PgPool, charity_ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM campaigns")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Campaigns already exist ({count})");
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM campaigns ORDER BY created_at, title")
            .fetch_all(pool)
            .await?;
        return Ok(ids);
    }

    let mut ids = Vec::with_capacity(CAMPAIGNS.len());
    for (charity, title, target, categories, status) in CAMPAIGNS {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO campaigns (charity_id, title, description, target_amount,
             beneficiary_category, status, start_date)
             VALUES ($1, $2, $3, $4, $5, $6::campaign_status, CURRENT_DATE)
             RETURNING id",
        )
        .bind(charity_ids[*charity])
        .bind(title)
        .bind(format!("{title}: fundraising campaign"))
        .bind(Decimal::from(*target))
        .bind(json!(categories))
        .bind(status)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }

    println!("[done] Created {} campaigns", ids.len());
    Ok(ids)
}

async fn seed_donations(
    pool: &PgPool,
    charity_ids: &[Uuid],
    campaign_ids: &[Uuid],
    donor_ids: &[Uuid],
) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM donations")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Donations already exist ({count})");
        return Ok(());
    }
    if campaign_ids.len() < CAMPAIGNS.len() {
        println!("[skip] Campaign fixtures incomplete, not seeding donations");
        return Ok(());
    }

    for (donor, campaign, amount, status) in DONATIONS {
        // General gifts go to the first charity.
        let charity_id = match campaign {
            Some(c) => charity_ids[CAMPAIGNS[*c].0],
            None => charity_ids[0],
        };
        sqlx::query(
            "INSERT INTO donations (donor_id, charity_id, campaign_id, amount, status)
             VALUES ($1, $2, $3, $4, $5::donation_status)",
        )
        .bind(donor_ids[*donor])
        .bind(charity_id)
        .bind(campaign.map(|c| campaign_ids[c]))
        .bind(Decimal::from(*amount))
        .bind(status)
        .execute(pool)
        .await?;
    }

    sqlx::query(
        "UPDATE campaigns c SET current_amount = COALESCE((
             SELECT SUM(d.amount) FROM donations d
             WHERE d.campaign_id = c.id AND d.status = 'completed'
         ), 0)",
    )
    .execute(pool)
    .await?;

    println!("[done] Created {} donations", DONATIONS.len());
    Ok(())
}
