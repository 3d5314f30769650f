/// User database operations
use crate::error::{IdentityError, Result};
use crate::models::user::{Role, User, UserInfo};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Find a user by username.
///
/// Single source of truth for both the login credential check and the
/// per-request role lookup.
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Insert a new principal and return the stored row.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
            IdentityError::UsernameAlreadyExists
        } else {
            e.into()
        }
    })?;

    Ok(user)
}

/// Persist a role change (e.g. seller demotion at login).
pub async fn update_role(pool: &PgPool, user_id: Uuid, role: Role) -> Result<()> {
    sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await?;

    Ok(())
}

/// Record the externally-issued notification-routing token.
pub async fn set_device_token(pool: &PgPool, user_id: Uuid, device_token: &str) -> Result<()> {
    sqlx::query("UPDATE users SET device_token = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(device_token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Stamp a successful login.
pub async fn touch_last_login(pool: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Sanitized listing for the admin dashboard.
pub async fn list_all(pool: &PgPool) -> Result<Vec<UserInfo>> {
    let users = sqlx::query_as::<_, UserInfo>(
        "SELECT id, username, email, role, active, last_login_at FROM users ORDER BY username",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn count_all(pool: &PgPool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn count_active(pool: &PgPool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE active")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn count_by_role(pool: &PgPool, role: Role) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
