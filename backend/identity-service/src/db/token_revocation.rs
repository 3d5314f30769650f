/// Token revocation database operations
///
/// The denylist is the only durable state the auth core introduces beyond
/// the principal table. Rows are keyed by the SHA-256 hex of the token as
/// issued; a row exists only for explicitly revoked tokens.
use crate::error::Result;
use crate::models::TokenRevocation;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Record a revoked token in the denylist.
///
/// Idempotent: revoking the same token again leaves the original record
/// untouched, so the externally observable effect is identical.
pub async fn revoke_token(
    pool: &PgPool,
    token_hash: &str,
    username: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO token_revocation (id, token_hash, username, valid, revoked_at, expires_at)
        VALUES ($1, $2, $3, FALSE, $4, $5)
        ON CONFLICT (token_hash) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(token_hash)
    .bind(username)
    .bind(Utc::now())
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch the revocation record for a token, if one exists.
pub async fn find_by_hash(pool: &PgPool, token_hash: &str) -> Result<Option<TokenRevocation>> {
    let record = sqlx::query_as::<_, TokenRevocation>(
        "SELECT * FROM token_revocation WHERE token_hash = $1",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Point lookup: has this token been explicitly revoked?
///
/// Returns false for tokens never recorded.
pub async fn is_token_revoked(pool: &PgPool, token_hash: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM token_revocation WHERE token_hash = $1 AND NOT valid",
    )
    .bind(token_hash)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Delete records whose token has expired on its own (maintenance operation).
///
/// Safe because an expired token already fails verification before the
/// denylist is ever consulted.
pub async fn cleanup_expired_revocations(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM token_revocation WHERE expires_at < NOW()")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Count of revocation records still shielding unexpired tokens.
pub async fn count_active_revocations(pool: &PgPool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM token_revocation WHERE expires_at > NOW()",
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
