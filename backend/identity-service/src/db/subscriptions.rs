/// Seller subscription queries
use crate::error::Result;
use crate::models::Subscription;
use sqlx::PgPool;
use uuid::Uuid;

/// Most recent subscription by purchase date, if any.
pub async fn latest_for_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Subscription>> {
    let subscription = sqlx::query_as::<_, Subscription>(
        "SELECT * FROM subscriptions WHERE user_id = $1 ORDER BY purchased_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(subscription)
}

/// Count of subscriptions that have not yet lapsed.
pub async fn count_active(pool: &PgPool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM subscriptions WHERE expires_at > CURRENT_DATE",
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
