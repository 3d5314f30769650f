//! Seller role re-evaluation.
//!
//! A VENDEDOR keeps the role only while a subscription is current. The check
//! runs at login, before the token is minted, so the role embedded in every
//! downstream authorization decision is never stale.

use crate::db;
use crate::error::Result;
use crate::models::user::{Role, User};
use crate::models::Subscription;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

/// Role a seller should hold given their newest subscription.
fn effective_seller_role(latest: Option<&Subscription>, today: NaiveDate) -> Role {
    match latest {
        Some(subscription) if !subscription.is_lapsed(today) => Role::Vendedor,
        _ => Role::Comprador,
    }
}

/// Re-evaluate the principal's role at login.
///
/// Only sellers are affected: a VENDEDOR whose newest subscription is
/// missing or lapsed is demoted to COMPRADOR and the demotion is persisted.
pub async fn reevaluate_role(pool: &PgPool, user: &User) -> Result<Role> {
    if user.role != Role::Vendedor {
        return Ok(user.role);
    }

    let latest = db::subscriptions::latest_for_user(pool, user.id).await?;
    let effective = effective_seller_role(latest.as_ref(), Utc::now().date_naive());

    if effective != user.role {
        db::users::update_role(pool, user.id, effective).await?;
        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            "seller subscription lapsed, demoted to buyer"
        );
    }

    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn subscription(expires_at: NaiveDate) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            purchased_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_no_subscription_demotes() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert_eq!(effective_seller_role(None, today), Role::Comprador);
    }

    #[test]
    fn test_current_subscription_keeps_seller() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let next_month = NaiveDate::from_ymd_opt(2026, 9, 5).unwrap();
        assert_eq!(
            effective_seller_role(Some(&subscription(next_month)), today),
            Role::Vendedor
        );
    }

    #[test]
    fn test_subscription_expiring_today_demotes() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert_eq!(
            effective_seller_role(Some(&subscription(today)), today),
            Role::Comprador
        );
    }

    #[test]
    fn test_lapsed_subscription_demotes() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let last_year = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        assert_eq!(
            effective_seller_role(Some(&subscription(last_year)), today),
            Role::Comprador
        );
    }
}
