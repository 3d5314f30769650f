use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Seller subscription record.
///
/// The newest purchase decides whether a VENDEDOR keeps the role at login.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purchased_at: DateTime<Utc>,
    /// Date the subscription runs out; lapsed from the start of this day.
    pub expires_at: NaiveDate,
}

impl Subscription {
    /// A subscription is lapsed from the first instant of its expiry date.
    pub fn is_lapsed(&self, today: NaiveDate) -> bool {
        self.expires_at <= today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(expires_at: NaiveDate) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            purchased_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_lapses_on_expiry_date() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert!(subscription(today).is_lapsed(today));
    }

    #[test]
    fn test_current_until_expiry_date() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        assert!(!subscription(tomorrow).is_lapsed(today));
    }

    #[test]
    fn test_lapsed_after_expiry_date() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let yesterday = today.pred_opt().unwrap();
        assert!(subscription(yesterday).is_lapsed(today));
    }
}
