/// Business logic services
pub mod subscriptions;
