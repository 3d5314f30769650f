/// Database operations for the identity service
pub mod subscriptions;
pub mod token_revocation;
pub mod users;
