/// Identity Service Library
///
/// Owns authentication, authorization and the principal table for the Feria
/// marketplace backend. Everything else in the product talks to this service
/// to learn who is making a request, with which role.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `db`: Database repositories (users, subscriptions, token revocation)
/// - `error`: Error types
/// - `handlers`: HTTP endpoints (login, registration, logout, dashboards)
/// - `models`: Data models
/// - `security`: Password hashing, request authorization, role gating
/// - `services`: Business logic (seller role re-evaluation)
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod security;
pub mod services;

// Re-export commonly used types
pub use error::{IdentityError, Result};
