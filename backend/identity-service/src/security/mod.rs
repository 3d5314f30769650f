/// Security module for authentication and authorization
///
/// Provides the per-request security machinery:
/// - Password hashing and verification (Argon2id)
/// - Request authorization: bearer extraction, token verification,
///   revocation check, principal resolution (`authorizer`)
/// - Declarative role gating with a data-driven public allow-list
///   (`role_guard`)
pub mod authorizer;
pub mod password;
pub mod role_guard;

pub use authorizer::{bearer_token, AuthContext, RequestAuthorizer};
pub use password::{hash_password, verify_password};
pub use role_guard::{RoleGuard, PUBLIC_PATHS};
