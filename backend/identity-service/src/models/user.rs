use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// Role enum matching database user_role type.
///
/// Closed enumeration: every principal holds exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Vendedor,
    Trabajador,
    Comprador,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Vendedor => "VENDEDOR",
            Role::Trabajador => "TRABAJADOR",
            Role::Comprador => "COMPRADOR",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "VENDEDOR" => Some(Role::Vendedor),
            "TRABAJADOR" => Some(Role::Trabajador),
            "COMPRADOR" => Some(Role::Comprador),
            _ => None,
        }
    }
}

/// User model - core identity entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    /// Externally-issued token recorded for notification routing.
    pub device_token: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sanitized projection returned by introspection and admin listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            active: user.active,
            last_login_at: user.last_login_at,
        }
    }
}

/// Login request (HTTP).
///
/// Deliberately narrow: decoded independently of the persisted user shape so
/// client-supplied fields like role or id can never be mistaken for
/// authoritative.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
    /// Externally-issued token recorded for notification routing.
    pub device_token: Option<String>,
}

/// Registration request (HTTP)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Requested role; defaults to COMPRADOR when absent.
    pub role: Option<String>,
}

/// Successful login/registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Vendedor, Role::Trabajador, Role::Comprador] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_from_str_is_case_insensitive() {
        assert_eq!(Role::from_str("vendedor"), Some(Role::Vendedor));
        assert_eq!(Role::from_str("Trabajador"), Some(Role::Trabajador));
    }

    #[test]
    fn test_role_from_str_rejects_unknown() {
        assert_eq!(Role::from_str("SUPERUSER"), None);
        assert_eq!(Role::from_str(""), None);
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Comprador).unwrap(), "\"COMPRADOR\"");
    }
}
