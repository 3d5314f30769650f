use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use crypto_core::TokenError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient role")]
    Forbidden,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl actix_web::ResponseError for IdentityError {
    fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::InvalidCredentials
            | IdentityError::Unauthorized
            | IdentityError::InvalidToken
            | IdentityError::TokenExpired
            | IdentityError::TokenRevoked => StatusCode::UNAUTHORIZED,
            IdentityError::Forbidden => StatusCode::FORBIDDEN,
            IdentityError::UserNotFound => StatusCode::NOT_FOUND,
            IdentityError::UsernameAlreadyExists => StatusCode::CONFLICT,
            IdentityError::WeakPassword(_) | IdentityError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Don't leak internal details to clients; the cause is already logged.
        let message = match self {
            IdentityError::Database(_) | IdentityError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

// Conversions from external error types
impl From<sqlx::Error> for IdentityError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);
        IdentityError::Database(err.to_string())
    }
}

impl From<TokenError> for IdentityError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => IdentityError::InvalidToken,
            TokenError::Expired => IdentityError::TokenExpired,
        }
    }
}

impl From<anyhow::Error> for IdentityError {
    fn from(err: anyhow::Error) -> Self {
        IdentityError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for IdentityError {
    fn from(err: validator::ValidationErrors) -> Self {
        IdentityError::Validation(err.to_string())
    }
}
