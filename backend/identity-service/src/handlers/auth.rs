//! Authentication endpoints: login, registration, logout, introspection.

use crate::db;
use crate::error::{IdentityError, Result};
use crate::models::user::{LoginRequest, LoginResponse, RegisterRequest, Role, UserInfo};
use crate::security::authorizer::{bearer_token, AuthContext};
use crate::security::password::{hash_password, verify_password};
use crate::services::subscriptions;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::DateTime;
use crypto_core::TokenCodec;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Roles a client may request at registration. Staff and admin accounts are
/// provisioned out of band.
const SELF_REGISTER_ROLES: &[Role] = &[Role::Comprador, Role::Vendedor];

fn token_cookie(token: &str, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build("token", token.to_string())
        .path("/")
        .max_age(CookieDuration::seconds(ttl_secs))
        .finish()
}

/// Authenticate a principal and mint a bearer token.
///
/// POST /login
pub async fn login(
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    // Unknown username, inactive account and wrong password are deliberately
    // indistinguishable to the caller.
    let user = db::users::find_by_username(&pool, &payload.username)
        .await?
        .ok_or(IdentityError::InvalidCredentials)?;

    if !user.active {
        return Err(IdentityError::InvalidCredentials);
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::info!(username = %user.username, "failed login attempt");
        return Err(IdentityError::InvalidCredentials);
    }

    // Lapsed sellers are demoted before the token is minted so the role seen
    // by every downstream check is current.
    let role = subscriptions::reevaluate_role(&pool, &user).await?;

    if let Some(device_token) = payload.device_token.as_deref() {
        // Notification routing only; a failure here must not block login.
        if let Err(e) = db::users::set_device_token(&pool, user.id, device_token).await {
            tracing::warn!(user_id = %user.id, error = %e, "failed to record device token");
        }
    }

    db::users::touch_last_login(&pool, user.id).await?;

    let token = codec.mint(&user.username)?;
    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        role = role.as_str(),
        "user logged in"
    );

    Ok(HttpResponse::Ok()
        .insert_header(("Authorization", format!("Bearer {token}")))
        .cookie(token_cookie(&token, codec.ttl_secs()))
        .json(LoginResponse {
            token,
            username: user.username,
            user_id: user.id,
        }))
}

/// Register a new principal and mint its first token.
///
/// POST /createUser
pub async fn create_user(
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let role = match payload.role.as_deref() {
        None | Some("") => Role::Comprador,
        Some(value) => Role::from_str(value)
            .filter(|r| SELF_REGISTER_ROLES.contains(r))
            .ok_or_else(|| {
                IdentityError::Validation(format!("role '{value}' cannot be self-assigned"))
            })?,
    };

    if db::users::find_by_username(&pool, &payload.username)
        .await?
        .is_some()
    {
        return Err(IdentityError::UsernameAlreadyExists);
    }

    let password_hash = hash_password(&payload.password)?;
    let user =
        db::users::create_user(&pool, &payload.username, &payload.email, &password_hash, role)
            .await?;

    let token = codec.mint(&user.username)?;
    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        role = user.role.as_str(),
        "user registered"
    );

    Ok(HttpResponse::Ok()
        .cookie(token_cookie(&token, codec.ttl_secs()))
        .json(LoginResponse {
            token,
            username: user.username,
            user_id: user.id,
        }))
}

/// Revoke the presented token.
///
/// GET /log_out
///
/// The revocation is durable before the response goes out, so the very next
/// request carrying this token is anonymous. A store failure is reported to
/// the caller; a logout that silently did not persist would be worse than a
/// failed one.
pub async fn logout(
    req: HttpRequest,
    ctx: AuthContext,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse> {
    let token = bearer_token(&req).ok_or(IdentityError::Unauthorized)?;

    // The authorizer already verified this token; claims() only recovers the
    // original expiry for the revocation record.
    let claims = codec.claims(&token)?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| IdentityError::Internal("token carries an out-of-range expiry".into()))?;

    let token_hash = crypto_core::hash::hash_token(&token);
    db::token_revocation::revoke_token(&pool, &token_hash, &ctx.username, expires_at).await?;

    tracing::info!(user_id = %ctx.user_id, username = %ctx.username, "session revoked");
    Ok(HttpResponse::Ok().json(json!({ "message": "Logout successful" })))
}

/// Return the authenticated principal, sanitized.
///
/// GET /isLoggedIn
pub async fn is_logged_in(ctx: AuthContext, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let user = db::users::find_by_username(&pool, &ctx.username)
        .await?
        .ok_or(IdentityError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(UserInfo::from(user)))
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login))
        .route("/createUser", web::post().to(create_user))
        .route("/log_out", web::get().to(logout))
        .route("/isLoggedIn", web::get().to(is_logged_in));
}
