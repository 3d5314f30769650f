//! Request authorization middleware.
//!
//! Runs once per inbound request, before any handler: extracts the bearer
//! token (`Authorization` header, `token` cookie fallback), verifies
//! signature and expiry, consults the revocation denylist, resolves the
//! principal and attaches an [`AuthContext`] to the request.
//!
//! An absent, invalid, expired or revoked token leaves the request
//! anonymous; the role gate downstream decides whether anonymous is
//! acceptable. A failing denylist or principal lookup rejects the request
//! outright: revocation must never fail open.
//!
//! Nothing here writes to persistence, and nothing is cached across
//! requests, so a revocation completed before request N begins is visible
//! to request N.

use crate::db;
use crate::error::IdentityError;
use crate::models::Role;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpRequest,
};
use crypto_core::TokenCodec;
use futures::future::{ready, Ready};
use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

/// Principal attached to a request once its token has passed every check.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Pull the bearer token out of a request: `Authorization` header first,
/// `token` cookie as fallback transport.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    if let Some(token) = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
    {
        return Some(token.to_string());
    }

    req.cookie("token").map(|c| c.value().to_string())
}

/// Request authorization middleware
pub struct RequestAuthorizer {
    codec: Arc<TokenCodec>,
    pool: PgPool,
}

impl RequestAuthorizer {
    pub fn new(codec: Arc<TokenCodec>, pool: PgPool) -> Self {
        Self { codec, pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestAuthorizer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestAuthorizerService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestAuthorizerService {
            service: Rc::new(service),
            codec: self.codec.clone(),
            pool: self.pool.clone(),
        }))
    }
}

pub struct RequestAuthorizerService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
    pool: PgPool,
}

impl<S, B> Service<ServiceRequest> for RequestAuthorizerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let codec = self.codec.clone();
        let pool = self.pool.clone();

        Box::pin(async move {
            if let Some(token) = bearer_token(req.request()) {
                match codec.verify(&token) {
                    Err(e) => {
                        // An unusable token is equivalent to no token.
                        tracing::debug!(error = %e, "discarding bearer token");
                    }
                    Ok(claims) => {
                        let token_hash = crypto_core::hash::hash_token(&token);
                        let revoked = db::token_revocation::is_token_revoked(&pool, &token_hash)
                            .await
                            .map_err(|e| {
                                tracing::error!(error = %e, "revocation lookup failed, rejecting request");
                                Error::from(e)
                            })?;

                        if revoked {
                            tracing::debug!(subject = %claims.sub, "token is revoked");
                        } else {
                            let principal = db::users::find_by_username(&pool, &claims.sub)
                                .await
                                .map_err(|e| {
                                    tracing::error!(error = %e, "principal lookup failed, rejecting request");
                                    Error::from(e)
                                })?;

                            match principal {
                                Some(user) if user.active => {
                                    req.extensions_mut().insert(AuthContext {
                                        user_id: user.id,
                                        username: user.username,
                                        role: user.role,
                                    });
                                }
                                _ => {
                                    tracing::debug!(
                                        subject = %claims.sub,
                                        "principal missing or inactive"
                                    );
                                }
                            }
                        }
                    }
                }
            }

            service.call(req).await
        })
    }
}

/// FromRequest implementation for AuthContext
impl actix_web::FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>() {
            Some(ctx) => ready(Ok(ctx.clone())),
            None => ready(Err(IdentityError::Unauthorized.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_from_header() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_from_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new("token", "cookie-token"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer from-header"))
            .cookie(Cookie::new("token", "from-cookie"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_malformed_header_falls_back_to_cookie() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwdw=="))
            .cookie(Cookie::new("token", "from-cookie"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_no_token_anywhere() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}
