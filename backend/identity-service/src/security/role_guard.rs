//! Declarative per-endpoint role gate.
//!
//! Wrap an endpoint group with the set of roles allowed to call it; an empty
//! set admits any authenticated principal. Evaluated after the request
//! authorizer has (or has not) attached an [`AuthContext`].
//!
//! The public allow-list is plain data: requests whose path matches it
//! bypass the gate entirely.

use crate::error::IdentityError;
use crate::models::Role;
use crate::security::authorizer::AuthContext;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Endpoints reachable without authentication. A trailing `*` matches any
/// suffix.
///
/// Catalog browsing and asset retrieval are served by the business
/// collaborator, but they are enumerated here because the gate owns the
/// decision.
pub const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/api",
    "/login",
    "/createUser",
    "/vendedor/producto/getAll",
    "/vendedor/producto/getById/*",
    "/api/binary-image/*",
    "/api/images/*",
    "/static/*",
];

/// True when `path` matches one of the allow-list `patterns`.
pub fn is_public(path: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| match pattern.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => path == *pattern,
    })
}

/// Decide whether a request carrying `ctx` may pass a gate that allows
/// `allowed` (empty = any authenticated principal).
fn evaluate(ctx: Option<&AuthContext>, allowed: &[Role]) -> Result<(), IdentityError> {
    match ctx {
        None => Err(IdentityError::Unauthorized),
        Some(ctx) if allowed.is_empty() || allowed.contains(&ctx.role) => Ok(()),
        Some(_) => Err(IdentityError::Forbidden),
    }
}

/// Role gate middleware
pub struct RoleGuard {
    allowed: Rc<[Role]>,
    public: &'static [&'static str],
}

impl RoleGuard {
    /// Admit any authenticated principal.
    pub fn authenticated() -> Self {
        Self::any_of(&[])
    }

    /// Admit only principals whose role is in `roles`.
    pub fn any_of(roles: &[Role]) -> Self {
        Self {
            allowed: Rc::from(roles),
            public: &[],
        }
    }

    /// Let requests for the given paths through without any check.
    pub fn with_public(mut self, paths: &'static [&'static str]) -> Self {
        self.public = paths;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RoleGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGuardService {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
            public: self.public,
        }))
    }
}

pub struct RoleGuardService<S> {
    service: Rc<S>,
    allowed: Rc<[Role]>,
    public: &'static [&'static str],
}

impl<S, B> Service<ServiceRequest> for RoleGuardService<S>
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
        if is_public(req.path(), self.public) {
            return Box::pin(self.service.call(req));
        }

        let decision = {
            let extensions = req.extensions();
            evaluate(extensions.get::<AuthContext>(), &self.allowed)
        };

        match decision {
            Ok(()) => Box::pin(self.service.call(req)),
            Err(e) => {
                tracing::debug!(path = %req.path(), error = %e, "request blocked by role gate");
                Box::pin(ready(Err(e.into())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            role,
        }
    }

    #[test]
    fn test_anonymous_is_unauthorized() {
        assert!(matches!(
            evaluate(None, &[]),
            Err(IdentityError::Unauthorized)
        ));
        assert!(matches!(
            evaluate(None, &[Role::Admin]),
            Err(IdentityError::Unauthorized)
        ));
    }

    #[test]
    fn test_empty_set_admits_any_authenticated() {
        assert!(evaluate(Some(&ctx(Role::Comprador)), &[]).is_ok());
    }

    #[test]
    fn test_role_in_set_is_admitted() {
        let allowed = [Role::Admin, Role::Vendedor, Role::Trabajador];
        assert!(evaluate(Some(&ctx(Role::Trabajador)), &allowed).is_ok());
    }

    #[test]
    fn test_role_outside_set_is_forbidden() {
        let allowed = [Role::Admin, Role::Vendedor, Role::Trabajador];
        assert!(matches!(
            evaluate(Some(&ctx(Role::Comprador)), &allowed),
            Err(IdentityError::Forbidden)
        ));
    }

    #[test]
    fn test_is_public_exact_match() {
        assert!(is_public("/login", PUBLIC_PATHS));
        assert!(is_public("/", PUBLIC_PATHS));
        assert!(!is_public("/log_out", PUBLIC_PATHS));
        assert!(!is_public("/dashboard/stats", PUBLIC_PATHS));
    }

    #[test]
    fn test_is_public_wildcard_match() {
        assert!(is_public("/vendedor/producto/getById/42", PUBLIC_PATHS));
        assert!(is_public("/api/images/banner.png", PUBLIC_PATHS));
        assert!(!is_public("/vendedor/producto/delete/42", PUBLIC_PATHS));
    }

    #[test]
    fn test_empty_allow_list_matches_nothing() {
        assert!(!is_public("/login", &[]));
    }
}
