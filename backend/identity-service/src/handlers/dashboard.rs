//! Role-gated dashboard and admin endpoints.
//!
//! These endpoints exist for the operational dashboards of the marketplace;
//! each group declares the role set allowed into it.

use crate::db;
use crate::error::Result;
use crate::models::Role;
use crate::security::RoleGuard;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

/// Roles allowed into the operational dashboards.
pub const DASHBOARD_ROLES: &[Role] = &[Role::Admin, Role::Vendedor, Role::Trabajador];

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub active_users: i64,
    pub sellers: i64,
    pub active_subscriptions: i64,
    pub revoked_sessions: i64,
}

/// Aggregate identity stats for the operational dashboard.
///
/// GET /dashboard/stats
pub async fn stats(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let stats = DashboardStats {
        total_users: db::users::count_all(&pool).await?,
        active_users: db::users::count_active(&pool).await?,
        sellers: db::users::count_by_role(&pool, Role::Vendedor).await?,
        active_subscriptions: db::subscriptions::count_active(&pool).await?,
        revoked_sessions: db::token_revocation::count_active_revocations(&pool).await?,
    };

    Ok(HttpResponse::Ok().json(stats))
}

/// Full principal listing, admin only.
///
/// GET /admin/users
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let users = db::users::list_all(&pool).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .wrap(RoleGuard::any_of(DASHBOARD_ROLES))
            .route("/stats", web::get().to(stats)),
    )
    .service(
        web::scope("/admin")
            .wrap(RoleGuard::any_of(&[Role::Admin]))
            .route("/users", web::get().to(list_users)),
    );
}
