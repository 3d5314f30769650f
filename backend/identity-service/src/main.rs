use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use crypto_core::TokenCodec;
use db_pool::{create_pool as create_pg_pool, DbConfig};
use identity_service::config::Settings;
use identity_service::db;
use identity_service::handlers::{register_auth, register_dashboards};
use identity_service::security::{RequestAuthorizer, RoleGuard, PUBLIC_PATHS};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Interval between sweeps of naturally-expired revocation records.
const REVOCATION_GC_INTERVAL: Duration = Duration::from_secs(3600);

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting identity service");

    let settings = Settings::load().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mut db_cfg = DbConfig::from_env("identity-service")
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    db_cfg.max_connections = settings.database.max_connections;

    let pool = create_pg_pool(db_cfg)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    tracing::info!("Successfully connected to database");

    let codec = Arc::new(
        TokenCodec::from_base64_secret(&settings.jwt.secret_key, settings.jwt.ttl_secs)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
    );

    // Sweep revocation records whose tokens have expired on their own.
    let gc_pool = pool.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REVOCATION_GC_INTERVAL);
        loop {
            ticker.tick().await;
            match db::token_revocation::cleanup_expired_revocations(&gc_pool).await {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::info!(removed, "cleaned up expired revocation records")
                }
                Err(e) => tracing::warn!(error = %e, "revocation cleanup failed"),
            }
        }
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    tracing::info!("Starting HTTP server on {}", addr);

    let allowed_origin = settings.cors.allowed_origin.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allow_any_header()
            .supports_credentials();

        // Middleware run outermost-first: CORS, request logging, then the
        // authorizer populates the security context the role gate reads.
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::from(codec.clone()))
            .wrap(RoleGuard::authenticated().with_public(PUBLIC_PATHS))
            .wrap(RequestAuthorizer::new(codec.clone(), pool.clone()))
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .route(
                "/",
                web::get().to(|| async { "Feria Identity Service v1.0" }),
            )
            .route("/api", web::get().to(|| async { "OK" }))
            .configure(|cfg| {
                register_auth(cfg);
                register_dashboards(cfg);
            })
    })
    .bind(&addr)?
    .run()
    .await
}
