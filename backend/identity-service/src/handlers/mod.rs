/// HTTP handlers for the identity service API
pub mod auth;
pub mod dashboard;

pub use auth::register_routes as register_auth;
pub use dashboard::register_routes as register_dashboards;
