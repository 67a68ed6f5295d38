pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod security;
pub mod sheets;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use config::Config;
use sheets::SpreadsheetService;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sheets: Arc<dyn SpreadsheetService>,
}

/// Full HTTP application: routes, security headers and request tracing.
pub fn app(state: AppState) -> Router {
    routes::router(&state.config)
        .layer(axum::middleware::from_fn(security::security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
