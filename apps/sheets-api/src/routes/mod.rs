pub mod diagnostics;
pub mod health;
pub mod sheets;

use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::config::Config;
use crate::AppState;

pub fn router(config: &Config) -> Router<AppState> {
    let router = Router::new().merge(health::router()).merge(sheets::router());
    if config.diagnostics_enabled {
        router.merge(diagnostics::router())
    } else {
        router
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        sheets::sheets,
        diagnostics::diagnostics,
    ),
    components(
        schemas(
            crate::error::ErrorEnvelope,
            crate::sheets::SheetType,
            health::HealthResponse,
            sheets::ReadResponse,
            sheets::WriteRequest,
            sheets::WriteResponse,
            diagnostics::DiagnosticsResponse,
            diagnostics::DiagnosticsConfig,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Sheets", description = "Spreadsheet read and append"),
        (name = "Diagnostics", description = "Configuration self-test"),
    )
)]
pub struct ApiDoc;
