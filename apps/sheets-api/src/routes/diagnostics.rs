//! `/sheets/test`: checks request admission and configuration without
//! touching the spreadsheet.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorEnvelope};
use crate::response::json_response;
use crate::routes::sheets::SheetsQuery;
use crate::sheets::Action;
use crate::validation::{self, RequestContext, RequestValidator};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sheets/test", any(diagnostics))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosticsConfig {
    pub spreadsheet_id_length: usize,
    pub credentials_file_exists: bool,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosticsResponse {
    pub ok: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_configured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<DiagnosticsConfig>,
}

#[utoipa::path(
    get,
    path = "/sheets/test",
    tag = "Diagnostics",
    params(SheetsQuery),
    responses(
        (status = 200, description = "Request admitted", body = DiagnosticsResponse),
        (status = 400, description = "Invalid action or tipo", body = ErrorEnvelope),
        (status = 403, description = "CORS or referer violation", body = ErrorEnvelope),
    ),
)]
pub async fn diagnostics(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    query: Result<Query<SheetsQuery>, QueryRejection>,
) -> Response {
    let expose_details = state.config.is_development();
    let ctx = RequestContext::from_http(&method, &headers);

    let grant = match RequestValidator::new(&state.config).validate_request(&ctx) {
        Ok(grant) => grant,
        Err(err) => return err.into_envelope(expose_details),
    };

    let mut response = match report(&state, query) {
        Ok(response) => response,
        Err(err) => err.into_envelope(expose_details),
    };
    if let Some(grant) = grant {
        grant.apply(response.headers_mut());
    }
    response
}

fn report(
    state: &AppState,
    query: Result<Query<SheetsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let config = &state.config;
    let action = validation::sanitize_str(query.action.as_deref().unwrap_or("read"));

    let body = match Action::from_wire(&action) {
        Some(Action::Read) => {
            let tipo = validation::sanitize_str(query.tipo.as_deref().unwrap_or("logistica"));
            let tipo = RequestValidator::new(config).validate_tipo(&tipo)?;
            DiagnosticsResponse {
                ok: true,
                message: "✅ API is working correctly!".to_string(),
                action: Action::Read.as_str().to_string(),
                tipo: Some(tipo.as_str().to_string()),
                environment: config.environment.as_str().to_string(),
                api_key_configured: Some(config.api_key.is_some()),
                config: Some(DiagnosticsConfig {
                    spreadsheet_id_length: config.spreadsheet_id.len(),
                    credentials_file_exists: config.credentials_path.is_file(),
                    allowed_origins: config.allowed_origins.clone(),
                }),
            }
        }
        Some(Action::Write) => DiagnosticsResponse {
            ok: true,
            message: "✅ API write endpoint is working!".to_string(),
            action: Action::Write.as_str().to_string(),
            tipo: None,
            environment: config.environment.as_str().to_string(),
            api_key_configured: None,
            config: None,
        },
        None => {
            return Ok(json_response(
                StatusCode::BAD_REQUEST,
                &ErrorEnvelope::new("Invalid action"),
            ))
        }
    };
    Ok(json_response(StatusCode::OK, &body))
}
