//! `/sheets`: read a sheet range or append rows.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorEnvelope};
use crate::response::json_response;
use crate::sheets::{self, Reply, SheetsRequest};
use crate::validation::{RequestContext, RequestValidator};
use crate::AppState;

pub fn router() -> Router<AppState> {
    // Every method is routed here so the validator can answer 405 itself.
    Router::new().route("/sheets", any(sheets))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SheetsQuery {
    /// `read` or `write`; the deployment picks the default.
    pub action: Option<String>,
    /// Sheet to read: `logistica`, `contactos` or `usuarios` where enabled.
    pub tipo: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadResponse {
    pub ok: bool,
    /// Row-major cell values; empty when the range holds nothing.
    #[schema(value_type = Vec<Vec<Object>>)]
    pub data: Vec<Vec<Value>>,
}

/// Body of a write. Cells may be strings, numbers, booleans or null.
#[derive(Debug, ToSchema)]
pub struct WriteRequest {
    pub tipo: String,
    #[schema(value_type = Vec<Vec<Object>>)]
    pub rows: Vec<Vec<Value>>,
    /// Only `append` is supported.
    pub action: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WriteResponse {
    pub ok: bool,
}

// ---------------------------------------------------------------------------
// GET|POST|OPTIONS /sheets
// ---------------------------------------------------------------------------

#[utoipa::path(
    method(get, post, options),
    path = "/sheets",
    tag = "Sheets",
    security((), ("api_key" = [])),
    params(SheetsQuery),
    request_body(content = WriteRequest, description = "Rows to append (write only)"),
    responses(
        (status = 200, description = "Read data or write acknowledgement", body = ReadResponse),
        (status = 204, description = "CORS preflight"),
        (status = 400, description = "Invalid action, tipo, rows or JSON", body = ErrorEnvelope),
        (status = 401, description = "Missing or wrong API key", body = ErrorEnvelope),
        (status = 403, description = "CORS or referer violation", body = ErrorEnvelope),
        (status = 405, description = "Method not allowed", body = ErrorEnvelope),
        (status = 500, description = "Spreadsheet failure", body = ErrorEnvelope),
    ),
)]
pub async fn sheets(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    query: Result<Query<SheetsQuery>, QueryRejection>,
    body: Bytes,
) -> Response {
    let expose_details = state.config.is_development();
    let ctx = RequestContext::from_http(&method, &headers);

    let grant = match RequestValidator::new(&state.config).validate_request(&ctx) {
        Ok(grant) => grant,
        Err(err) => return err.into_envelope(expose_details),
    };

    let mut response = match respond(&state, &method, query, &body).await {
        Ok(response) => response,
        Err(err) => err.into_envelope(expose_details),
    };

    if let Some(grant) = grant {
        grant.apply(response.headers_mut());
    }
    response
}

async fn respond(
    state: &AppState,
    method: &Method,
    query: Result<Query<SheetsQuery>, QueryRejection>,
    body: &[u8],
) -> Result<Response, ApiError> {
    if *method == Method::OPTIONS {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let req = SheetsRequest {
        action: query.action.as_deref(),
        tipo: query.tipo.as_deref(),
        body,
    };

    let reply = sheets::dispatch(&state.config, state.sheets.as_ref(), &req).await?;
    Ok(match reply {
        Reply::Read(data) => json_response(StatusCode::OK, &ReadResponse { ok: true, data }),
        Reply::Written { .. } => json_response(StatusCode::OK, &WriteResponse { ok: true }),
        Reply::InvalidAction => json_response(
            StatusCode::BAD_REQUEST,
            &ErrorEnvelope::new("Invalid action"),
        ),
    })
}
