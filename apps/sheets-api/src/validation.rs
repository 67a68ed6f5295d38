//! Request admission checks and input sanitization.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, HOST,
    ORIGIN, REFERER,
};
use axum::http::{HeaderMap, HeaderValue, Method};
use bitacora_common::text;
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::sheets::SheetType;

/// Upper bound on rows accepted by one write.
pub const MAX_ROWS: usize = 1000;

pub const API_KEY_HEADER: &str = "x-api-key";

const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const CORS_ALLOW_HEADERS: &str = "Content-Type, X-API-Key";

/// Which optional checks a deployment enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// `X-API-Key` must equal the configured key.
    pub require_api_key: bool,
    /// A present `Referer` must point at the request's own host.
    pub require_referer_match: bool,
}

/// Where a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    Http,
    /// Local invocation (CLI); trusted, no checks apply.
    Local,
}

/// The request metadata the validator looks at.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub source: RequestSource,
    pub method: Method,
    pub origin: Option<String>,
    pub referer: Option<String>,
    pub host: Option<String>,
    pub api_key: Option<String>,
}

impl RequestContext {
    pub fn local() -> Self {
        Self {
            source: RequestSource::Local,
            method: Method::GET,
            origin: None,
            referer: None,
            host: None,
            api_key: None,
        }
    }

    pub fn from_http(method: &Method, headers: &HeaderMap) -> Self {
        Self {
            source: RequestSource::Http,
            method: method.clone(),
            origin: header_value(headers, ORIGIN.as_str()),
            referer: header_value(headers, REFERER.as_str()),
            host: header_value(headers, HOST.as_str()),
            api_key: header_value(headers, API_KEY_HEADER),
        }
    }
}

fn header_value(headers: &HeaderMap, key: &str) -> Option<String> {
    let raw = headers.get(key)?.to_str().ok()?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(raw.to_string())
}

/// CORS response headers granted to an allowed cross-origin caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsGrant {
    pub origin: String,
}

impl CorsGrant {
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Ok(v) = HeaderValue::from_str(&self.origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, v);
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        );
    }
}

/// Guard clauses applied to every inbound request, driven by [`Config`].
pub struct RequestValidator<'a> {
    config: &'a Config,
}

impl<'a> RequestValidator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Admit or reject a request. On success returns the CORS grant to
    /// attach to the response, if any.
    ///
    /// Order: method, API key, CORS, referer.
    pub fn validate_request(&self, ctx: &RequestContext) -> Result<Option<CorsGrant>, ApiError> {
        if ctx.source == RequestSource::Local {
            return Ok(None);
        }

        // Development without a key: open, but still let allowed origins read.
        if self.config.is_development() && self.config.api_key.is_none() {
            return self.validate_cors(ctx.origin.as_deref());
        }

        if !matches!(ctx.method, Method::GET | Method::POST | Method::OPTIONS) {
            tracing::warn!(method = %ctx.method, "rejected request method");
            return Err(ApiError::method_not_allowed("Method not allowed"));
        }

        // Preflights never carry X-API-Key.
        if self.config.policy.require_api_key && ctx.method != Method::OPTIONS {
            let expected = self.config.api_key.as_deref();
            if expected.is_none() || ctx.api_key.as_deref() != expected {
                tracing::warn!(present = ctx.api_key.is_some(), "rejected API key");
                return Err(ApiError::unauthorized("Unauthorized"));
            }
        }

        let grant = self.validate_cors(ctx.origin.as_deref())?;

        if self.config.policy.require_referer_match {
            if let Some(referer) = ctx.referer.as_deref() {
                if !referer_matches_host(referer, ctx.host.as_deref()) {
                    tracing::warn!(%referer, host = ?ctx.host, "referer does not match host");
                    return Err(ApiError::forbidden("Invalid request origin"));
                }
            }
        }

        Ok(grant)
    }

    /// Check `origin` against the allow-list. No origin means same-origin.
    pub fn validate_cors(&self, origin: Option<&str>) -> Result<Option<CorsGrant>, ApiError> {
        let Some(origin) = origin.filter(|o| !o.is_empty()) else {
            return Ok(None);
        };

        let allowed = self
            .config
            .allowed_origins
            .iter()
            .map(|a| a.trim())
            .any(|a| a == "*" || a == origin);

        if allowed {
            return Ok(Some(CorsGrant {
                origin: origin.to_string(),
            }));
        }
        if self.config.is_development() {
            tracing::debug!(%origin, "origin not allowed, tolerated in development");
            return Ok(None);
        }
        tracing::warn!(%origin, "CORS policy violation");
        Err(ApiError::forbidden("CORS policy violation"))
    }

    /// Whitelist check for `tipo`. Exact and case-sensitive.
    pub fn validate_tipo(&self, tipo: &str) -> Result<SheetType, ApiError> {
        SheetType::from_wire(tipo)
            .filter(|t| self.config.sheet_types.contains(t))
            .ok_or_else(|| ApiError::bad_request("Invalid tipo parameter"))
    }
}

/// Host (and explicit port) of `referer` must equal the `Host` header.
fn referer_matches_host(referer: &str, host: Option<&str>) -> bool {
    let Ok(url) = reqwest::Url::parse(referer) else {
        return false;
    };
    let Some(referer_host) = url.host_str() else {
        return false;
    };
    let authority = match url.port() {
        Some(port) => format!("{referer_host}:{port}"),
        None => referer_host.to_string(),
    };
    host.is_some_and(|h| h.eq_ignore_ascii_case(&authority))
}

/// Shape checks for the `rows` payload of a write.
pub fn validate_rows(rows: &Value) -> Result<&[Value], ApiError> {
    let Some(rows) = rows.as_array() else {
        return Err(ApiError::bad_request("Rows must be an array"));
    };
    if rows.is_empty() {
        return Err(ApiError::bad_request("Rows cannot be empty"));
    }
    if rows.len() > MAX_ROWS {
        return Err(ApiError::bad_request(format!(
            "Too many rows (max {MAX_ROWS})"
        )));
    }
    Ok(rows)
}

/// How [`sanitize_input`] treats a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Trimmed and HTML-escaped text.
    String,
    /// Integer coercion; non-numeric input becomes `0`.
    Int,
    /// Passed through unchanged.
    Raw,
}

/// Sanitize one externally supplied scalar.
///
/// Arrays and objects are rejected for `String` and `Int`.
pub fn sanitize_input(value: &Value, kind: InputKind) -> Result<Value, ApiError> {
    match kind {
        InputKind::Raw => Ok(value.clone()),
        InputKind::String => {
            let raw = scalar_text(value)?;
            Ok(Value::String(text::sanitize_text(&raw)))
        }
        InputKind::Int => {
            let raw = scalar_text(value)?;
            Ok(Value::from(text::coerce_int(&raw)))
        }
    }
}

/// String form of a query parameter or JSON string field.
pub fn sanitize_str(value: &str) -> String {
    text::sanitize_text(value)
}

/// Sanitize a cell for transmission: always a string.
pub fn sanitize_cell(value: &Value) -> Result<String, ApiError> {
    Ok(text::sanitize_text(&scalar_text(value)?))
}

/// Text form of a JSON scalar: `true` is `"1"`, `false` and `null` are empty.
fn scalar_text(value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) | Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => {
            Err(ApiError::bad_request("Invalid input value: expected a scalar"))
        }
    }
}
