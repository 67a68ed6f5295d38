//! Binds one already-admitted request to one spreadsheet operation.
//!
//! Shared by the HTTP endpoint and the local CLI.

use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::sheets::service::SpreadsheetService;
use crate::sheets::Action;
use crate::validation::{self, InputKind, RequestValidator};

/// The only write mode supported by the body's `action` field.
const WRITE_APPEND: &str = "append";

/// Transport-independent view of a sheets request.
#[derive(Debug, Default)]
pub struct SheetsRequest<'a> {
    /// Raw `action` query parameter.
    pub action: Option<&'a str>,
    /// Raw `tipo` query parameter (reads).
    pub tipo: Option<&'a str>,
    /// Raw request body (writes).
    pub body: &'a [u8],
}

#[derive(Debug, PartialEq)]
pub enum Reply {
    /// Cell values of the requested range.
    Read(Vec<Vec<Value>>),
    /// Rows appended.
    Written { rows: usize },
    /// `action` was neither `read` nor `write`.
    InvalidAction,
}

pub async fn dispatch(
    config: &Config,
    sheets: &dyn SpreadsheetService,
    req: &SheetsRequest<'_>,
) -> Result<Reply, ApiError> {
    let action = validation::sanitize_str(req.action.unwrap_or(config.default_action.as_str()));

    match Action::from_wire(&action) {
        Some(Action::Read) => read(config, sheets, req.tipo).await,
        Some(Action::Write) => write(config, sheets, req.body).await,
        None => {
            tracing::warn!(%action, "unknown action");
            Ok(Reply::InvalidAction)
        }
    }
}

async fn read(
    config: &Config,
    sheets: &dyn SpreadsheetService,
    tipo: Option<&str>,
) -> Result<Reply, ApiError> {
    let tipo = validation::sanitize_str(tipo.unwrap_or_default());
    let tipo = RequestValidator::new(config).validate_tipo(&tipo)?;

    let values = sheets.get_values(&tipo.read_range()).await?;
    tracing::info!(%tipo, rows = values.len(), "read sheet");
    Ok(Reply::Read(values))
}

async fn write(
    config: &Config,
    sheets: &dyn SpreadsheetService,
    body: &[u8],
) -> Result<Reply, ApiError> {
    let input: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid JSON input"))?;
    if !(input.is_object() || input.is_array()) {
        return Err(ApiError::bad_request("Invalid JSON input"));
    }

    let empty = Value::Array(Vec::new());
    let tipo = text_field(&input, "tipo", "")?;
    let rows = present(&input, "rows").unwrap_or(&empty);
    let write_action = text_field(&input, "action", WRITE_APPEND)?;

    let tipo = RequestValidator::new(config).validate_tipo(&tipo)?;
    let rows = validation::validate_rows(rows)?;
    if write_action != WRITE_APPEND {
        return Err(ApiError::bad_request("Invalid write action"));
    }

    let sanitized = rows
        .iter()
        .enumerate()
        .map(|(i, row)| sanitize_row(i, row))
        .collect::<Result<Vec<_>, _>>()?;

    sheets
        .append_values(&tipo.append_range(), &sanitized, config.value_input_option)
        .await?;
    tracing::info!(%tipo, rows = sanitized.len(), "appended rows");
    Ok(Reply::Written {
        rows: sanitized.len(),
    })
}

/// `input[name]` unless missing or `null`.
fn present<'v>(input: &'v Value, name: &str) -> Option<&'v Value> {
    input.get(name).filter(|v| !v.is_null())
}

/// Sanitized string form of `input[name]`, or `default` when absent.
fn text_field(input: &Value, name: &str, default: &str) -> Result<String, ApiError> {
    let raw = match present(input, name) {
        Some(v) => validation::sanitize_input(v, InputKind::String)?,
        None => return Ok(validation::sanitize_str(default)),
    };
    Ok(raw.as_str().unwrap_or_default().to_string())
}

fn sanitize_row(index: usize, row: &Value) -> Result<Vec<String>, ApiError> {
    match row {
        Value::Array(cells) => cells.iter().map(validation::sanitize_cell).collect(),
        Value::Object(map) => map.values().map(validation::sanitize_cell).collect(),
        _ => Err(ApiError::bad_request(format!("Row {index} must be an array"))),
    }
}
