#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::Value;
use sheets_api::config::{Config, Environment};
use sheets_api::error::ApiError;
use sheets_api::sheets::memory::MemorySheets;
use sheets_api::sheets::{Action, SheetType, SpreadsheetService, ValueInputOption};
use sheets_api::validation::ValidationPolicy;
use sheets_api::AppState;

pub const ALLOWED_ORIGIN: &str = "https://bitacora.example";
pub const API_KEY: &str = "test-api-key";

/// A production-mode config with the referer check on and API keys off.
pub fn test_config() -> Config {
    Config {
        environment: Environment::Production,
        spreadsheet_id: "test-spreadsheet".into(),
        credentials_path: PathBuf::from("/nonexistent/google.json"),
        api_key: None,
        allowed_origins: vec![ALLOWED_ORIGIN.into()],
        policy: ValidationPolicy {
            require_api_key: false,
            require_referer_match: true,
        },
        sheet_types: vec![SheetType::Logistica, SheetType::Contactos],
        default_action: Action::Write,
        value_input_option: ValueInputOption::UserEntered,
        diagnostics_enabled: false,
        port: 0,
    }
}

pub fn dev_config() -> Config {
    Config {
        environment: Environment::Development,
        diagnostics_enabled: true,
        ..test_config()
    }
}

/// Config requiring `X-API-Key: API_KEY`.
pub fn keyed_config() -> Config {
    let mut config = test_config();
    config.api_key = Some(API_KEY.into());
    config.policy.require_api_key = true;
    config
}

/// Build a test server over `config` and an in-memory spreadsheet.
pub fn test_server_with(config: Config, sheets: MemorySheets) -> (TestServer, Arc<MemorySheets>) {
    let sheets = Arc::new(sheets);
    (test_server_backed(config, sheets.clone()), sheets)
}

/// Build a test server over an arbitrary spreadsheet backend.
pub fn test_server_backed(config: Config, sheets: Arc<dyn SpreadsheetService>) -> TestServer {
    let state = AppState {
        config: Arc::new(config),
        sheets,
    };
    TestServer::new(sheets_api::app(state)).unwrap()
}

pub const REMOTE_FAILURE: &str = "Spreadsheet service error: quota exceeded";

/// Backend whose every call fails as if Google rejected it.
pub struct FailingSheets;

#[async_trait]
impl SpreadsheetService for FailingSheets {
    async fn get_values(&self, _range: &str) -> Result<Vec<Vec<Value>>, ApiError> {
        Err(ApiError::internal(REMOTE_FAILURE))
    }

    async fn append_values(
        &self,
        _range: &str,
        _rows: &[Vec<String>],
        _input: ValueInputOption,
    ) -> Result<(), ApiError> {
        Err(ApiError::internal(REMOTE_FAILURE))
    }
}

pub fn test_server(config: Config) -> (TestServer, Arc<MemorySheets>) {
    test_server_with(config, MemorySheets::new())
}
