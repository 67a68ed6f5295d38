pub mod dispatch;
pub mod google;
pub mod memory;
pub mod service;
pub mod types;

pub use dispatch::{dispatch, Reply, SheetsRequest};
pub use service::SpreadsheetService;
pub use types::{Action, SheetType, ValueInputOption};

use std::sync::Arc;

use crate::config::Config;
use crate::error::ApiError;

/// Build the spreadsheet backend for `config`.
///
/// Uses the Google API when the credentials file exists. Development
/// deployments without credentials fall back to an in-memory spreadsheet.
pub fn connect(config: &Config) -> Result<Arc<dyn SpreadsheetService>, ApiError> {
    if config.credentials_path.is_file() {
        let client = google::GoogleSheetsClient::from_credentials_file(
            &config.spreadsheet_id,
            &config.credentials_path,
            config.is_development(),
        )?;
        tracing::info!(credentials = %config.credentials_path.display(), "using Google Sheets backend");
        return Ok(Arc::new(client));
    }

    if config.is_development() {
        tracing::warn!(
            credentials = %config.credentials_path.display(),
            "credentials file missing, using in-memory spreadsheet"
        );
        return Ok(Arc::new(memory::MemorySheets::new()));
    }

    Err(ApiError::internal(format!(
        "Credentials file not found: {}",
        config.credentials_path.display()
    )))
}
