use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::sheets::ValueInputOption;

/// Abstraction over the remote spreadsheet: read a range, append rows.
///
/// Backed by the Google Sheets REST API in production and an in-memory
/// map in tests.
#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    /// Values in an A1 range, row-major. Empty when the range holds nothing.
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<Value>>, ApiError>;

    /// Appends `rows` after the table anchored at `range`, always inserting
    /// new rows.
    async fn append_values(
        &self,
        range: &str,
        rows: &[Vec<String>],
        input: ValueInputOption,
    ) -> Result<(), ApiError>;
}
