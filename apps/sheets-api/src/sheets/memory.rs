use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::sheets::service::SpreadsheetService;
use crate::sheets::ValueInputOption;

/// One recorded `append_values` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendCall {
    pub range: String,
    pub rows: Vec<Vec<String>>,
    pub input: ValueInputOption,
}

// ---------------------------------------------------------------------------
// In-memory implementation (for development without credentials / tests)
// ---------------------------------------------------------------------------

/// Sheets held in memory, keyed by tab name. Range bounds are ignored: a
/// read returns every stored row of the tab.
#[derive(Default)]
pub struct MemorySheets {
    tabs: Mutex<HashMap<String, Vec<Vec<Value>>>>,
    appends: Mutex<Vec<AppendCall>>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tab with existing rows.
    pub fn with_tab(self, name: &str, rows: Vec<Vec<Value>>) -> Self {
        self.tabs.lock().unwrap().insert(name.to_string(), rows);
        self
    }

    /// Every append performed so far, in call order.
    pub fn appends(&self) -> Vec<AppendCall> {
        self.appends.lock().unwrap().clone()
    }
}

fn tab_of(range: &str) -> &str {
    range.split_once('!').map_or(range, |(tab, _)| tab)
}

#[async_trait]
impl SpreadsheetService for MemorySheets {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<Value>>, ApiError> {
        Ok(self
            .tabs
            .lock()
            .unwrap()
            .get(tab_of(range))
            .cloned()
            .unwrap_or_default())
    }

    async fn append_values(
        &self,
        range: &str,
        rows: &[Vec<String>],
        input: ValueInputOption,
    ) -> Result<(), ApiError> {
        self.tabs
            .lock()
            .unwrap()
            .entry(tab_of(range).to_string())
            .or_default()
            .extend(
                rows.iter()
                    .map(|row| row.iter().cloned().map(Value::String).collect()),
            );
        self.appends.lock().unwrap().push(AppendCall {
            range: range.to_string(),
            rows: rows.to_vec(),
            input,
        });
        Ok(())
    }
}
