use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of a step's output rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowPage {
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default)]
    pub rows: Vec<RowRecord>,
}

/// A single row. `payload` is either a flat object or any other JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    #[serde(default)]
    pub row_id: Value,
    #[serde(default)]
    pub payload: Value,
}

impl RowRecord {
    pub fn new(row_id: impl Into<Value>, payload: Value) -> Self {
        Self {
            row_id: row_id.into(),
            payload,
        }
    }
}
