//! Column derivation and text rendering for a step's row page.
//!
//! Payloads are heterogeneous: a flat object contributes one column per key,
//! anything else contributes the synthetic `payload` column holding the
//! serialised value. The column set is the union over the page, in first-seen
//! order after `row_id`.

use serde_json::Value;

use crate::models::{RowPage, RowRecord};

pub const ROW_ID_COLUMN: &str = "row_id";
pub const PAYLOAD_COLUMN: &str = "payload";
pub const NO_ROWS: &str = "No rows";

/// Body of a row table.
#[derive(Debug, Clone, PartialEq)]
pub enum RowTableBody {
    /// The page had no rows; render the single indicator row.
    Empty,
    Rows {
        columns: Vec<String>,
        cells: Vec<Vec<String>>,
    },
}

/// Render-ready table for one step's row page.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTable {
    pub step_name: String,
    pub header: String,
    pub body: RowTableBody,
}

impl RowTable {
    pub fn build(step_name: &str, page: &RowPage) -> Self {
        let header = format!(
            "{}: {} rows (showing {}, offset {})",
            step_name,
            page.total_rows,
            page.rows.len(),
            page.offset
        );

        let body = if page.rows.is_empty() {
            RowTableBody::Empty
        } else {
            let columns = derive_columns(&page.rows);
            let cells = page
                .rows
                .iter()
                .map(|row| columns.iter().map(|col| cell_text(row, col)).collect())
                .collect();
            RowTableBody::Rows { columns, cells }
        };

        Self {
            step_name: step_name.to_string(),
            header,
            body,
        }
    }

    pub fn columns(&self) -> &[String] {
        match &self.body {
            RowTableBody::Empty => &[],
            RowTableBody::Rows { columns, .. } => columns,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.body, RowTableBody::Empty)
    }

    /// Plain-text rendering with space-aligned columns.
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n", self.header);

        let (columns, cells) = match &self.body {
            RowTableBody::Empty => {
                out.push_str(NO_ROWS);
                out.push('\n');
                return out;
            }
            RowTableBody::Rows { columns, cells } => (columns, cells),
        };

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                cells
                    .iter()
                    .map(|row| row[idx].chars().count())
                    .chain(std::iter::once(col.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        out.push_str(&aligned_line(columns, &widths));
        out.push('\n');
        for row in cells {
            out.push_str(&aligned_line(row, &widths));
            out.push('\n');
        }
        out
    }
}

fn aligned_line(values: &[String], widths: &[usize]) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(value, &width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn flat_object(payload: &Value) -> Option<&serde_json::Map<String, Value>> {
    payload.as_object()
}

/// Union of columns across the page: `row_id` first, then object keys and
/// the synthetic `payload` column in first-seen order.
pub fn derive_columns(rows: &[RowRecord]) -> Vec<String> {
    let mut columns = vec![ROW_ID_COLUMN.to_string()];

    for row in rows {
        match flat_object(&row.payload) {
            Some(map) => {
                for key in map.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
            None => {
                if !columns.iter().any(|c| c == PAYLOAD_COLUMN) {
                    columns.push(PAYLOAD_COLUMN.to_string());
                }
            }
        }
    }

    columns
}

/// Display text for a scalar or nested JSON value.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// `row_id` and `payload` are reserved: they always show the record's id
/// and the whole serialised payload, even when a payload has a key of the
/// same name.
fn cell_text(row: &RowRecord, column: &str) -> String {
    match column {
        ROW_ID_COLUMN => value_text(&row.row_id),
        PAYLOAD_COLUMN => row.payload.to_string(),
        _ => flat_object(&row.payload)
            .and_then(|map| map.get(column))
            .map(value_text)
            .unwrap_or_default(),
    }
}
