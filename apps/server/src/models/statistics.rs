//! Descriptive statistics request/response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One cell of a tabular row.
///
/// Rows come from spreadsheets and model output, so a column may mix numbers,
/// numeric strings, free text and nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    /// Coerce the cell to a finite number, if it has one.
    ///
    /// Text is trimmed before parsing and blank text counts as 0, the way
    /// spreadsheet exports treat empty numeric cells. Unparsable text and
    /// non-finite results yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Some(0.0);
                }
                trimmed.parse::<f64>().ok()?
            }
            Self::Null => return None,
        };

        value.is_finite().then_some(value)
    }
}

/// A row: column name to cell.
pub type Row = HashMap<String, CellValue>;

/// Request body for `POST /platform/statistics`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRequest {
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,
    /// Columns to summarize, in output order. Must not be empty.
    pub numeric_columns: Vec<String>,
}

/// Summary of the numeric values found in one column.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub standard_deviation: f64,
}

/// Response body for `POST /platform/statistics`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub statistics: Vec<ColumnStatistics>,
    pub suggested_visuals: Vec<String>,
}
