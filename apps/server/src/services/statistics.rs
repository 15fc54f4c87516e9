//! Descriptive statistics over tabular rows.

use crate::error::{AppError, AppResult};
use crate::models::{ColumnStatistics, Row, StatisticsRequest, StatisticsResponse};

const SUGGESTED_VISUALS: &[&str] = &[
    "Line chart for period-over-period performance",
    "Bar chart for metric comparison",
    "Box plot for outlier detection",
];

/// Compute count/min/max/mean/median/sample standard deviation.
///
/// An empty input yields all zeros. Standard deviation is 0 for fewer than
/// two values.
pub fn calculate_stats(column: &str, values: &[f64]) -> ColumnStatistics {
    let count = values.len();
    if count == 0 {
        return ColumnStatistics {
            column: column.to_string(),
            count: 0,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            median: 0.0,
            standard_deviation: 0.0,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = values.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };
    let variance = if count > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64
    } else {
        0.0
    };

    ColumnStatistics {
        column: column.to_string(),
        count,
        min: sorted[0],
        max: sorted[count - 1],
        mean,
        median,
        standard_deviation: variance.sqrt(),
    }
}

/// Numeric values of one column across all rows; missing and non-numeric cells are skipped.
pub fn column_values(rows: &[Row], column: &str) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| row.get(column).and_then(|cell| cell.as_number()))
        .collect()
}

/// Summarize each requested column, in request order.
pub fn generate_statistics(request: &StatisticsRequest) -> AppResult<StatisticsResponse> {
    if request.numeric_columns.is_empty() {
        return Err(AppError::InvalidInput(
            "numericColumns must contain at least one column".to_string(),
        ));
    }

    let statistics = request
        .numeric_columns
        .iter()
        .map(|column| calculate_stats(column, &column_values(&request.rows, column)))
        .collect();

    Ok(StatisticsResponse {
        statistics,
        suggested_visuals: SUGGESTED_VISUALS.iter().map(|s| s.to_string()).collect(),
    })
}
