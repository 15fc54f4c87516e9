//! Financial metric models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Column widths of `financial_metrics`, in characters.
pub const METRIC_NAME_MAX_CHARS: usize = 255;
pub const METRIC_VALUE_MAX_CHARS: usize = 255;
pub const METRIC_UNIT_MAX_CHARS: usize = 64;
pub const METRIC_YEAR_MAX_CHARS: usize = 20;

/// A metric as returned by the extraction model, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetric {
    /// Metric name (e.g., "Revenue").
    pub name: String,
    /// Value kept as text; models return "10", "1.2B", "-3%" and so on.
    /// Absent when the model names a metric it could not quantify.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Model confidence, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}

/// A persisted metric row.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetric {
    pub id: Uuid,
    pub analysis_id: Uuid,
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub metric_name: String,
    pub metric_value: Option<String>,
    pub unit: Option<String>,
    pub year: Option<String>,
    pub confidence: Option<i16>,
    pub extracted_at: DateTime<Utc>,
}

impl From<crate::entity::financial_metric::Model> for FinancialMetric {
    fn from(m: crate::entity::financial_metric::Model) -> Self {
        Self {
            id: m.id,
            analysis_id: m.analysis_id,
            document_id: m.document_id,
            user_id: m.user_id,
            metric_name: m.metric_name,
            metric_value: m.metric_value,
            unit: m.unit,
            year: m.year,
            confidence: m.confidence,
            extracted_at: m.extracted_at,
        }
    }
}
