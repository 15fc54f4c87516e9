//! Analysis domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::metric::ExtractedMetric;

/// Analysis status. A fresh row starts `pending` and ends in either terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result record of one analyze run.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub extracted_text: Option<String>,
    pub executive_summary: Option<String>,
    pub analysis_status: AnalysisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::analysis::Model> for Analysis {
    fn from(m: crate::entity::analysis::Model) -> Self {
        Self {
            id: m.id,
            document_id: m.document_id,
            user_id: m.user_id,
            extracted_text: m.extracted_text,
            executive_summary: m.executive_summary,
            analysis_status: AnalysisStatus::parse(&m.analysis_status)
                .unwrap_or(AnalysisStatus::Failed),
            error_message: m.error_message,
            analyzed_at: m.analyzed_at,
            created_at: m.created_at,
        }
    }
}

/// Response of a successful analyze call.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis_id: Uuid,
    pub extracted_text: String,
    pub executive_summary: String,
    pub metrics: Vec<ExtractedMetric>,
}
