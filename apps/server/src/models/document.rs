//! Document domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::analysis::Analysis;
use super::metric::FinancialMetric;

/// MIME type assumed when the client does not send one.
pub const DEFAULT_MIME_TYPE: &str = "application/pdf";

/// MIME types accepted for upload.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/tiff",
    "text/csv",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Document lifecycle status.
///
/// `pending -> processing -> completed | failed`; completed and failed
/// documents may go back to `processing` when re-analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Uploaded, never analyzed.
    Pending,
    /// An analysis is running.
    Processing,
    /// Last analysis succeeded.
    Completed,
    /// Last analysis failed.
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Uploaded document record.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    /// Object storage key (`documents/{userId}/{random}-{fileName}`).
    pub file_key: String,
    pub file_url: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::document::Model> for Document {
    fn from(m: crate::entity::document::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            file_name: m.file_name,
            file_key: m.file_key,
            file_url: m.file_url,
            file_size: m.file_size,
            mime_type: m.mime_type,
            // The CHECK constraint keeps this in range.
            status: DocumentStatus::parse(&m.status).unwrap_or(DocumentStatus::Failed),
            error_message: m.error_message,
            upload_date: m.upload_date,
            updated_at: m.updated_at,
        }
    }
}

/// Values needed to record a freshly stored document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_key: String,
    pub file_url: String,
    pub file_size: i64,
    pub mime_type: String,
}

/// Validated upload request, built by the HTTP layer from multipart fields.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
}

/// Response after a successful upload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub document_id: Uuid,
    pub file_url: String,
}

/// Document with its most recent analysis and that analysis' metrics.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetailResponse {
    pub document: Document,
    pub analysis: Option<Analysis>,
    pub metrics: Vec<FinancialMetric>,
}

/// Response of the (non-destructive) delete endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDocumentResponse {
    pub success: bool,
    pub deleted: bool,
    pub message: String,
}
