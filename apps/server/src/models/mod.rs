//! Domain models for FinSight.

pub mod analysis;
pub mod api_key;
pub mod document;
pub mod metric;
pub mod platform;
pub mod statistics;

// Re-export commonly used types
pub use analysis::{Analysis, AnalysisStatus, AnalyzeResponse};
pub use api_key::{ApiKey, AuthenticatedCaller, User};
pub use document::{
    ACCEPTED_MIME_TYPES, DEFAULT_MIME_TYPE, DeleteDocumentResponse, Document,
    DocumentDetailResponse, DocumentStatus, NewDocument, UploadRequest, UploadResponse,
};
pub use metric::{ExtractedMetric, FinancialMetric};
pub use platform::{Capabilities, IngestionInfo, ProviderCategory, ProviderInfo};
pub use statistics::{CellValue, ColumnStatistics, Row, StatisticsRequest, StatisticsResponse};
