//! Static platform metadata types.

use serde::Serialize;
use utoipa::ToSchema;

/// Document ingestion limits and accepted formats.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestionInfo {
    pub accepted_types: Vec<String>,
    pub recommended_single_upload_limit_mb: u64,
    pub scalable_batch_processing: String,
}

/// Response body for `GET /platform/capabilities`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub purpose: String,
    pub ingestion: IngestionInfo,
    pub exports: Vec<String>,
    pub visualization: Vec<String>,
}

/// Provider category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderCategory {
    Llm,
    Ocr,
    Analytics,
    Storage,
}

/// One entry of the provider catalog.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub category: ProviderCategory,
    pub best_for: Vec<String>,
    pub free_tier: String,
    pub strengths: Vec<String>,
    pub limitations: Vec<String>,
    pub docs_url: String,
}
