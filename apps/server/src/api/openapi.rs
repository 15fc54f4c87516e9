//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::config::API_KEY_HEADER;
use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FinSight Server",
        version = "0.1.0",
        description = "Financial document intake, AI extraction and analytics API"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Document endpoints
        api::documents::upload_document,
        api::documents::list_documents,
        api::documents::get_document,
        api::documents::analyze_document,
        api::documents::delete_document,
        // Platform endpoints
        api::platform::get_capabilities,
        api::platform::get_providers,
        api::platform::compute_statistics,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Documents
            models::DocumentStatus,
            models::Document,
            models::UploadResponse,
            models::DocumentDetailResponse,
            models::DeleteDocumentResponse,
            models::AnalysisStatus,
            models::Analysis,
            models::AnalyzeResponse,
            models::ExtractedMetric,
            models::FinancialMetric,
            // Platform
            models::Capabilities,
            models::IngestionInfo,
            models::ProviderCategory,
            models::ProviderInfo,
            models::StatisticsRequest,
            models::ColumnStatistics,
            models::StatisticsResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Documents", description = "Document upload and analysis"),
        (name = "Platform", description = "Platform metadata and analytics helpers")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(API_KEY_HEADER),
                    ),
                ),
            );
        }
    }
}
