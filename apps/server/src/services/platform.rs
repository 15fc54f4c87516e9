//! Static platform metadata: capabilities and the provider catalog.

use crate::models::{
    ACCEPTED_MIME_TYPES, Capabilities, IngestionInfo, ProviderCategory, ProviderInfo,
};

const PURPOSE: &str = "FinSight AI is an AI-first financial intelligence workspace for \
document ingestion, extraction, KPI analytics, and automated executive insight generation.";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Capabilities advertised to clients. The upload limit reflects the running configuration.
pub fn capabilities(max_upload_size: usize) -> Capabilities {
    Capabilities {
        purpose: PURPOSE.to_string(),
        ingestion: IngestionInfo {
            accepted_types: strings(ACCEPTED_MIME_TYPES),
            recommended_single_upload_limit_mb: (max_upload_size / (1024 * 1024)) as u64,
            scalable_batch_processing:
                "Asynchronous queue-based processing supports multi-GB batches via chunked uploads."
                    .to_string(),
        },
        exports: strings(&["CSV", "JSON", "XLSX", "PDF report", "Python notebook template"]),
        visualization: strings(&[
            "trend lines",
            "cohort views",
            "profitability waterfall",
            "variance charts",
            "correlation heatmap",
        ]),
    }
}

#[allow(clippy::too_many_arguments)]
fn provider(
    id: &str,
    name: &str,
    category: ProviderCategory,
    best_for: &[&str],
    free_tier: &str,
    strengths: &[&str],
    limitations: &[&str],
    docs_url: &str,
) -> ProviderInfo {
    ProviderInfo {
        id: id.to_string(),
        name: name.to_string(),
        category,
        best_for: strings(best_for),
        free_tier: free_tier.to_string(),
        strengths: strings(strengths),
        limitations: strings(limitations),
        docs_url: docs_url.to_string(),
    }
}

/// Catalog of third-party AI, OCR and analytics providers.
pub fn providers() -> Vec<ProviderInfo> {
    vec![
        provider(
            "google-vertex-ai",
            "Google Vertex AI",
            ProviderCategory::Llm,
            &["Gemini multimodal", "enterprise governance", "RAG pipelines"],
            "Free trial credits and limited usage for selected models",
            &[
                "Great PDF/image understanding",
                "Strong GCP integration",
                "Managed vector/search options",
            ],
            &[
                "Region/model availability varies",
                "Complex IAM setup for beginners",
            ],
            "https://cloud.google.com/vertex-ai/docs",
        ),
        provider(
            "azure-openai",
            "Azure OpenAI",
            ProviderCategory::Llm,
            &["Enterprise compliance", "private networking", "Microsoft stack"],
            "Azure credits and occasional model-specific trials",
            &[
                "Security/compliance controls",
                "Regional deployments",
                "Strong B2B support",
            ],
            &[
                "Provisioning approvals can delay onboarding",
                "Quota management needed at scale",
            ],
            "https://learn.microsoft.com/azure/ai-services/openai/",
        ),
        provider(
            "aws-bedrock",
            "AWS Bedrock",
            ProviderCategory::Llm,
            &["Multi-model strategy", "AWS-native production systems"],
            "Limited free usage for select models in specific regions",
            &[
                "Model choice across providers",
                "Guardrails + agents",
                "Deep AWS ecosystem",
            ],
            &["Per-model API differences", "Regional restrictions"],
            "https://docs.aws.amazon.com/bedrock/",
        ),
        provider(
            "openai",
            "OpenAI API",
            ProviderCategory::Llm,
            &["Fast prototyping", "reasoning + multimodal", "tool calling"],
            "Credits vary by account/program",
            &[
                "Strong model quality",
                "Mature SDKs",
                "Good structured outputs",
            ],
            &["Cost management required at high volume"],
            "https://platform.openai.com/docs",
        ),
        provider(
            "google-document-ai",
            "Google Document AI",
            ProviderCategory::Ocr,
            &["Invoices", "receipts", "forms", "large OCR workloads"],
            "Free pages/month depending on processor",
            &[
                "High OCR quality",
                "Purpose-built parsers",
                "Scales to large docs",
            ],
            &["Processor setup/config required"],
            "https://cloud.google.com/document-ai/docs",
        ),
        provider(
            "aws-textract",
            "AWS Textract",
            ProviderCategory::Ocr,
            &["Form/table extraction", "asynchronous large jobs"],
            "Free tier pages for first months",
            &["Good structured extraction", "Works well with S3 pipelines"],
            &["Post-processing often needed for noisy scans"],
            "https://docs.aws.amazon.com/textract/",
        ),
        provider(
            "snowflake",
            "Snowflake",
            ProviderCategory::Analytics,
            &["BI workloads", "warehouse-scale analytics"],
            "Trial credits",
            &["Elastic compute", "Excellent SQL analytics", "Data sharing"],
            &["Can become expensive without governance"],
            "https://docs.snowflake.com/",
        ),
    ]
}
