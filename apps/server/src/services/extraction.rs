//! LLM-backed document extraction.
//!
//! Talks to any OpenAI-compatible chat-completions endpoint. Text extraction
//! uses a multimodal model fed with a presigned file URL; summaries and metric
//! extraction use a text model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LlmSettings;
use crate::error::{AppError, AppResult};
use crate::models::ExtractedMetric;
use crate::models::metric::{
    METRIC_NAME_MAX_CHARS, METRIC_UNIT_MAX_CHARS, METRIC_VALUE_MAX_CHARS, METRIC_YEAR_MAX_CHARS,
};

/// Extraction operations needed by the analysis pipeline.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extract the document's text from a fetchable URL.
    async fn extract_text(&self, file_url: &str, file_name: &str, mime_type: &str)
    -> AppResult<String>;

    /// Produce a short executive summary of extracted text.
    async fn summarize(&self, text: &str) -> AppResult<String>;

    /// Pull structured metrics out of extracted text.
    ///
    /// Model output that cannot be parsed yields an empty list, not an error.
    async fn extract_metrics(&self, text: &str) -> AppResult<Vec<ExtractedMetric>>;
}

const EXTRACT_TEXT_PROMPT: &str = "Please extract all text from this document. \
Preserve the structure and formatting as much as possible, including tables.";

const SUMMARY_PROMPT: &str = "You are a financial analyst. Please analyze the following \
financial document text and provide a concise executive summary (2-3 paragraphs) \
highlighting the key findings, financial performance, and important metrics.";

const METRICS_PROMPT: &str = "You are a financial data extraction expert. Extract all \
financial metrics from the following document text. Return a JSON array with objects \
containing: name, value, unit, year, and confidence (0-100).\n\n\
Focus on metrics like: Revenue, Net Income, Gross Profit, Operating Income, EBITDA, \
Profit Margin, ROE, ROA, Debt-to-Equity, Current Ratio, and any other KPIs mentioned.";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// OpenAI-compatible extraction client.
pub struct LlmExtractor {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    vision_model: String,
    text_model: String,
}

impl LlmExtractor {
    pub fn new(config: &LlmSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing LLM extractor: url={}, vision={}, text={}",
            config.base_url, config.vision_model, config.text_model
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            vision_model: config.vision_model.clone(),
            text_model: config.text_model.clone(),
        })
    }

    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        req
    }

    /// Run one chat completion and return the first choice's content.
    async fn complete(&self, model: &str, content: MessageContent) -> AppResult<String> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            temperature: Some(0.2),
        };

        debug!("Chat completion with model {}", model);

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Extraction(format!("LLM request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<OpenAIErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => "Unknown error".to_string(),
            };
            return Err(AppError::Extraction(format!(
                "LLM provider returned {}: {}",
                status, message
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Extraction(format!("Invalid LLM response: {}", e)))?;

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl DocumentExtractor for LlmExtractor {
    async fn extract_text(
        &self,
        file_url: &str,
        file_name: &str,
        mime_type: &str,
    ) -> AppResult<String> {
        let instruction = format!(
            "{}\n\nFile name: {}\nContent type: {}",
            EXTRACT_TEXT_PROMPT, file_name, mime_type
        );
        let content = MessageContent::Parts(vec![
            ContentPart::Text { text: instruction },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: file_url.to_string(),
                },
            },
        ]);

        let text = self.complete(&self.vision_model, content).await?;
        if text.trim().is_empty() {
            return Err(AppError::Extraction(format!(
                "No text could be extracted from {}",
                file_name
            )));
        }

        Ok(text)
    }

    async fn summarize(&self, text: &str) -> AppResult<String> {
        let prompt = format!("{}\n\nDocument Text:\n{}", SUMMARY_PROMPT, text);
        self.complete(&self.text_model, MessageContent::Text(prompt))
            .await
    }

    async fn extract_metrics(&self, text: &str) -> AppResult<Vec<ExtractedMetric>> {
        let prompt = format!(
            "{}\n\nDocument Text:\n{}\n\nReturn ONLY valid JSON array, no other text.",
            METRICS_PROMPT, text
        );
        let raw = self
            .complete(&self.text_model, MessageContent::Text(prompt))
            .await?;

        Ok(parse_metrics(&raw))
    }
}

// ============================================================================
// Metric parsing
// ============================================================================

/// Strip a surrounding markdown code fence (```json ... ```), if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line. A one-line
    // fence has no info string line, only the body.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Cut `s` to at most `max` characters, on a char boundary.
fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}

fn value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_confidence(value: &serde_json::Value) -> Option<u8> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then(|| n.round().clamp(0.0, 100.0) as u8)
}

/// Parse the model's metric output.
///
/// Accepts a bare JSON array or one wrapped in a code fence. Numeric values
/// are stringified, confidence is clamped to 0-100, and entries without a
/// name are dropped. Text fields are cut to the metric column widths.
/// Anything unparsable yields an empty list.
pub fn parse_metrics(raw: &str) -> Vec<ExtractedMetric> {
    let json = strip_code_fence(raw);

    let items: Vec<serde_json::Value> = match serde_json::from_str(json) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) | Err(_) => {
            warn!("Failed to parse metrics JSON, returning empty list");
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let text = |key: &str, max: usize| {
                obj.get(key)
                    .and_then(value_to_string)
                    .map(|s| truncate_chars(s, max))
            };
            Some(ExtractedMetric {
                name: text("name", METRIC_NAME_MAX_CHARS)?,
                value: text("value", METRIC_VALUE_MAX_CHARS),
                unit: text("unit", METRIC_UNIT_MAX_CHARS),
                year: text("year", METRIC_YEAR_MAX_CHARS),
                confidence: obj.get("confidence").and_then(value_to_confidence),
            })
        })
        .collect()
}
