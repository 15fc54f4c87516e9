//! Document upload and analysis pipeline.
//!
//! `DocumentService` owns the document state machine:
//!
//! ```text
//! Document: pending -> processing -> completed | failed   (re-analyze: -> processing)
//! Analysis: pending -> completed | failed                 (one row per analyze call)
//! ```
//!
//! Each analyze call runs the stages sequentially inside the request. A failure
//! in any stage is recorded on both rows, notified to the owner, and surfaced to
//! the caller as a generic error. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::DocumentStore;
use crate::error::{AppError, AppResult};
use crate::models::{
    ACCEPTED_MIME_TYPES, AnalyzeResponse, AuthenticatedCaller, DEFAULT_MIME_TYPE,
    DeleteDocumentResponse, Document, DocumentDetailResponse, DocumentStatus, NewDocument,
    UploadRequest, UploadResponse,
};
use crate::services::extraction::DocumentExtractor;
use crate::services::notification::Notifier;
use crate::services::storage::{ObjectStore, Storage};

const MAX_FILE_NAME_LENGTH: usize = 255;

/// Keep client-facing errors, log and redact everything else.
fn internal(context: &'static str) -> impl FnOnce(AppError) -> AppError {
    move |e| {
        if e.is_client_facing() {
            e
        } else {
            error!("{}: {}", context, e);
            AppError::Internal(context.to_string())
        }
    }
}

/// Reject names that are empty, too long, or could escape the storage prefix.
pub fn validate_file_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidInput("File name is required".to_string()));
    }
    if name.len() > MAX_FILE_NAME_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "File name exceeds {} bytes",
            MAX_FILE_NAME_LENGTH
        )));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") || name.contains('\0') {
        return Err(AppError::InvalidInput(format!(
            "Invalid file name: {}",
            name
        )));
    }
    Ok(())
}

/// Resolve the declared MIME type (default PDF) and check it is accepted.
pub fn resolve_mime_type(declared: Option<&str>) -> AppResult<String> {
    let mime = declared
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_lowercase();

    if !ACCEPTED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(AppError::InvalidInput(format!(
            "Unsupported document type: {}",
            mime
        )));
    }
    Ok(mime)
}

/// Output of the extraction stages of one analyze call.
struct PipelineOutput {
    extracted_text: String,
    executive_summary: String,
    metrics: Vec<crate::models::ExtractedMetric>,
}

/// Document operations with injected collaborators.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStore>,
    extractor: Arc<dyn DocumentExtractor>,
    notifier: Arc<dyn Notifier>,
    presign_ttl: Duration,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStore>,
        extractor: Arc<dyn DocumentExtractor>,
        notifier: Arc<dyn Notifier>,
        presign_ttl: Duration,
    ) -> Self {
        Self {
            store,
            storage,
            extractor,
            notifier,
            presign_ttl,
        }
    }

    /// Store a document and record it as `pending`.
    ///
    /// All validation happens before anything is written.
    pub async fn upload(
        &self,
        caller: &AuthenticatedCaller,
        request: UploadRequest,
    ) -> AppResult<UploadResponse> {
        validate_file_name(&request.file_name)?;
        let mime_type = resolve_mime_type(request.mime_type.as_deref())?;
        if request.data.is_empty() {
            return Err(AppError::InvalidInput("File is empty".to_string()));
        }

        let file_key = Storage::document_key(caller.user_id, &request.file_name);
        let file_size = request.data.len() as i64;

        let file_url = self
            .storage
            .put(&file_key, request.data, &mime_type)
            .await
            .map_err(internal("Failed to upload document"))?;

        let document = self
            .store
            .insert_document(NewDocument {
                user_id: caller.user_id,
                file_name: request.file_name.clone(),
                file_key,
                file_url: file_url.clone(),
                file_size,
                mime_type,
            })
            .await
            .map_err(internal("Failed to upload document"))?;

        info!(
            "Document {} uploaded by {} ({} bytes)",
            document.id, caller.key_prefix, file_size
        );

        let notifier = Arc::clone(&self.notifier);
        let content = format!("User {} uploaded {}", caller.email, request.file_name);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_owner("New Document Uploaded", &content).await {
                warn!("Upload notification failed: {}", e);
            }
        });

        Ok(UploadResponse {
            success: true,
            document_id: document.id,
            file_url,
        })
    }

    /// The caller's documents, newest first.
    pub async fn list(&self, caller: &AuthenticatedCaller) -> AppResult<Vec<Document>> {
        self.store
            .list_documents(caller.user_id)
            .await
            .map_err(internal("Failed to fetch documents"))
    }

    /// A document with its most recent analysis and that analysis' metrics.
    pub async fn detail(
        &self,
        caller: &AuthenticatedCaller,
        document_id: Uuid,
    ) -> AppResult<DocumentDetailResponse> {
        let document = self.owned_document(caller, document_id).await?;

        let analysis = self
            .store
            .latest_analysis(document_id)
            .await
            .map_err(internal("Failed to fetch document details"))?;

        let metrics = match analysis {
            Some(ref a) => self
                .store
                .metrics_for_analysis(a.id)
                .await
                .map_err(internal("Failed to fetch document details"))?,
            None => Vec::new(),
        };

        Ok(DocumentDetailResponse {
            document,
            analysis,
            metrics,
        })
    }

    /// Run extraction, summarization and metric extraction on a document.
    pub async fn analyze(
        &self,
        caller: &AuthenticatedCaller,
        document_id: Uuid,
    ) -> AppResult<AnalyzeResponse> {
        let document = self.owned_document(caller, document_id).await?;

        let claimed = self
            .store
            .begin_processing(document.id)
            .await
            .map_err(internal("Failed to analyze document"))?;
        if !claimed {
            return Err(AppError::Conflict(format!(
                "Document {} is already being analyzed",
                document.id
            )));
        }

        let analysis = match self.store.insert_analysis(document.id, caller.user_id).await {
            Ok(a) => a,
            Err(e) => {
                let message = e.to_string();
                if let Err(status_err) = self
                    .store
                    .finish_processing(document.id, DocumentStatus::Failed, Some(message))
                    .await
                {
                    warn!(
                        "Failed to mark document {} failed: {}",
                        document.id, status_err
                    );
                }
                return Err(internal("Failed to analyze document")(e));
            }
        };

        info!("Analysis {} started for document {}", analysis.id, document.id);

        match self.run_pipeline(&document, analysis.id, caller.user_id).await {
            Ok(output) => {
                info!(
                    "Analysis {} completed with {} metrics",
                    analysis.id,
                    output.metrics.len()
                );
                Ok(AnalyzeResponse {
                    success: true,
                    analysis_id: analysis.id,
                    extracted_text: output.extracted_text,
                    executive_summary: output.executive_summary,
                    metrics: output.metrics,
                })
            }
            Err(e) => {
                self.record_failure(&document, analysis.id, &e).await;
                Err(AppError::Internal("Analysis failed".to_string()))
            }
        }
    }

    /// Validate ownership. Deletion itself is not supported yet, so nothing is removed.
    pub async fn delete(
        &self,
        caller: &AuthenticatedCaller,
        document_id: Uuid,
    ) -> AppResult<DeleteDocumentResponse> {
        let document = self.owned_document(caller, document_id).await?;

        info!("Delete requested for document {} (not performed)", document.id);

        Ok(DeleteDocumentResponse {
            success: true,
            deleted: false,
            message: "Document deletion is not supported yet; no data was removed".to_string(),
        })
    }

    async fn owned_document(
        &self,
        caller: &AuthenticatedCaller,
        document_id: Uuid,
    ) -> AppResult<Document> {
        self.store
            .find_document(document_id, caller.user_id)
            .await
            .map_err(internal("Failed to fetch document"))?
            .ok_or_else(|| AppError::NotFound("Document".to_string()))
    }

    /// Stages 4-8: presign, extract, summarize, extract metrics, persist.
    async fn run_pipeline(
        &self,
        document: &Document,
        analysis_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<PipelineOutput> {
        let url = self
            .storage
            .presigned_url(&document.file_key, self.presign_ttl)
            .await?;

        let extracted_text = self
            .extractor
            .extract_text(&url, &document.file_name, &document.mime_type)
            .await?;
        let executive_summary = self.extractor.summarize(&extracted_text).await?;
        let metrics = self.extractor.extract_metrics(&extracted_text).await?;

        let completed = self
            .store
            .complete_analysis(
                analysis_id,
                extracted_text.clone(),
                executive_summary.clone(),
            )
            .await?;
        if !completed {
            return Err(AppError::Conflict(format!(
                "Analysis {} was failed while running",
                analysis_id
            )));
        }
        self.store
            .insert_metrics(analysis_id, document.id, user_id, &metrics)
            .await?;
        let finished = self
            .store
            .finish_processing(document.id, DocumentStatus::Completed, None)
            .await?;
        if !finished {
            return Err(AppError::Conflict(format!(
                "Document {} is no longer processing",
                document.id
            )));
        }

        Ok(PipelineOutput {
            extracted_text,
            executive_summary,
            metrics,
        })
    }

    /// Persist a stage failure on both rows and notify the owner. Every step is best effort.
    async fn record_failure(&self, document: &Document, analysis_id: Uuid, err: &AppError) {
        let message = err.to_string();
        error!("Analysis {} failed: {}", analysis_id, message);

        if let Err(e) = self.store.fail_analysis(analysis_id, message.clone()).await {
            warn!("Failed to mark analysis {} failed: {}", analysis_id, e);
        }

        match self
            .store
            .finish_processing(document.id, DocumentStatus::Failed, Some(message.clone()))
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(
                "Document {} left processing before its failure was recorded",
                document.id
            ),
            Err(e) => warn!("Failed to mark document {} failed: {}", document.id, e),
        }

        let content = format!(
            "Analysis failed for document {}: {}",
            document.file_name, message
        );
        match self
            .notifier
            .notify_owner("Document Analysis Failed", &content)
            .await
        {
            Ok(_) => {}
            Err(e) => warn!("Failure notification for {} not sent: {}", document.id, e),
        }
    }
}
