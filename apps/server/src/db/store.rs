//! Persistence seam used by the document pipeline.
//!
//! `DbPool` implements it against PostgreSQL; integration tests substitute an
//! in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DbPool;
use crate::error::AppResult;
use crate::models::{
    Analysis, Document, DocumentStatus, ExtractedMetric, FinancialMetric, NewDocument,
};

/// Document, analysis and metric persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Record a newly stored document with status `pending`.
    async fn insert_document(&self, new: NewDocument) -> AppResult<Document>;

    /// All documents owned by `user_id`, newest first.
    async fn list_documents(&self, user_id: Uuid) -> AppResult<Vec<Document>>;

    /// A document, only if it is owned by `user_id`.
    async fn find_document(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Document>>;

    /// Move a document to `processing` unless it is already there, clearing any
    /// previous error. Returns `false` when another analysis holds it.
    async fn begin_processing(&self, id: Uuid) -> AppResult<bool>;

    /// Move a `processing` document to `status`. Returns `false`, changing
    /// nothing, when the document is not in `processing`.
    async fn finish_processing(
        &self,
        id: Uuid,
        status: DocumentStatus,
        error_message: Option<String>,
    ) -> AppResult<bool>;

    /// Create a `pending` analysis row.
    async fn insert_analysis(&self, document_id: Uuid, user_id: Uuid) -> AppResult<Analysis>;

    /// Store results on a `pending` analysis and complete it. Returns `false`
    /// when the analysis is no longer pending.
    async fn complete_analysis(
        &self,
        id: Uuid,
        extracted_text: String,
        executive_summary: String,
    ) -> AppResult<bool>;

    /// Fail an analysis unless it already failed.
    async fn fail_analysis(&self, id: Uuid, error_message: String) -> AppResult<()>;

    /// Most recently created analysis of a document.
    async fn latest_analysis(&self, document_id: Uuid) -> AppResult<Option<Analysis>>;

    /// Insert one metric row per extracted metric.
    async fn insert_metrics(
        &self,
        analysis_id: Uuid,
        document_id: Uuid,
        user_id: Uuid,
        metrics: &[ExtractedMetric],
    ) -> AppResult<Vec<FinancialMetric>>;

    async fn metrics_for_analysis(&self, analysis_id: Uuid) -> AppResult<Vec<FinancialMetric>>;

    /// Documents in `processing` whose last update is older than `older_than`.
    async fn stale_processing_documents(
        &self,
        older_than: DateTime<Utc>,
    ) -> AppResult<Vec<Document>>;

    /// Fail every still-pending analysis of a document. Returns the number of rows touched.
    async fn fail_pending_analyses(&self, document_id: Uuid, error_message: String)
    -> AppResult<u64>;
}

#[async_trait]
impl DocumentStore for DbPool {
    async fn insert_document(&self, new: NewDocument) -> AppResult<Document> {
        DbPool::insert_document(self, new).await
    }

    async fn list_documents(&self, user_id: Uuid) -> AppResult<Vec<Document>> {
        self.get_documents_by_user(user_id).await
    }

    async fn find_document(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Document>> {
        self.get_document_for_user(id, user_id).await
    }

    async fn begin_processing(&self, id: Uuid) -> AppResult<bool> {
        self.mark_document_processing(id).await
    }

    async fn finish_processing(
        &self,
        id: Uuid,
        status: DocumentStatus,
        error_message: Option<String>,
    ) -> AppResult<bool> {
        self.finish_document_processing(id, status, error_message)
            .await
    }

    async fn insert_analysis(&self, document_id: Uuid, user_id: Uuid) -> AppResult<Analysis> {
        DbPool::insert_analysis(self, document_id, user_id).await
    }

    async fn complete_analysis(
        &self,
        id: Uuid,
        extracted_text: String,
        executive_summary: String,
    ) -> AppResult<bool> {
        DbPool::complete_analysis(self, id, extracted_text, executive_summary).await
    }

    async fn fail_analysis(&self, id: Uuid, error_message: String) -> AppResult<()> {
        DbPool::fail_analysis(self, id, error_message).await
    }

    async fn latest_analysis(&self, document_id: Uuid) -> AppResult<Option<Analysis>> {
        self.get_latest_analysis(document_id).await
    }

    async fn insert_metrics(
        &self,
        analysis_id: Uuid,
        document_id: Uuid,
        user_id: Uuid,
        metrics: &[ExtractedMetric],
    ) -> AppResult<Vec<FinancialMetric>> {
        DbPool::insert_metrics(self, analysis_id, document_id, user_id, metrics).await
    }

    async fn metrics_for_analysis(&self, analysis_id: Uuid) -> AppResult<Vec<FinancialMetric>> {
        self.get_metrics_by_analysis(analysis_id).await
    }

    async fn stale_processing_documents(
        &self,
        older_than: DateTime<Utc>,
    ) -> AppResult<Vec<Document>> {
        self.get_stale_processing_documents(older_than).await
    }

    async fn fail_pending_analyses(
        &self,
        document_id: Uuid,
        error_message: String,
    ) -> AppResult<u64> {
        DbPool::fail_pending_analyses(self, document_id, error_message).await
    }
}
