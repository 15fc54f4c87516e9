//! In-memory fakes for the `DocumentService` collaborators.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use finsight_lib::db::DocumentStore;
use finsight_lib::error::{AppError, AppResult};
use finsight_lib::models::metric::{
    METRIC_NAME_MAX_CHARS, METRIC_UNIT_MAX_CHARS, METRIC_VALUE_MAX_CHARS, METRIC_YEAR_MAX_CHARS,
};
use finsight_lib::models::{
    Analysis, AnalysisStatus, AuthenticatedCaller, Document, DocumentStatus, ExtractedMetric,
    FinancialMetric, NewDocument,
};
use finsight_lib::services::{DocumentExtractor, DocumentService, Notifier, ObjectStore};

pub fn caller(email: &str) -> AuthenticatedCaller {
    AuthenticatedCaller {
        user_id: Uuid::now_v7(),
        email: email.to_string(),
        key_name: "test".to_string(),
        key_prefix: "fsk_test".to_string(),
    }
}

#[derive(Default)]
struct Tables {
    documents: Vec<Document>,
    analyses: Vec<Analysis>,
    metrics: Vec<FinancialMetric>,
}

/// `DocumentStore` over vectors behind a mutex.
///
/// Metric inserts enforce the Postgres column widths so over-long model output
/// fails here the way it would against the real schema.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_metric_insert: AtomicBool,
}

fn too_long(field: Option<&str>, max: usize) -> bool {
    field.is_some_and(|f| f.chars().count() > max)
}

impl InMemoryStore {
    pub fn documents(&self) -> Vec<Document> {
        self.tables.lock().unwrap().documents.clone()
    }

    pub fn analyses(&self) -> Vec<Analysis> {
        self.tables.lock().unwrap().analyses.clone()
    }

    pub fn metrics(&self) -> Vec<FinancialMetric> {
        self.tables.lock().unwrap().metrics.clone()
    }

    pub fn document(&self, id: Uuid) -> Document {
        self.documents()
            .into_iter()
            .find(|d| d.id == id)
            .expect("document exists")
    }

    /// Make the next metric inserts fail with a database error.
    pub fn fail_metric_insert(&self, fail: bool) {
        self.fail_metric_insert.store(fail, Ordering::SeqCst);
    }

    /// Do what the reconciler does to a timed-out document, synchronously.
    pub fn expire(&self, id: Uuid, message: &str) {
        let mut tables = self.tables.lock().unwrap();
        for a in tables
            .analyses
            .iter_mut()
            .filter(|a| a.document_id == id && a.analysis_status == AnalysisStatus::Pending)
        {
            a.analysis_status = AnalysisStatus::Failed;
            a.error_message = Some(message.to_string());
        }
        if let Some(doc) = tables.documents.iter_mut().find(|d| d.id == id) {
            doc.status = DocumentStatus::Failed;
            doc.error_message = Some(message.to_string());
            doc.updated_at = Utc::now();
        }
    }

    /// Force a document's status and last-update time.
    pub fn set_state(&self, id: Uuid, status: DocumentStatus, updated_at: DateTime<Utc>) {
        let mut tables = self.tables.lock().unwrap();
        let doc = tables
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .expect("document exists");
        doc.status = status;
        doc.updated_at = updated_at;
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_document(&self, new: NewDocument) -> AppResult<Document> {
        let now = Utc::now();
        let doc = Document {
            id: Uuid::now_v7(),
            user_id: new.user_id,
            file_name: new.file_name,
            file_key: new.file_key,
            file_url: new.file_url,
            file_size: new.file_size,
            mime_type: new.mime_type,
            status: DocumentStatus::Pending,
            error_message: None,
            upload_date: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().documents.push(doc.clone());
        Ok(doc)
    }

    async fn list_documents(&self, user_id: Uuid) -> AppResult<Vec<Document>> {
        let mut docs: Vec<Document> = self
            .documents()
            .into_iter()
            .filter(|d| d.user_id == user_id)
            .collect();
        docs.sort_by(|a, b| b.upload_date.cmp(&a.upload_date).then(b.id.cmp(&a.id)));
        Ok(docs)
    }

    async fn find_document(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Document>> {
        Ok(self
            .documents()
            .into_iter()
            .find(|d| d.id == id && d.user_id == user_id))
    }

    async fn begin_processing(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let doc = tables
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::NotFound("Document".to_string()))?;
        if doc.status == DocumentStatus::Processing {
            return Ok(false);
        }
        doc.status = DocumentStatus::Processing;
        doc.error_message = None;
        doc.updated_at = Utc::now();
        Ok(true)
    }

    async fn finish_processing(
        &self,
        id: Uuid,
        status: DocumentStatus,
        error_message: Option<String>,
    ) -> AppResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        match tables
            .documents
            .iter_mut()
            .find(|d| d.id == id && d.status == DocumentStatus::Processing)
        {
            Some(doc) => {
                doc.status = status;
                doc.error_message = error_message;
                doc.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_analysis(&self, document_id: Uuid, user_id: Uuid) -> AppResult<Analysis> {
        let analysis = Analysis {
            id: Uuid::now_v7(),
            document_id,
            user_id,
            extracted_text: None,
            executive_summary: None,
            analysis_status: AnalysisStatus::Pending,
            error_message: None,
            analyzed_at: None,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().analyses.push(analysis.clone());
        Ok(analysis)
    }

    async fn complete_analysis(
        &self,
        id: Uuid,
        extracted_text: String,
        executive_summary: String,
    ) -> AppResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        match tables
            .analyses
            .iter_mut()
            .find(|a| a.id == id && a.analysis_status == AnalysisStatus::Pending)
        {
            Some(a) => {
                a.extracted_text = Some(extracted_text);
                a.executive_summary = Some(executive_summary);
                a.analysis_status = AnalysisStatus::Completed;
                a.analyzed_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn fail_analysis(&self, id: Uuid, error_message: String) -> AppResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(a) = tables
            .analyses
            .iter_mut()
            .find(|a| a.id == id && a.analysis_status != AnalysisStatus::Failed)
        {
            a.analysis_status = AnalysisStatus::Failed;
            a.error_message = Some(error_message);
        }
        Ok(())
    }

    async fn latest_analysis(&self, document_id: Uuid) -> AppResult<Option<Analysis>> {
        // UUIDv7 ids sort by creation
        Ok(self
            .analyses()
            .into_iter()
            .filter(|a| a.document_id == document_id)
            .max_by_key(|a| a.id))
    }

    async fn insert_metrics(
        &self,
        analysis_id: Uuid,
        document_id: Uuid,
        user_id: Uuid,
        metrics: &[ExtractedMetric],
    ) -> AppResult<Vec<FinancialMetric>> {
        if self.fail_metric_insert.load(Ordering::SeqCst) {
            return Err(AppError::Database("metric insert rejected".to_string()));
        }
        for m in metrics {
            if too_long(Some(&m.name), METRIC_NAME_MAX_CHARS)
                || too_long(m.value.as_deref(), METRIC_VALUE_MAX_CHARS)
                || too_long(m.unit.as_deref(), METRIC_UNIT_MAX_CHARS)
                || too_long(m.year.as_deref(), METRIC_YEAR_MAX_CHARS)
            {
                return Err(AppError::Database(format!(
                    "value too long for metric {}",
                    m.name
                )));
            }
        }

        let rows: Vec<FinancialMetric> = metrics
            .iter()
            .map(|m| FinancialMetric {
                id: Uuid::now_v7(),
                analysis_id,
                document_id,
                user_id,
                metric_name: m.name.clone(),
                metric_value: m.value.clone(),
                unit: m.unit.clone(),
                year: m.year.clone(),
                confidence: m.confidence.map(i16::from),
                extracted_at: Utc::now(),
            })
            .collect();
        self.tables.lock().unwrap().metrics.extend(rows.clone());
        Ok(rows)
    }

    async fn metrics_for_analysis(&self, analysis_id: Uuid) -> AppResult<Vec<FinancialMetric>> {
        Ok(self
            .metrics()
            .into_iter()
            .filter(|m| m.analysis_id == analysis_id)
            .collect())
    }

    async fn stale_processing_documents(
        &self,
        older_than: DateTime<Utc>,
    ) -> AppResult<Vec<Document>> {
        Ok(self
            .documents()
            .into_iter()
            .filter(|d| d.status == DocumentStatus::Processing && d.updated_at < older_than)
            .collect())
    }

    async fn fail_pending_analyses(
        &self,
        document_id: Uuid,
        error_message: String,
    ) -> AppResult<u64> {
        let mut tables = self.tables.lock().unwrap();
        let mut touched = 0;
        for a in tables
            .analyses
            .iter_mut()
            .filter(|a| a.document_id == document_id && a.analysis_status == AnalysisStatus::Pending)
        {
            a.analysis_status = AnalysisStatus::Failed;
            a.error_message = Some(error_message.clone());
            touched += 1;
        }
        Ok(touched)
    }
}

/// Object store that records puts and hands out fake URLs.
#[derive(Default)]
pub struct FakeObjectStore {
    pub puts: Mutex<Vec<(String, usize, String)>>,
    pub fail_presign: AtomicBool,
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<String> {
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), data.len(), content_type.to_string()));
        Ok(format!("https://files.test/{}", key))
    }

    async fn presigned_url(&self, key: &str, _expires_in: Duration) -> AppResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(AppError::Storage("presign rejected".to_string()));
        }
        Ok(format!("https://files.test/{}?signed=1", key))
    }
}

/// Pipeline stage a `Harness` can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Presign,
    Extract,
    Summarize,
    Metrics,
    StoreMetrics,
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// Extractor with canned output and an optional failing stage.
pub struct FakeExtractor {
    pub text: String,
    pub summary: String,
    pub metrics: Mutex<Vec<ExtractedMetric>>,
    pub fail_at: Mutex<Option<Stage>>,
    pub calls: AtomicUsize,
    on_summarize: Mutex<Option<Hook>>,
}

impl Default for FakeExtractor {
    fn default() -> Self {
        Self {
            text: "Revenue 2023: $10M".to_string(),
            summary: "Revenue reached $10M in 2023.".to_string(),
            metrics: Mutex::new(vec![ExtractedMetric {
                name: "Revenue".to_string(),
                value: Some("10".to_string()),
                unit: Some("M USD".to_string()),
                year: Some("2023".to_string()),
                confidence: Some(90),
            }]),
            fail_at: Mutex::new(None),
            calls: AtomicUsize::new(0),
            on_summarize: Mutex::new(None),
        }
    }
}

impl FakeExtractor {
    pub fn fail_at(&self, stage: Option<Stage>) {
        *self.fail_at.lock().unwrap() = stage;
    }

    pub fn set_metrics(&self, metrics: Vec<ExtractedMetric>) {
        *self.metrics.lock().unwrap() = metrics;
    }

    /// Run `hook` while the summary stage is in flight.
    pub fn on_summarize(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_summarize.lock().unwrap() = Some(Box::new(hook));
    }

    fn check(&self, stage: Stage) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_at.lock().unwrap() == Some(stage) {
            return Err(AppError::Extraction(format!("{:?} stage unavailable", stage)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentExtractor for FakeExtractor {
    async fn extract_text(
        &self,
        _file_url: &str,
        _file_name: &str,
        _mime_type: &str,
    ) -> AppResult<String> {
        self.check(Stage::Extract)?;
        Ok(self.text.clone())
    }

    async fn summarize(&self, _text: &str) -> AppResult<String> {
        self.check(Stage::Summarize)?;
        if let Some(hook) = self.on_summarize.lock().unwrap().as_ref() {
            hook();
        }
        Ok(self.summary.clone())
    }

    async fn extract_metrics(&self, _text: &str) -> AppResult<Vec<ExtractedMetric>> {
        self.check(Stage::Metrics)?;
        Ok(self.metrics.lock().unwrap().clone())
    }
}

/// Notifier that records every message.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_owner(&self, title: &str, content: &str) -> AppResult<bool> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), content.to_string()));
        Ok(true)
    }
}

/// A service wired to fresh fakes, with handles to inspect them.
pub struct Harness {
    pub service: DocumentService,
    pub store: Arc<InMemoryStore>,
    pub storage: Arc<FakeObjectStore>,
    pub extractor: Arc<FakeExtractor>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::default());
        let storage = Arc::new(FakeObjectStore::default());
        let extractor = Arc::new(FakeExtractor::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let service = DocumentService::new(
            store.clone(),
            storage.clone(),
            extractor.clone(),
            notifier.clone(),
            Duration::from_secs(900),
        );

        Self {
            service,
            store,
            storage,
            extractor,
            notifier,
        }
    }

    /// Fail `stage` on the collaborator that owns it, clearing every other stage.
    pub fn fail_at(&self, stage: Option<Stage>) {
        self.storage
            .fail_presign
            .store(stage == Some(Stage::Presign), Ordering::SeqCst);
        self.store.fail_metric_insert(stage == Some(Stage::StoreMetrics));
        self.extractor.fail_at(stage);
    }
}

/// Let spawned notification tasks run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
