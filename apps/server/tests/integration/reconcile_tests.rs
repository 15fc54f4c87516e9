//! Reconcile sweep over documents stuck in `processing`.

use std::time::Duration;

use chrono::Utc;

use finsight_lib::db::DocumentStore;
use finsight_lib::models::{AnalysisStatus, DocumentStatus, UploadRequest};
use finsight_lib::services::reconcile::{TIMEOUT_MESSAGE, run_reconcile};

use crate::support::{Harness, caller};

#[tokio::test]
async fn test_stale_processing_documents_are_failed() {
    let harness = Harness::new();
    let owner = caller("analyst@example.com");

    let mut ids = Vec::new();
    for name in ["stale.pdf", "fresh.pdf", "done.pdf"] {
        let response = harness
            .service
            .upload(
                &owner,
                UploadRequest {
                    file_name: name.to_string(),
                    data: b"%PDF".to_vec(),
                    mime_type: None,
                },
            )
            .await
            .unwrap();
        ids.push(response.document_id);
    }
    let (stale, fresh, done) = (ids[0], ids[1], ids[2]);

    let an_hour_ago = Utc::now() - chrono::Duration::hours(1);
    harness
        .store
        .set_state(stale, DocumentStatus::Processing, an_hour_ago);
    harness
        .store
        .set_state(fresh, DocumentStatus::Processing, Utc::now());
    harness
        .store
        .set_state(done, DocumentStatus::Completed, an_hour_ago);
    let pending = harness
        .store
        .insert_analysis(stale, owner.user_id)
        .await
        .unwrap();

    let failed = run_reconcile(harness.store.as_ref(), Duration::from_secs(1800))
        .await
        .unwrap();
    assert_eq!(failed, 1);

    let stale_doc = harness.store.document(stale);
    assert_eq!(stale_doc.status, DocumentStatus::Failed);
    assert_eq!(stale_doc.error_message.as_deref(), Some(TIMEOUT_MESSAGE));

    let analysis = harness
        .store
        .analyses()
        .into_iter()
        .find(|a| a.id == pending.id)
        .unwrap();
    assert_eq!(analysis.analysis_status, AnalysisStatus::Failed);
    assert_eq!(analysis.error_message.as_deref(), Some(TIMEOUT_MESSAGE));

    assert_eq!(
        harness.store.document(fresh).status,
        DocumentStatus::Processing
    );
    assert_eq!(harness.store.document(done).status, DocumentStatus::Completed);
}

#[tokio::test]
async fn test_failed_document_can_be_reanalyzed() {
    let harness = Harness::new();
    let owner = caller("analyst@example.com");
    let document_id = harness
        .service
        .upload(
            &owner,
            UploadRequest {
                file_name: "stuck.pdf".to_string(),
                data: b"%PDF".to_vec(),
                mime_type: None,
            },
        )
        .await
        .unwrap()
        .document_id;

    harness.store.set_state(
        document_id,
        DocumentStatus::Processing,
        Utc::now() - chrono::Duration::hours(2),
    );
    run_reconcile(harness.store.as_ref(), Duration::from_secs(60))
        .await
        .unwrap();

    harness.service.analyze(&owner, document_id).await.unwrap();
    assert_eq!(
        harness.store.document(document_id).status,
        DocumentStatus::Completed
    );
}

#[tokio::test]
async fn test_nothing_to_reconcile() {
    let harness = Harness::new();
    let failed = run_reconcile(harness.store.as_ref(), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(failed, 0);
}
