//! Analyze pipeline: success path, stage failures, ownership and concurrency.

use chrono::Utc;
use uuid::Uuid;

use finsight_lib::error::AppError;
use finsight_lib::models::{AnalysisStatus, AuthenticatedCaller, DocumentStatus, UploadRequest};
use finsight_lib::services::extraction::parse_metrics;
use finsight_lib::services::reconcile::TIMEOUT_MESSAGE;

use crate::support::{Harness, Stage, caller, settle};

async fn upload_report(harness: &Harness, owner: &AuthenticatedCaller) -> Uuid {
    harness
        .service
        .upload(
            owner,
            UploadRequest {
                file_name: "report.pdf".to_string(),
                data: b"%PDF-1.7 revenue".to_vec(),
                mime_type: None,
            },
        )
        .await
        .unwrap()
        .document_id
}

#[tokio::test]
async fn test_analyze_report_end_to_end() {
    let harness = Harness::new();
    let owner = caller("analyst@example.com");
    let document_id = upload_report(&harness, &owner).await;

    let response = harness.service.analyze(&owner, document_id).await.unwrap();

    assert!(response.success);
    assert_eq!(response.extracted_text, "Revenue 2023: $10M");
    assert_eq!(response.executive_summary, "Revenue reached $10M in 2023.");
    assert_eq!(response.metrics.len(), 1);
    assert_eq!(response.metrics[0].name, "Revenue");

    let document = harness.store.document(document_id);
    assert_eq!(document.status, DocumentStatus::Completed);
    assert!(document.error_message.is_none());

    let analyses = harness.store.analyses();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].id, response.analysis_id);
    assert_eq!(analyses[0].analysis_status, AnalysisStatus::Completed);
    assert!(analyses[0].analyzed_at.is_some());

    let metrics = harness.store.metrics();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].metric_name, "Revenue");
    assert_eq!(metrics[0].metric_value.as_deref(), Some("10"));
    assert_eq!(metrics[0].unit.as_deref(), Some("M USD"));
    assert_eq!(metrics[0].year.as_deref(), Some("2023"));
    assert_eq!(metrics[0].confidence, Some(90));
    assert_eq!(metrics[0].user_id, owner.user_id);

    let detail = harness.service.detail(&owner, document_id).await.unwrap();
    assert_eq!(detail.document.status, DocumentStatus::Completed);
    assert_eq!(
        detail.analysis.map(|a| a.id),
        Some(response.analysis_id)
    );
    assert_eq!(detail.metrics.len(), 1);
}

#[tokio::test]
async fn test_stage_failures_are_recorded_and_notified() {
    for stage in [
        Stage::Presign,
        Stage::Extract,
        Stage::Summarize,
        Stage::Metrics,
        Stage::StoreMetrics,
    ] {
        let harness = Harness::new();
        let owner = caller("analyst@example.com");
        let document_id = upload_report(&harness, &owner).await;
        settle().await;

        harness.fail_at(Some(stage));
        let err = harness
            .service
            .analyze(&owner, document_id)
            .await
            .unwrap_err();

        match err {
            AppError::Internal(msg) => assert_eq!(msg, "Analysis failed"),
            other => panic!("{:?}: expected internal error, got {:?}", stage, other),
        }

        let document = harness.store.document(document_id);
        assert_eq!(document.status, DocumentStatus::Failed, "{:?}", stage);
        assert!(document.error_message.is_some(), "{:?}", stage);

        let analyses = harness.store.analyses();
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].analysis_status, AnalysisStatus::Failed, "{:?}", stage);
        assert_eq!(
            analyses[0].error_message, document.error_message,
            "{:?}: both rows carry the same error",
            stage
        );
        if stage != Stage::StoreMetrics {
            assert!(analyses[0].executive_summary.is_none(), "{:?}", stage);
        }
        assert!(harness.store.metrics().is_empty(), "{:?}", stage);

        settle().await;
        let titles = harness.notifier.titles();
        assert_eq!(
            titles
                .iter()
                .filter(|t| t.as_str() == "Document Analysis Failed")
                .count(),
            1,
            "{:?}",
            stage
        );
        assert_eq!(
            titles,
            vec!["New Document Uploaded", "Document Analysis Failed"],
            "{:?}",
            stage
        );
    }
}

#[tokio::test]
async fn test_over_long_model_fields_are_stored_cut_to_width() {
    let harness = Harness::new();
    let owner = caller("analyst@example.com");
    let document_id = upload_report(&harness, &owner).await;

    let long_name = "Operating income attributable to shareholders ".repeat(8);
    let raw = format!(
        r#"[{{"name": "{}", "value": "1,204", "unit": "{}", "year": "FY2023 (ending 30 June 2023)"}},
            {{"name": "Guidance", "unit": "M USD"}}]"#,
        long_name,
        "u".repeat(100)
    );
    harness.extractor.set_metrics(parse_metrics(&raw));

    let response = harness.service.analyze(&owner, document_id).await.unwrap();
    assert_eq!(response.metrics.len(), 2);

    assert_eq!(
        harness.store.document(document_id).status,
        DocumentStatus::Completed
    );
    let metrics = harness.store.metrics();
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].metric_name.chars().count(), 255);
    assert_eq!(metrics[0].metric_value.as_deref(), Some("1,204"));
    assert_eq!(metrics[0].unit.as_deref().map(|u| u.len()), Some(64));
    assert_eq!(metrics[0].year.as_deref(), Some("FY2023 (ending 30 Ju"));
    assert_eq!(metrics[1].metric_name, "Guidance");
    assert!(metrics[1].metric_value.is_none());
}

#[tokio::test]
async fn test_timeout_sweep_during_run_is_not_overwritten() {
    let harness = Harness::new();
    let owner = caller("analyst@example.com");
    let document_id = upload_report(&harness, &owner).await;

    let store = harness.store.clone();
    harness
        .extractor
        .on_summarize(move || store.expire(document_id, TIMEOUT_MESSAGE));

    let err = harness
        .service
        .analyze(&owner, document_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    let document = harness.store.document(document_id);
    assert_eq!(document.status, DocumentStatus::Failed);
    assert_eq!(document.error_message.as_deref(), Some(TIMEOUT_MESSAGE));

    let analyses = harness.store.analyses();
    assert_eq!(analyses.len(), 1);
    assert_eq!(analyses[0].analysis_status, AnalysisStatus::Failed);
    assert_eq!(analyses[0].error_message.as_deref(), Some(TIMEOUT_MESSAGE));
    assert!(analyses[0].executive_summary.is_none());
    assert!(harness.store.metrics().is_empty());
}

#[tokio::test]
async fn test_reanalysis_after_failure_returns_latest() {
    let harness = Harness::new();
    let owner = caller("analyst@example.com");
    let document_id = upload_report(&harness, &owner).await;

    harness.fail_at(Some(Stage::Summarize));
    assert!(harness.service.analyze(&owner, document_id).await.is_err());

    harness.fail_at(None);
    let response = harness.service.analyze(&owner, document_id).await.unwrap();

    let document = harness.store.document(document_id);
    assert_eq!(document.status, DocumentStatus::Completed);
    assert!(document.error_message.is_none());
    assert_eq!(harness.store.analyses().len(), 2);

    let detail = harness.service.detail(&owner, document_id).await.unwrap();
    let latest = detail.analysis.expect("latest analysis");
    assert_eq!(latest.id, response.analysis_id);
    assert_eq!(latest.analysis_status, AnalysisStatus::Completed);
    assert_eq!(detail.metrics.len(), 1);
    assert!(detail.metrics.iter().all(|m| m.analysis_id == latest.id));
}

#[tokio::test]
async fn test_foreign_document_is_not_found() {
    let harness = Harness::new();
    let owner = caller("owner@example.com");
    let stranger = caller("stranger@example.com");
    let document_id = upload_report(&harness, &owner).await;

    let err = harness
        .service
        .analyze(&stranger, document_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert!(matches!(
        harness.service.detail(&stranger, document_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        harness.service.delete(&stranger, document_id).await,
        Err(AppError::NotFound(_))
    ));

    assert!(harness.store.analyses().is_empty());
    assert_eq!(
        harness.store.document(document_id).status,
        DocumentStatus::Pending
    );
    assert_eq!(
        harness
            .extractor
            .calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_unknown_document_is_not_found() {
    let harness = Harness::new();
    let owner = caller("owner@example.com");

    assert!(matches!(
        harness.service.analyze(&owner, Uuid::now_v7()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_analyze_while_processing_conflicts() {
    let harness = Harness::new();
    let owner = caller("analyst@example.com");
    let document_id = upload_report(&harness, &owner).await;

    harness
        .store
        .set_state(document_id, DocumentStatus::Processing, Utc::now());

    let err = harness
        .service
        .analyze(&owner, document_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(harness.store.analyses().is_empty());
    assert_eq!(
        harness.store.document(document_id).status,
        DocumentStatus::Processing
    );
}

#[tokio::test]
async fn test_delete_is_acknowledged_without_removing() {
    let harness = Harness::new();
    let owner = caller("analyst@example.com");
    let document_id = upload_report(&harness, &owner).await;

    let response = harness.service.delete(&owner, document_id).await.unwrap();
    assert!(response.success);
    assert!(!response.deleted);
    assert_eq!(harness.store.documents().len(), 1);
}

#[tokio::test]
async fn test_detail_before_analysis_has_no_analysis() {
    let harness = Harness::new();
    let owner = caller("analyst@example.com");
    let document_id = upload_report(&harness, &owner).await;

    let detail = harness.service.detail(&owner, document_id).await.unwrap();
    assert_eq!(detail.document.status, DocumentStatus::Pending);
    assert!(detail.analysis.is_none());
    assert!(detail.metrics.is_empty());
}
