//! Background sweep that fails documents stuck in `processing`.
//!
//! An analyze call that dies mid-pipeline (process crash, deploy) leaves its
//! document in `processing` forever, which also blocks re-analysis.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::config::ReconcileSettings;
use crate::db::DocumentStore;
use crate::error::AppResult;
use crate::models::DocumentStatus;

/// Error recorded on documents failed by the sweep.
pub const TIMEOUT_MESSAGE: &str = "Processing timed out";

/// Start the reconcile background task. Does nothing when the interval is 0.
pub fn start_reconcile_task(store: Arc<dyn DocumentStore>, config: ReconcileSettings) {
    if config.interval_secs == 0 {
        info!("Processing reconciliation disabled");
        return;
    }

    tokio::spawn(async move {
        info!(
            "Starting reconcile service (timeout: {} seconds, interval: {} seconds)",
            config.processing_timeout_secs, config.interval_secs
        );

        let mut ticker = interval(Duration::from_secs(config.interval_secs));
        let stale_after = Duration::from_secs(config.processing_timeout_secs);

        loop {
            ticker.tick().await;

            if let Err(e) = run_reconcile(store.as_ref(), stale_after).await {
                error!("Reconcile task error: {}", e);
            }
        }
    });
}

/// Run a single reconcile cycle. Returns the number of documents failed.
pub async fn run_reconcile(store: &dyn DocumentStore, stale_after: Duration) -> AppResult<usize> {
    let stale_after = chrono::Duration::from_std(stale_after).unwrap_or(chrono::Duration::MAX);
    let cutoff = Utc::now()
        .checked_sub_signed(stale_after)
        .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);

    let stuck = store.stale_processing_documents(cutoff).await?;
    if stuck.is_empty() {
        return Ok(0);
    }

    info!("Found {} documents stuck in processing", stuck.len());

    let mut failed_count = 0;
    let mut error_count = 0;

    for document in stuck {
        if let Err(e) = store
            .fail_pending_analyses(document.id, TIMEOUT_MESSAGE.to_string())
            .await
        {
            warn!(
                "Failed to fail pending analyses for document {}: {}",
                document.id, e
            );
            error_count += 1;
            continue;
        }

        match store
            .finish_processing(
                document.id,
                DocumentStatus::Failed,
                Some(TIMEOUT_MESSAGE.to_string()),
            )
            .await
        {
            Ok(true) => failed_count += 1,
            // Finished between the query and the update
            Ok(false) => {}
            Err(e) => {
                warn!("Failed to mark document {} failed: {}", document.id, e);
                error_count += 1;
            }
        }
    }

    info!(
        "Processing reconcile: {} failed, {} errors",
        failed_count, error_count
    );

    Ok(failed_count)
}
