//! Upload Service
//!
//! The upload/analyze pipeline: documents are uploaded strictly one at a
//! time to bound backend load, each with its own status entry, and the
//! successfully uploaded set can then be grouped into a batch and submitted
//! for analysis.

use crate::api::types::{CreateBatch, DocumentUpload};
use crate::error::{AppError, Result};
use crate::state::{AppState, PendingUpload, UploadState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

/// One file handed to the pipeline by the shell
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub document_type: String,
    pub description: Option<String>,
}

/// Result of a batch-analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutcome {
    pub batch_id: String,
    pub analyzed: usize,
    /// Per-document failures, concatenated for inline display. The affected
    /// entries stay in the pending list.
    pub failure_summary: Option<String>,
}

/// Upload pipeline service
pub struct UploadService;

impl UploadService {
    /// Queue the given files and upload them sequentially.
    ///
    /// Each file gets its own entry: `in_progress` while its request is in
    /// flight, then `succeeded` with the backend document record or
    /// `failed` with the error message. A failed upload never aborts the
    /// remaining files, and upload N+1 is not issued until upload N's
    /// response has landed. Returns the entry ids in queue order.
    pub async fn queue_and_upload(
        state: &AppState,
        ticker: &str,
        requests: Vec<UploadRequest>,
    ) -> Result<Vec<Uuid>> {
        info!(
            "UploadService::queue_and_upload - {} file(s) for {}",
            requests.len(),
            ticker
        );

        let mut queued = Vec::with_capacity(requests.len());
        for request in &requests {
            let id = state.push_pending_upload(PendingUpload {
                id: Uuid::new_v4(),
                file_name: request.file_name.clone(),
                document_type: request.document_type.clone(),
                description: request.description.clone(),
                status: UploadState::Queued,
            });
            queued.push(id);
        }

        for (id, request) in queued.iter().zip(requests) {
            Self::upload_one(state, ticker, *id, request).await;
        }

        Ok(queued)
    }

    /// Retry one failed upload.
    ///
    /// Removes exactly the failed entry and re-enters the upload stage for
    /// that single file, producing exactly one new request. Entries that are
    /// queued, in flight, or already succeeded cannot be retried.
    pub async fn retry_upload(
        state: &AppState,
        ticker: &str,
        entry_id: Uuid,
        bytes: Vec<u8>,
    ) -> Result<Uuid> {
        info!("UploadService::retry_upload - {}", entry_id);

        let previous = state
            .pending_uploads_snapshot()
            .into_iter()
            .find(|entry| entry.id == entry_id)
            .ok_or_else(|| AppError::NotFound(format!("Upload entry {}", entry_id)))?;

        if !previous.status.is_failed() {
            return Err(AppError::Validation(format!(
                "Upload {} is not in a failed state",
                previous.file_name
            )));
        }

        state.remove_pending_upload(entry_id);

        let request = UploadRequest {
            file_name: previous.file_name,
            bytes,
            document_type: previous.document_type,
            description: previous.description,
        };

        let id = state.push_pending_upload(PendingUpload {
            id: Uuid::new_v4(),
            file_name: request.file_name.clone(),
            document_type: request.document_type.clone(),
            description: request.description.clone(),
            status: UploadState::Queued,
        });

        Self::upload_one(state, ticker, id, request).await;

        Ok(id)
    }

    /// Group every successfully uploaded document into a batch and submit
    /// it for analysis.
    ///
    /// With zero successful uploads this fails up front and performs no
    /// network call. Analyzed documents are moved into the analysis results
    /// and their entries leave the pending list; failed documents stay
    /// pending and are reported in the failure summary. If nothing at all
    /// was analyzed the call fails and no entries are cleared.
    ///
    /// Not idempotent: every invocation creates a fresh batch record on the
    /// backend, even for the same set of uploads.
    pub async fn analyze_uploaded(state: &AppState) -> Result<AnalyzeOutcome> {
        let upload_ids = state.successful_upload_ids();

        if upload_ids.is_empty() {
            return Err(AppError::Validation(
                "No successfully uploaded documents to analyze".to_string(),
            ));
        }

        let file_names: Vec<String> = state
            .pending_uploads_snapshot()
            .into_iter()
            .filter(|entry| entry.status.is_succeeded())
            .map(|entry| entry.file_name)
            .collect();

        let now = Utc::now();
        let batch = state
            .api
            .create_batch(CreateBatch {
                upload_ids: upload_ids.clone(),
                name: batch_name(now),
                description: batch_description(&file_names),
            })
            .await?;

        info!(
            "UploadService::analyze_uploaded - batch {} with {} document(s)",
            batch.batch_id,
            upload_ids.len()
        );

        let analysis = state.api.analyze_batch(&batch.batch_id).await?;

        let failure_summary = if analysis.failed.is_empty() {
            None
        } else {
            let joined = analysis
                .failed
                .iter()
                .map(|f| format!("{}: {}", f.upload_id, f.message))
                .collect::<Vec<_>>()
                .join("; ");
            warn!("Batch {} partial failure - {}", batch.batch_id, joined);
            Some(joined)
        };

        if analysis.analyzed.is_empty() {
            let message = failure_summary
                .unwrap_or_else(|| "No documents were analyzed".to_string());
            error!("Batch {} produced no analyses", batch.batch_id);
            return Err(AppError::Analysis(message));
        }

        let consumed: Vec<String> = analysis
            .analyzed
            .iter()
            .map(|a| a.upload_id.clone())
            .collect();
        let analyzed = analysis.analyzed.len();

        state.add_analysis_results(analysis.analyzed);
        state.remove_consumed_uploads(&consumed);

        Ok(AnalyzeOutcome {
            batch_id: analysis.batch_id,
            analyzed,
            failure_summary,
        })
    }

    /// Run the upload stage for one entry, recording the outcome in state
    async fn upload_one(state: &AppState, ticker: &str, id: Uuid, request: UploadRequest) {
        state.set_upload_state(id, UploadState::InProgress);

        let upload = DocumentUpload {
            file_name: request.file_name.clone(),
            bytes: request.bytes,
            document_type: request.document_type,
            description: request.description,
        };

        match state.api.upload_document(ticker, upload).await {
            Ok(document) => {
                info!("Uploaded {} as {}", request.file_name, document.upload_id);
                state.set_upload_state(id, UploadState::Succeeded(document));
            }
            Err(e) => {
                error!("Upload of {} failed: {}", request.file_name, e);
                state.set_upload_state(id, UploadState::Failed(e.to_string()));
            }
        }
    }
}

/// Batch name derived from the submission date
fn batch_name(at: DateTime<Utc>) -> String {
    format!("Upload batch {}", at.format("%Y-%m-%d"))
}

/// Batch description derived from the grouped file names
fn batch_description(file_names: &[String]) -> String {
    format!("Documents: {}", file_names.join(", "))
}
