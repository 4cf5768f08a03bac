//! Common backend API types
//!
//! Status fields are closed enums rather than free-form strings so that
//! terminal-state checks stay exhaustive under `match`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Knowledge-base status of a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KbStatus {
    Active,
    Processing,
    Error,
    Inactive,
}

/// Company as tracked by the backend registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub ticker: String,
    pub name: String,
    pub kb_status: KbStatus,
    pub report_count: u32,
    pub chunk_count: u64,
    pub last_refreshed: Option<DateTime<Utc>>,
}

/// Lifecycle status of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    AnalysisReady,
    AnalysisApproved,
    ReportGenerated,
    Error,
}

/// Document record owned by the backend store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub upload_id: String,
    pub file_name: String,
    pub document_type: String,
    pub status: DocumentStatus,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Status of a document batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Created,
    Analyzing,
    Analyzed,
    ReportGenerated,
}

/// A named grouping of uploads submitted together for analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: String,
    pub name: String,
    pub description: String,
    pub upload_ids: Vec<String>,
    pub status: BatchStatus,
}

/// Status of an asynchronous backend job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Starting,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether the job has finished, successfully or not.
    /// Polling must stop after the first terminal status observed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Outcome of refreshing one company within a refresh job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRefreshResult {
    pub ticker: String,
    pub success: bool,
    pub message: Option<String>,
}

/// Knowledge-base refresh job status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshJob {
    pub job_id: String,
    pub status: JobStatus,
    pub current: u32,
    pub total: u32,
    pub current_company: Option<String>,
    #[serde(default)]
    pub results: Vec<CompanyRefreshResult>,
    pub error: Option<String>,
}

/// Acknowledgement returned when a job is started
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStarted {
    pub job_id: String,
}

/// Payload for uploading a single document
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub document_type: String,
    pub description: Option<String>,
}

/// Request to group uploads into a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatch {
    pub upload_ids: Vec<String>,
    pub name: String,
    pub description: String,
}

/// Analysis of a single document within a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub upload_id: String,
    pub file_name: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub sentiment: Option<String>,
}

/// A document the backend could not analyze
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub upload_id: String,
    pub message: String,
}

/// Result of analyzing a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub batch_id: String,
    #[serde(default)]
    pub analyzed: Vec<DocumentAnalysis>,
    #[serde(default)]
    pub failed: Vec<AnalysisFailure>,
}

/// Generated report for a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,
    pub batch_id: String,
    pub title: String,
    pub content: String,
    pub generated_at: DateTime<Utc>,
}

/// Envelope every backend response is wrapped in
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}
