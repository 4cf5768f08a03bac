//! Services Layer
//!
//! Business logic called by whatever shell hosts the crate (desktop IPC
//! commands or a web frontend's request handlers). Services own the flow
//! control; all backend traffic goes through the `ResearchApi` adapter.
//!
//! # Architecture
//!
//! ```text
//! Frontend UI  --> shell commands ──┐
//!                                   ├──> Services --> ResearchApi --> backend
//! Web frontend --> HTTP handlers ───┘
//! ```
//!
//! # Services
//!
//! - `CompanyService` - Company registry, documents, reports listings
//! - `RefreshService` - Knowledge-base refresh jobs and status polling
//! - `UploadService` - Sequential upload and batch-analysis pipeline
//! - `ReportService` - Batch report generation and cleanup

pub mod company_service;
pub mod refresh_service;
pub mod report_service;
pub mod upload_service;

// Re-export commonly used types and services
pub use company_service::CompanyService;
pub use refresh_service::{RefreshOutcome, RefreshService};
pub use report_service::ReportService;
pub use upload_service::{AnalyzeOutcome, UploadRequest, UploadService};
