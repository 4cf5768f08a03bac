//! Application state management
//!
//! In-memory view state shared by the services layer. The backend stays the
//! source of record; everything here is rebuilt from responses and the last
//! response wins.

use crate::api::types::{Company, Document, DocumentAnalysis};
use crate::api::{HttpResearchApi, ResearchApi};
use crate::config::AppConfig;
use crate::error::Result;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Client-side status of one queued upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    Queued,
    InProgress,
    Succeeded(Document),
    Failed(String),
}

impl UploadState {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, UploadState::Succeeded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UploadState::Failed(_))
    }
}

/// One entry in the pending-upload list
#[derive(Debug, Clone, Serialize)]
pub struct PendingUpload {
    pub id: Uuid,
    pub file_name: String,
    pub document_type: String,
    pub description: Option<String>,
    pub status: UploadState,
}

/// Progress of the refresh job currently being tracked
#[derive(Debug, Clone, Serialize)]
pub struct RefreshProgress {
    pub job_id: String,
    pub current: u32,
    pub total: u32,
    pub current_company: Option<String>,
}

/// Application state shared across all service calls
pub struct AppState {
    /// Backend API handle
    pub api: Arc<dyn ResearchApi>,

    /// Loaded configuration
    pub config: AppConfig,

    /// Company cache (ticker -> company)
    pub company_cache: DashMap<String, Company>,

    /// Uploads queued or completed in the current session
    pub pending_uploads: RwLock<Vec<PendingUpload>>,

    /// Analysis results from the most recent batch runs
    pub analysis_results: RwLock<Vec<DocumentAnalysis>>,

    /// Progress of the refresh job being tracked, if any
    pub refresh_progress: RwLock<Option<RefreshProgress>>,
}

impl AppState {
    /// Create application state backed by the live HTTP backend
    pub fn new(config: AppConfig) -> Result<Self> {
        let api = Arc::new(HttpResearchApi::new(&config)?);
        Ok(Self::with_api(api, config))
    }

    /// Create application state over an arbitrary backend implementation
    pub fn with_api(api: Arc<dyn ResearchApi>, config: AppConfig) -> Self {
        Self {
            api,
            config,
            company_cache: DashMap::new(),
            pending_uploads: RwLock::new(Vec::new()),
            analysis_results: RwLock::new(Vec::new()),
            refresh_progress: RwLock::new(None),
        }
    }

    /// Replace the company cache with a fresh listing
    pub fn load_company_cache(&self, companies: Vec<Company>) {
        self.company_cache.clear();

        for company in companies {
            self.company_cache.insert(company.ticker.clone(), company);
        }

        tracing::info!("Loaded {} companies into cache", self.company_cache.len());
    }

    /// Get a cached company by ticker
    pub fn get_cached_company(&self, ticker: &str) -> Option<Company> {
        self.company_cache.get(ticker).map(|r| r.clone())
    }

    /// Number of cached companies
    pub fn company_count(&self) -> usize {
        self.company_cache.len()
    }

    /// Append an upload entry and return its client-side id
    pub fn push_pending_upload(&self, entry: PendingUpload) -> Uuid {
        let id = entry.id;
        self.pending_uploads.write().push(entry);
        id
    }

    /// Update the status of one upload entry
    pub fn set_upload_state(&self, id: Uuid, status: UploadState) {
        let mut uploads = self.pending_uploads.write();
        if let Some(entry) = uploads.iter_mut().find(|e| e.id == id) {
            entry.status = status;
        }
    }

    /// Remove one upload entry, returning it if present
    pub fn remove_pending_upload(&self, id: Uuid) -> Option<PendingUpload> {
        let mut uploads = self.pending_uploads.write();
        let index = uploads.iter().position(|e| e.id == id)?;
        Some(uploads.remove(index))
    }

    /// Remove every entry whose upload id is in the given set
    pub fn remove_consumed_uploads(&self, upload_ids: &[String]) {
        let mut uploads = self.pending_uploads.write();
        uploads.retain(|entry| match &entry.status {
            UploadState::Succeeded(document) => !upload_ids.contains(&document.upload_id),
            _ => true,
        });
    }

    /// Snapshot of the pending-upload list
    pub fn pending_uploads_snapshot(&self) -> Vec<PendingUpload> {
        self.pending_uploads.read().clone()
    }

    /// Backend upload ids of all entries that uploaded successfully
    pub fn successful_upload_ids(&self) -> Vec<String> {
        self.pending_uploads
            .read()
            .iter()
            .filter_map(|entry| match &entry.status {
                UploadState::Succeeded(document) => Some(document.upload_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Store analysis results for display
    pub fn add_analysis_results(&self, results: Vec<DocumentAnalysis>) {
        self.analysis_results.write().extend(results);
    }

    /// Snapshot of stored analysis results
    pub fn analysis_results_snapshot(&self) -> Vec<DocumentAnalysis> {
        self.analysis_results.read().clone()
    }

    /// Set or update refresh progress
    pub fn set_refresh_progress(&self, progress: RefreshProgress) {
        *self.refresh_progress.write() = Some(progress);
    }

    /// Clear refresh progress once the job is done
    pub fn clear_refresh_progress(&self) {
        *self.refresh_progress.write() = None;
    }

    /// Current refresh progress, if a job is being tracked
    pub fn get_refresh_progress(&self) -> Option<RefreshProgress> {
        self.refresh_progress.read().clone()
    }
}
