//! Refresh Service
//!
//! Starts knowledge-base refresh jobs and tracks them to completion. The
//! tracking loop is an owned future: dropping it stops polling, so a shell
//! that navigates away mid-refresh simply drops the future and no stray
//! timer keeps firing.

use crate::api::types::{JobStatus, RefreshJob};
use crate::error::{AppError, Result};
use crate::state::{AppState, RefreshProgress};
use serde::Serialize;
use tracing::{error, info};

/// Message surfaced when a failed job carries no error text
const REFRESH_FAILED_FALLBACK: &str = "Knowledge base refresh failed";

/// Final state of a tracked refresh job
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub job: RefreshJob,
    pub companies_reloaded: usize,
}

/// Refresh service for knowledge-base jobs
pub struct RefreshService;

impl RefreshService {
    /// Start a refresh for one company, returning the backend job id
    pub async fn start_company_refresh(state: &AppState, ticker: &str) -> Result<String> {
        info!("RefreshService::start_company_refresh - {}", ticker);

        let started = state.api.refresh_company(ticker).await?;
        Ok(started.job_id)
    }

    /// Start a refresh across all companies, returning the backend job id
    pub async fn start_full_refresh(state: &AppState) -> Result<String> {
        info!("RefreshService::start_full_refresh");

        let started = state.api.refresh_all_companies().await?;
        Ok(started.job_id)
    }

    /// Poll a refresh job until it reaches a terminal state.
    ///
    /// Waits the configured initial delay, then polls at the configured
    /// interval. Progress is written to state on every response. Polls are
    /// strictly sequential: the next request is not issued until the
    /// previous response has landed and the interval has elapsed.
    ///
    /// Stops after the first terminal status observed. On `completed` the
    /// company cache is reloaded and progress cleared; on `failed` the
    /// job's error text (or a fixed fallback) is returned. A failed poll
    /// request itself also stops tracking; no retry is attempted.
    ///
    /// No maximum poll count is enforced, so a backend that never reaches a
    /// terminal state is polled until the future is dropped.
    pub async fn track_job(state: &AppState, job_id: &str) -> Result<RefreshOutcome> {
        info!("RefreshService::track_job - {}", job_id);

        tokio::time::sleep(state.config.poll_initial_delay).await;

        loop {
            let job = match state.api.get_refresh_job(job_id).await {
                Ok(job) => job,
                Err(e) => {
                    error!("Status poll for job {} failed: {}", job_id, e);
                    state.clear_refresh_progress();
                    return Err(e);
                }
            };

            state.set_refresh_progress(RefreshProgress {
                job_id: job.job_id.clone(),
                current: job.current,
                total: job.total,
                current_company: job.current_company.clone(),
            });

            match job.status {
                JobStatus::Completed => {
                    info!(
                        "Refresh job {} completed ({}/{} companies)",
                        job_id, job.current, job.total
                    );
                    state.clear_refresh_progress();

                    let companies = state.api.list_companies().await?;
                    let companies_reloaded = companies.len();
                    state.load_company_cache(companies);

                    return Ok(RefreshOutcome {
                        job,
                        companies_reloaded,
                    });
                }
                JobStatus::Failed => {
                    let message = job
                        .error
                        .clone()
                        .unwrap_or_else(|| REFRESH_FAILED_FALLBACK.to_string());
                    error!("Refresh job {} failed: {}", job_id, message);
                    state.clear_refresh_progress();

                    return Err(AppError::Job(message));
                }
                JobStatus::Pending | JobStatus::Starting | JobStatus::Running => {
                    tokio::time::sleep(state.config.poll_interval).await;
                }
            }
        }
    }

    /// Start a single-company refresh and track it to completion
    pub async fn refresh_company(state: &AppState, ticker: &str) -> Result<RefreshOutcome> {
        let job_id = Self::start_company_refresh(state, ticker).await?;
        Self::track_job(state, &job_id).await
    }

    /// Start a full refresh and track it to completion
    pub async fn refresh_all(state: &AppState) -> Result<RefreshOutcome> {
        let job_id = Self::start_full_refresh(state).await?;
        Self::track_job(state, &job_id).await
    }
}
