//! Report Service
//!
//! Report generation for analyzed batches, plus batch cleanup.

use crate::api::types::Report;
use crate::error::Result;
use crate::state::AppState;
use tracing::info;

/// Report service for batch outputs
pub struct ReportService;

impl ReportService {
    /// Generate the summary report for a batch
    pub async fn generate_report(state: &AppState, batch_id: &str) -> Result<Report> {
        info!("ReportService::generate_report - {}", batch_id);

        state.api.generate_report(batch_id).await
    }

    /// Generate the detailed report for a batch
    pub async fn generate_detailed_report(state: &AppState, batch_id: &str) -> Result<Report> {
        info!("ReportService::generate_detailed_report - {}", batch_id);

        state.api.generate_detailed_report(batch_id).await
    }

    /// Delete a batch record
    pub async fn delete_batch(state: &AppState, batch_id: &str) -> Result<()> {
        info!("ReportService::delete_batch - {}", batch_id);

        state.api.delete_batch(batch_id).await
    }
}
