//! Company Service
//!
//! Registry listings plus per-company documents and reports. Everything is
//! fetched fresh from the backend on each call; the cache only mirrors the
//! latest listing for synchronous lookups by the shell.

use crate::api::types::{Company, Document, Report};
use crate::error::Result;
use crate::state::AppState;
use tracing::info;

/// Company service for registry reads
pub struct CompanyService;

impl CompanyService {
    /// List all companies and reload the cache from the response
    pub async fn list_companies(state: &AppState) -> Result<Vec<Company>> {
        info!("CompanyService::list_companies");

        let companies = state.api.list_companies().await?;
        state.load_company_cache(companies.clone());

        Ok(companies)
    }

    /// Get one company by ticker, refreshing its cache entry
    pub async fn get_company(state: &AppState, ticker: &str) -> Result<Company> {
        info!("CompanyService::get_company - {}", ticker);

        let company = state.api.get_company(ticker).await?;
        state
            .company_cache
            .insert(company.ticker.clone(), company.clone());

        Ok(company)
    }

    /// List documents uploaded for a company
    pub async fn list_documents(state: &AppState, ticker: &str) -> Result<Vec<Document>> {
        info!("CompanyService::list_documents - {}", ticker);

        state.api.list_documents(ticker).await
    }

    /// List generated reports for a company
    pub async fn list_reports(state: &AppState, ticker: &str) -> Result<Vec<Report>> {
        info!("CompanyService::list_reports - {}", ticker);

        state.api.list_reports(ticker).await
    }
}
