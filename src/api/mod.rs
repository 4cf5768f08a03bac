//! Research backend adapter
//!
//! The backend is the source of record for companies, documents, batches and
//! refresh jobs; this module is the only place that talks to it. Services go
//! through the [`ResearchApi`] trait so they can be exercised against test
//! doubles as well as the live HTTP backend.

pub mod types;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use types::*;
use url::Url;

/// Backend operations used by the services layer
#[async_trait]
pub trait ResearchApi: Send + Sync {
    /// List all companies in the registry
    async fn list_companies(&self) -> Result<Vec<Company>>;

    /// Get a single company by ticker
    async fn get_company(&self, ticker: &str) -> Result<Company>;

    /// List documents uploaded for a company
    async fn list_documents(&self, ticker: &str) -> Result<Vec<Document>>;

    /// List generated reports for a company
    async fn list_reports(&self, ticker: &str) -> Result<Vec<Report>>;

    /// Start a knowledge-base refresh for one company
    async fn refresh_company(&self, ticker: &str) -> Result<JobStarted>;

    /// Start a knowledge-base refresh across all companies
    async fn refresh_all_companies(&self) -> Result<JobStarted>;

    /// Fetch the current status of a refresh job
    async fn get_refresh_job(&self, job_id: &str) -> Result<RefreshJob>;

    /// Upload one document as a multipart form
    async fn upload_document(&self, ticker: &str, upload: DocumentUpload) -> Result<Document>;

    /// Group previously uploaded documents into a batch
    async fn create_batch(&self, request: CreateBatch) -> Result<Batch>;

    /// Submit a batch for analysis. Slow by design; callers should expect
    /// this to take minutes.
    async fn analyze_batch(&self, batch_id: &str) -> Result<BatchAnalysis>;

    /// Generate the summary report for an analyzed batch
    async fn generate_report(&self, batch_id: &str) -> Result<Report>;

    /// Generate the detailed report for an analyzed batch
    async fn generate_detailed_report(&self, batch_id: &str) -> Result<Report>;

    /// Delete a batch record
    async fn delete_batch(&self, batch_id: &str) -> Result<()>;
}

/// HTTP implementation of [`ResearchApi`] speaking the JSON envelope protocol
pub struct HttpResearchApi {
    client: Client,
    base_url: Url,
    analyze_timeout: Duration,
}

impl HttpResearchApi {
    /// Build a client from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            analyze_timeout: config.analyze_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint path {}: {}", path, e)))
    }

    /// Map HTTP status and envelope failure into the error taxonomy, then
    /// unwrap the payload.
    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let envelope = Self::decode_envelope::<T>(response, what).await?;
        envelope
            .data
            .ok_or_else(|| AppError::Api(format!("{}: empty response payload", what)))
    }

    /// Like [`Self::decode`] but for endpoints whose success carries no payload
    async fn decode_unit(response: Response, what: &str) -> Result<()> {
        Self::decode_envelope::<serde_json::Value>(response, what).await?;
        Ok(())
    }

    async fn decode_envelope<T: DeserializeOwned>(
        response: Response,
        what: &str,
    ) -> Result<ApiEnvelope<T>> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(what.to_string()));
        }

        if status.is_server_error() {
            return Err(AppError::Server(format!("{} ({})", what, status)));
        }

        if status.is_client_error() {
            // Surface the backend's error text when the body carries one
            let message = response
                .json::<ApiEnvelope<serde_json::Value>>()
                .await
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| format!("{}: request rejected ({})", what, status));
            return Err(AppError::Api(message));
        }

        let envelope: ApiEnvelope<T> = response.json().await?;

        if !envelope.success {
            return Err(AppError::Api(
                envelope
                    .error
                    .unwrap_or_else(|| format!("{} failed", what)),
            ));
        }

        Ok(envelope)
    }
}

#[async_trait]
impl ResearchApi for HttpResearchApi {
    async fn list_companies(&self) -> Result<Vec<Company>> {
        let response = self
            .client
            .get(self.endpoint("/api/companies")?)
            .send()
            .await?;

        Self::decode(response, "company list").await
    }

    async fn get_company(&self, ticker: &str) -> Result<Company> {
        let path = format!("/api/companies/{}", urlencoding::encode(ticker));
        let response = self.client.get(self.endpoint(&path)?).send().await?;

        Self::decode(response, "company").await
    }

    async fn list_documents(&self, ticker: &str) -> Result<Vec<Document>> {
        let path = format!("/api/companies/{}/documents", urlencoding::encode(ticker));
        let response = self.client.get(self.endpoint(&path)?).send().await?;

        Self::decode(response, "document list").await
    }

    async fn list_reports(&self, ticker: &str) -> Result<Vec<Report>> {
        let path = format!("/api/companies/{}/reports", urlencoding::encode(ticker));
        let response = self.client.get(self.endpoint(&path)?).send().await?;

        Self::decode(response, "report list").await
    }

    async fn refresh_company(&self, ticker: &str) -> Result<JobStarted> {
        let path = format!("/api/companies/{}/refresh", urlencoding::encode(ticker));
        let response = self.client.post(self.endpoint(&path)?).send().await?;

        Self::decode(response, "company refresh").await
    }

    async fn refresh_all_companies(&self) -> Result<JobStarted> {
        let response = self
            .client
            .post(self.endpoint("/api/companies/refresh-all")?)
            .send()
            .await?;

        Self::decode(response, "full refresh").await
    }

    async fn get_refresh_job(&self, job_id: &str) -> Result<RefreshJob> {
        let path = format!("/api/jobs/{}", urlencoding::encode(job_id));
        let response = self.client.get(self.endpoint(&path)?).send().await?;

        Self::decode(response, "refresh job").await
    }

    async fn upload_document(&self, ticker: &str, upload: DocumentUpload) -> Result<Document> {
        let path = format!("/api/companies/{}/documents", urlencoding::encode(ticker));

        let file_part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("document_type", upload.document_type);

        if let Some(description) = upload.description {
            form = form.text("description", description);
        }

        let response = self
            .client
            .post(self.endpoint(&path)?)
            .multipart(form)
            .send()
            .await?;

        Self::decode(response, "document upload").await
    }

    async fn create_batch(&self, request: CreateBatch) -> Result<Batch> {
        let response = self
            .client
            .post(self.endpoint("/api/batches")?)
            .json(&request)
            .send()
            .await?;

        Self::decode(response, "batch creation").await
    }

    async fn analyze_batch(&self, batch_id: &str) -> Result<BatchAnalysis> {
        let path = format!("/api/batches/{}/analyze", urlencoding::encode(batch_id));
        let response = self
            .client
            .post(self.endpoint(&path)?)
            .timeout(self.analyze_timeout)
            .send()
            .await?;

        Self::decode(response, "batch analysis").await
    }

    async fn generate_report(&self, batch_id: &str) -> Result<Report> {
        let path = format!("/api/batches/{}/report", urlencoding::encode(batch_id));
        let response = self
            .client
            .post(self.endpoint(&path)?)
            .timeout(self.analyze_timeout)
            .send()
            .await?;

        Self::decode(response, "report generation").await
    }

    async fn generate_detailed_report(&self, batch_id: &str) -> Result<Report> {
        let path = format!(
            "/api/batches/{}/report/detailed",
            urlencoding::encode(batch_id)
        );
        let response = self
            .client
            .post(self.endpoint(&path)?)
            .timeout(self.analyze_timeout)
            .send()
            .await?;

        Self::decode(response, "detailed report generation").await
    }

    async fn delete_batch(&self, batch_id: &str) -> Result<()> {
        let path = format!("/api/batches/{}", urlencoding::encode(batch_id));
        let response = self.client.delete(self.endpoint(&path)?).send().await?;

        Self::decode_unit(response, "batch deletion").await
    }
}
