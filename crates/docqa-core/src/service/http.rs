//! HTTP implementation of [`DocumentService`].

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{
    AskResponse, AuthResponse, Credential, DocumentService, HistoryRecord, ServiceError,
    ServiceResult, UploadFile, UploadResponse,
};
use crate::config::Config;

/// Standard User-Agent header for DocQA requests.
pub const USER_AGENT: &str = concat!("docqa/", env!("CARGO_PKG_VERSION"));

/// Document service client over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpDocumentService {
    base_url: String,
    http: reqwest::Client,
}

impl HttpDocumentService {
    /// Creates a client for `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Creates a client from configuration (`DOCQA_API_URL` wins over config).
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.effective_api_base_url()?, config.request_timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ServiceResult<T> {
        let response = check_status(request.send().await?).await?;
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ServiceError::parse(format!("Invalid response body: {e}")))
    }
}

async fn check_status(response: Response) -> ServiceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::http_status(status.as_u16(), &body))
}

impl DocumentService for HttpDocumentService {
    async fn authenticate(&self, credential: &Credential) -> ServiceResult<AuthResponse> {
        let request = self
            .http
            .post(self.url("/users/auth/google"))
            .json(credential);
        Self::send_json(request).await
    }

    async fn upload_document(
        &self,
        user_id: &str,
        file: UploadFile,
    ) -> ServiceResult<UploadResponse> {
        let part = Part::bytes(file.bytes).file_name(file.file_name);
        let form = Form::new()
            .part("file", part)
            .text("user_id", user_id.to_string());
        let request = self.http.post(self.url("/upload/")).multipart(form);
        Self::send_json(request).await
    }

    async fn ask(&self, session_id: &str, question: &str) -> ServiceResult<AskResponse> {
        let request = self.http.post(self.url("/ask/")).json(&json!({
            "session_id": session_id,
            "question": question,
        }));
        Self::send_json(request).await
    }

    async fn get_history(&self, session_id: &str) -> ServiceResult<Vec<HistoryRecord>> {
        let request = self
            .http
            .get(self.url(&format!("/ask/conversations/{session_id}")));
        Self::send_json(request).await
    }

    async fn delete_conversation(&self, user_id: &str, document_id: &str) -> ServiceResult<()> {
        let request = self
            .http
            .delete(self.url("/docs/"))
            .query(&[("user_id", user_id), ("id", document_id)]);
        check_status(request.send().await?).await?;
        Ok(())
    }

    async fn export_conversation_pdf(&self, session_id: &str) -> ServiceResult<Vec<u8>> {
        let request = self
            .http
            .get(self.url(&format!("/pdf/conversation/{session_id}")));
        let response = check_status(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
