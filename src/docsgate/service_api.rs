//! Client for the remote docs service (file storage, OCR analysis, text
//! retrieval, deletion). Single attempt per call, bounded timeout.

use crate::docsgate::APP_USER_AGENT;
use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct DocsApi {
    base_url: String,
    client: reqwest::Client,
}

impl DocsApi {
    /// Build a client talking to the docs service at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build docs service client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Forward an uploaded file as multipart `file`.
    ///
    /// # Errors
    /// Returns an error when the docs service is unreachable or the part
    /// cannot be built.
    #[instrument(skip(self, bytes))]
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;

        self.client
            .post(format!("{}/upload_doc", self.base_url))
            .multipart(Form::new().part("file", part))
            .send()
            .await
    }

    /// Kick off OCR analysis for a stored document.
    ///
    /// # Errors
    /// Returns an error when the docs service is unreachable.
    #[instrument(skip(self))]
    pub async fn analyze(&self, file_id: u64) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(format!("{}/doc_analyze", self.base_url))
            .query(&[("file_id", file_id)])
            .send()
            .await
    }

    /// Fetch the extracted text of a document.
    ///
    /// # Errors
    /// Returns an error when the docs service is unreachable.
    #[instrument(skip(self))]
    pub async fn get_text(&self, file_id: u64) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .get(format!("{}/get_text", self.base_url))
            .query(&[("file_id", file_id)])
            .send()
            .await
    }

    /// Delete a stored document.
    ///
    /// # Errors
    /// Returns an error when the docs service is unreachable.
    #[instrument(skip(self))]
    pub async fn delete(&self, file_id: u64) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .delete(format!("{}/doc_delete", self.base_url))
            .query(&[("file_id", file_id)])
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = DocsApi::new("http://docs:8000/", Duration::from_secs(2)).unwrap();

        assert_eq!(api.base_url, "http://docs:8000");
    }
}
