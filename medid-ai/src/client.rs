//! Upload client for the identification endpoint
//!
//! Used by the `medid-identify` binary: posts image files as `files`
//! multipart parts and returns the decoded JSON body.

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::identify::FILES_FIELD;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Result of one upload as seen by the client
#[derive(Debug)]
pub enum ClientOutcome {
    /// HTTP 200 with a JSON body (either `medicine` or `error`)
    Response(serde_json::Value),
    /// Any other HTTP status
    Failed(u16),
}

pub struct IdentifyClient {
    http_client: reqwest::Client,
    server_url: String,
}

impl IdentifyClient {
    pub fn new(server_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            server_url: server_url.into(),
        })
    }

    pub fn identify_url(&self) -> String {
        format!("{}/identify/", self.server_url.trim_end_matches('/'))
    }

    /// Upload `paths` as one identification batch
    pub async fn identify_files(&self, paths: &[PathBuf]) -> Result<ClientOutcome> {
        let mut form = Form::new();
        for path in paths {
            let data = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let mime_type = infer::get(&data)
                .map(|kind| kind.mime_type())
                .unwrap_or("application/octet-stream");

            let part = Part::bytes(data).file_name(file_name).mime_str(mime_type)?;
            form = form.part(FILES_FIELD, part);
        }

        tracing::debug!(url = %self.identify_url(), files = paths.len(), "Uploading images");

        let response = self
            .http_client
            .post(self.identify_url())
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.identify_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(ClientOutcome::Failed(status.as_u16()));
        }

        let body = response
            .json()
            .await
            .context("Server returned a non-JSON body")?;
        Ok(ClientOutcome::Response(body))
    }
}
