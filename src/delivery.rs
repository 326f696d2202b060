//! Upload of sealed reports.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::info;

use crate::error::{Result, RunnerError};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct DeliveryService {
    client: Client,
    upload_url: String,
}

impl DeliveryService {
    pub fn new(upload_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            upload_url: upload_url.into(),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// POST the sealed report once; the response body is the report's URL.
    pub fn send_report_for_storing(&self, sealed_json: &str) -> Result<String> {
        info!(url = %self.upload_url, bytes = sealed_json.len(), "uploading report");
        let response = self
            .client
            .post(&self.upload_url)
            .header(CONTENT_TYPE, "application/json")
            .body(sealed_json.to_string())
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(RunnerError::UploadRejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body.trim().to_string())
    }
}
