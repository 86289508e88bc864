pub mod error;

pub use error::{Result, SnapitoError};

use std::time::Duration;

use tracing::info;

/// Client for the Snapito full-page capture API.
///
/// Captures are addressable by URL (`/web/{key}/full/{target}?type=png`),
/// so callers that hand the capture off to another service (e.g. an image
/// host that side-loads by URL) only ever need `capture_url`. `capture`
/// fetches the rendered PNG directly for callers that want the bytes.
pub struct SnapitoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SnapitoClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Build the full-page capture URL for a target. Schemeless targets
    /// (extracted `www.` or bare-domain tokens) are normalized to http.
    pub fn capture_url(&self, target: &str) -> String {
        let target = if target.contains("://") {
            target.to_string()
        } else {
            format!("http://{target}")
        };
        format!("{}/web/{}/full/{}?type=png", self.base_url, self.api_key, target)
    }

    /// Fetch the rendered PNG for a target.
    pub async fn capture(&self, target: &str) -> Result<bytes::Bytes> {
        let endpoint = self.capture_url(target);

        let parsed = url::Url::parse(&endpoint)
            .map_err(|_| SnapitoError::InvalidTarget(target.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(SnapitoError::InvalidTarget(target.to_string()));
        }

        info!(target, "requesting capture");

        let resp = self.client.get(&endpoint).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SnapitoError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.bytes().await?)
    }
}
