pub mod error;
pub mod types;

pub use error::{ImgurError, Result};
pub use types::{album_link, Album, UploadedImage};

use std::time::Duration;

use types::ApiResponse;

const BASE_URL: &str = "https://api.imgur.com/3";

pub struct ImgurClient {
    client: reqwest::Client,
    client_id: String,
}

impl ImgurClient {
    pub fn new(client_id: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            client_id: client_id.to_string(),
        }
    }

    /// Create an empty album.
    pub async fn create_album(&self, title: &str, description: &str) -> Result<Album> {
        let resp = self
            .client
            .post(format!("{BASE_URL}/album"))
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .form(&[("title", title), ("description", description)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ImgurError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_resp: ApiResponse<Album> = resp.json().await?;
        tracing::debug!(album_id = %api_resp.data.id, "created album");
        Ok(api_resp.data)
    }

    /// Side-load an image from a URL into an album. Imgur fetches the URL
    /// itself, so image bytes never pass through this process.
    pub async fn upload_from_url(
        &self,
        image_url: &str,
        title: &str,
        description: &str,
        album_deletehash: &str,
    ) -> Result<UploadedImage> {
        let resp = self
            .client
            .post(format!("{BASE_URL}/image"))
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .form(&[
                ("type", "url"),
                ("image", image_url),
                ("title", title),
                ("description", description),
                ("album", album_deletehash),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ImgurError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_resp: ApiResponse<UploadedImage> = resp.json().await?;
        tracing::debug!(image_id = %api_resp.data.id, link = %api_resp.data.link, "uploaded image");
        Ok(api_resp.data)
    }
}

#[cfg(test)]
mod tests {
    use super::types::ApiResponse;
    use super::*;

    #[test]
    fn parses_album_create_response() {
        let body = r#"{"data":{"id":"SbBGk","deletehash":"ANSa9mx"},"success":true,"status":200}"#;
        let resp: ApiResponse<Album> = serde_json::from_str(body).unwrap();
        assert_eq!(resp.data.id, "SbBGk");
        assert_eq!(resp.data.deletehash, "ANSa9mx");
        assert_eq!(resp.data.link(), "https://imgur.com/a/SbBGk");
        assert!(resp.success);
    }

    #[test]
    fn parses_image_upload_response() {
        let body = r#"{"data":{"id":"orunSTu","link":"https://i.imgur.com/orunSTu.png"},"success":true,"status":200}"#;
        let resp: ApiResponse<UploadedImage> = serde_json::from_str(body).unwrap();
        assert_eq!(resp.data.id, "orunSTu");
        assert_eq!(resp.data.link, "https://i.imgur.com/orunSTu.png");
    }
}
