use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::env::CdnSettings;
use crate::error::AppError;

#[derive(Deserialize)]
struct CdnUploadResponse {
    #[serde(default)]
    url: String,
}

/// Thin client for the image CDN. Holds no state besides the HTTP client and
/// the optional credentials read at start-up.
pub struct CdnClient {
    http: reqwest::Client,
    settings: Option<CdnSettings>,
}

impl CdnClient {
    pub fn new(settings: Option<CdnSettings>) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Uploads one file and returns the public URL the CDN published it at.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, AppError> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| AppError::Internal("CDN configuration missing".to_string()))?;

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&settings.upload_url)
            .header("X-API-Key", &settings.api_key)
            .header("X-Project-ID", &settings.project_id)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Cdn(text));
        }

        let body: CdnUploadResponse = response.json().await?;
        info!(url = %body.url, "Photo published to CDN");

        Ok(body.url)
    }
}
