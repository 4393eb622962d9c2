//! HTTP photo store client.
//!
//! Photos are `PUT` to `{BLOB_STORE_URL}/{key}`; the resulting object URL
//! is what gets recorded on the attendance record.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{config::Config, error::AppError, models::attendance::PhotoUpload, store::BlobStore};

pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBlobStore {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` if `BLOB_STORE_URL` is not an absolute http(s) URL or
    /// the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let mut base_url = Url::parse(&config.blob_store_url)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid BLOB_STORE_URL: {}", e)))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::InvalidRequest(
                "BLOB_STORE_URL must use HTTP or HTTPS".to_string(),
            ));
        }

        // Url::join replaces the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        // Deadline per upload; the four uploads run concurrently
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.blob_upload_timeout_secs))
            .build()
            .map_err(|e| AppError::InvalidRequest(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: config.blob_store_token.clone(),
        })
    }

    fn object_url(&self, key: &str) -> Result<Url, AppError> {
        self.base_url
            .join(key)
            .map_err(|e| AppError::PhotoUpload(format!("Invalid object key '{}': {}", key, e)))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(&self, key: &str, photo: &PhotoUpload) -> Result<String, AppError> {
        let url = self.object_url(key)?;

        let mut request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, &photo.content_type)
            .body(photo.bytes.clone());

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::PhotoUpload(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%url, %status, "Photo store rejected upload");
            return Err(AppError::PhotoUpload(format!(
                "Photo store returned {}: {}",
                status, body
            )));
        }

        Ok(url.to_string())
    }
}
