//! External media boundary
//!
//! Two remote collaborators, both consumed as black boxes over HTTP:
//! an object store for image persistence and an inference service for
//! image enhancement. Upload failure is explicitly non-fatal: the caller
//! gets an inline `data:` URI instead of a public URL and keeps working.
//! Enhancement failure surfaces as an error, with no retry.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Enhancement service is not configured")]
    NotConfigured,
    #[error("Enhancement failed: {0}")]
    Remote(String),
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Deserialize)]
struct EnhanceResponse {
    image: String,
}

pub struct MediaClient {
    object_store_url: Option<String>,
    enhance_url: Option<String>,
    http_client: Client,
}

impl MediaClient {
    pub fn new(object_store_url: Option<String>, enhance_url: Option<String>) -> Self {
        Self {
            object_store_url,
            enhance_url,
            http_client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            env::var("OBJECT_STORE_URL").ok(),
            env::var("ENHANCE_SERVICE_URL").ok(),
        )
    }

    /// Persist image bytes and return a reference to them: the object
    /// store's public URL on success, an inline data URI when the store
    /// is unreachable or not configured.
    pub async fn store_image(&self, bytes: Vec<u8>, content_type: &str) -> String {
        let Some(url) = &self.object_store_url else {
            return inline_data_uri(&bytes, content_type);
        };

        let response = self
            .http_client
            .post(url)
            .header("Content-Type", content_type)
            .body(bytes.clone())
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<UploadResponse>().await {
                    Ok(upload) => upload.url,
                    Err(e) => {
                        log::warn!("Object store returned malformed response: {}", e);
                        inline_data_uri(&bytes, content_type)
                    }
                }
            }
            Ok(response) => {
                log::warn!("Object store rejected upload: {}", response.status());
                inline_data_uri(&bytes, content_type)
            }
            Err(e) => {
                log::warn!("Object store unreachable: {}", e);
                inline_data_uri(&bytes, content_type)
            }
        }
    }

    /// Single round trip to the inference service: image bytes plus an
    /// instruction in, transformed bytes out.
    pub async fn enhance(&self, bytes: &[u8], instruction: &str) -> Result<Vec<u8>, MediaError> {
        let Some(url) = &self.enhance_url else {
            return Err(MediaError::NotConfigured);
        };

        let response = self
            .http_client
            .post(url)
            .json(&serde_json::json!({
                "image": BASE64.encode(bytes),
                "instruction": instruction,
            }))
            .send()
            .await
            .map_err(|e| MediaError::Remote(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::Remote(format!(
                "service returned {}",
                response.status()
            )));
        }

        let enhanced: EnhanceResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Remote(e.to_string()))?;

        BASE64
            .decode(&enhanced.image)
            .map_err(|e| MediaError::Remote(e.to_string()))
    }
}

fn inline_data_uri(bytes: &[u8], content_type: &str) -> String {
    format!("data:{};base64,{}", content_type, BASE64.encode(bytes))
}
