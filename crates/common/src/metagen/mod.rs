//! Metadata generation client
//!
//! The page count, page size and page images of a document are computed by
//! an external service. One request per call, bounded by a timeout, never
//! retried.

use crate::config::MetaGenConfig;
use crate::domain::MetaFields;
use crate::errors::{AppError, Result};
use crate::metrics::record_meta_generation;
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Source of generated document metadata
#[async_trait]
pub trait MetaGenerator: Send + Sync {
    /// Derive metadata from base64 encoded PDF content. Identity fields are
    /// left for the caller to fill in.
    async fn generate(&self, base64: &str) -> Result<MetaFields>;
}

#[derive(Serialize)]
struct MetaRequest<'a> {
    base64: &'a str,
}

/// HTTP client for the metadata service (`POST {base_url}/meta`)
pub struct HttpMetaGenerator {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpMetaGenerator {
    /// Build a client from configuration. Fails when no base URL is set.
    pub fn new(config: &MetaGenConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Configuration {
                message: "metagen.base_url is not set".into(),
            })?;

        Self::with_timeout(base_url, config.timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/meta", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(&self, base64: &str) -> Result<MetaFields> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&MetaRequest { base64 })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MetaGeneration {
                message: format!("metadata service returned {}: {}", status, body),
            });
        }

        response.json().await.map_err(|e| AppError::MetaGeneration {
            message: format!("Failed to parse response: {}", e),
        })
    }

    fn request_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::MetaGenerationTimeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            AppError::MetaGeneration {
                message: format!("Request failed: {}", e),
            }
        }
    }
}

#[async_trait]
impl MetaGenerator for HttpMetaGenerator {
    async fn generate(&self, base64: &str) -> Result<MetaFields> {
        let start = Instant::now();
        let result = self.send(base64).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(AppError::MetaGenerationTimeout { .. }) => "timeout",
            Err(_) => "error",
        };
        record_meta_generation(start.elapsed().as_secs_f64(), outcome);

        if let Err(e) = &result {
            tracing::warn!(endpoint = %self.endpoint, error = %e, "Metadata generation failed");
        }

        result
    }
}
