//! HTTP contract with the file backend.
//!
//! | op       | route                          |
//! |----------|--------------------------------|
//! | list     | GET    /api/files              |
//! | upload   | POST   /api/files/upload       |
//! | download | GET    /api/files/{id}/download |
//! | delete   | DELETE /api/files/{id}         |

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Url;
use thiserror::Error;
use tracing::debug;

use console_platform::filesystem::LocalFile;

use crate::config::ConsoleConfig;
use crate::records::ListPayload;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Server answered with a non-2xx status
    #[error("HTTP {0}")]
    Status(u16),
    /// Connect, timeout, or body read failure
    #[error("{0}")]
    Transport(String),
    /// Response body was not what we expected
    #[error("{0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Transport("request timed out".to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Multipart body of an upload
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub file: LocalFile,
    pub description: Option<String>,
}

impl UploadForm {
    /// Blank descriptions are dropped
    pub fn new(file: LocalFile, description: impl Into<String>) -> Self {
        let description = description.into();
        let description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        Self { file, description }
    }
}

#[async_trait]
pub trait FileApi: Send + Sync {
    async fn list(&self) -> Result<ListPayload, ApiError>;
    async fn upload(&self, form: UploadForm) -> Result<(), ApiError>;
    async fn download(&self, id: &str) -> Result<Bytes, ApiError>;
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

pub struct HttpFileApi {
    client: reqwest::Client,
    files_url: Url,
}

impl HttpFileApi {
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        if config.api_base_url.trim().is_empty() {
            anyhow::bail!("api base url is not configured");
        }

        let files_url = Url::parse(&config.route("/api/files"))
            .with_context(|| format!("invalid api base url {}", config.api_base_url))?;
        if files_url.cannot_be_a_base() {
            anyhow::bail!("api base url {} cannot carry a path", config.api_base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("failed to build http client")?;

        Ok(Self { client, files_url })
    }

    /// `/api/files/<segments...>`, each segment percent-encoded
    fn url_with(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.files_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("invalid api url {}", self.files_url)))?
            .extend(segments);
        Ok(url)
    }
}

fn check_status(resp: &reqwest::Response) -> Result<(), ApiError> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(ApiError::Status(resp.status().as_u16()))
    }
}

#[async_trait]
impl FileApi for HttpFileApi {
    async fn list(&self) -> Result<ListPayload, ApiError> {
        debug!("GET {}", self.files_url);
        let resp = self
            .client
            .get(self.files_url.clone())
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;
        check_status(&resp)?;

        let body = resp.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Decode(format!("invalid file list: {}", e)))
    }

    async fn upload(&self, form: UploadForm) -> Result<(), ApiError> {
        let url = self.url_with(&["upload"])?;
        debug!("POST {} ({}, {} bytes)", url, form.file.name, form.file.size());

        let mut part = reqwest::multipart::Part::bytes(form.file.data.to_vec())
            .file_name(form.file.name.clone());
        if let Some(content_type) = &form.file.content_type {
            part = part.mime_str(content_type)?;
        }

        let mut multipart = reqwest::multipart::Form::new().part("file", part);
        if let Some(description) = form.description {
            multipart = multipart.text("description", description);
        }

        let resp = self.client.post(url).multipart(multipart).send().await?;
        check_status(&resp)
    }

    async fn download(&self, id: &str) -> Result<Bytes, ApiError> {
        let url = self.url_with(&[id, "download"])?;
        debug!("GET {}", url);

        let resp = self.client.get(url).send().await?;
        check_status(&resp)?;
        Ok(resp.bytes().await?)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.url_with(&[id])?;
        debug!("DELETE {}", url);

        let resp = self.client.delete(url).send().await?;
        check_status(&resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> Result<HttpFileApi> {
        let mut config = ConsoleConfig::default();
        config.api_base_url = base.to_string();
        HttpFileApi::new(&config)
    }

    #[test]
    fn test_urls() {
        let api = api("http://files.local:8080/").unwrap();
        assert_eq!(api.files_url.as_str(), "http://files.local:8080/api/files");
        assert_eq!(
            api.url_with(&["upload"]).unwrap().as_str(),
            "http://files.local:8080/api/files/upload"
        );
        assert_eq!(
            api.url_with(&["a b/c", "download"]).unwrap().as_str(),
            "http://files.local:8080/api/files/a%20b%2Fc/download"
        );
    }

    #[test]
    fn test_base_with_prefix() {
        let api = api("https://example.com/console").unwrap();
        assert_eq!(
            api.url_with(&["f1"]).unwrap().as_str(),
            "https://example.com/console/api/files/f1"
        );
    }

    #[test]
    fn test_rejects_bad_base() {
        assert!(api("").is_err());
        assert!(api("not a url").is_err());
        assert!(api("mailto:someone").is_err());
    }

    #[test]
    fn test_upload_form_drops_blank_description() {
        let file = LocalFile::new("a.txt", None, Bytes::from_static(b"a"));
        assert!(UploadForm::new(file.clone(), "   ").description.is_none());
        assert_eq!(
            UploadForm::new(file, "notes").description.as_deref(),
            Some("notes")
        );
    }
}
