use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::CatalogError;
use tracing::{error, info};

use super::{ImageHost, UploadedImage};
use crate::config::GithubConfig;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "kpop-catalog/0.1";

/// GitHub repository-contents client, used purely as blob storage.
///
/// Uploads are single PUTs with no existence check: the API rejects a PUT
/// to an already-populated path when no blob SHA is supplied, so a path
/// collision surfaces as an upload error rather than an overwrite.
pub struct GithubClient {
    http_client: Client,
    repo: String,
    token: String,
    committer: Committer,
}

#[derive(Debug, Clone, Serialize)]
struct Committer {
    name: String,
    email: String,
}

#[derive(Serialize)]
struct PutContentRequest<'a> {
    message: String,
    content: String,
    committer: &'a Committer,
}

#[derive(Serialize)]
struct DeleteContentRequest<'a> {
    message: String,
    sha: &'a str,
    committer: &'a Committer,
}

#[derive(Deserialize)]
struct ContentEnvelope {
    content: ContentInfo,
}

#[derive(Deserialize)]
struct ContentInfo {
    download_url: String,
    sha: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self, CatalogError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_seconds))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            repo: config.repo.clone(),
            token: config.token.clone(),
            committer: Committer {
                name: config.committer_name.clone(),
                email: config.committer_email.clone(),
            },
        })
    }

    fn contents_url(&self, remote_path: &str) -> String {
        format!("{}/repos/{}/contents/{}", API_BASE, self.repo, remote_path)
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.token)
    }
}

#[async_trait]
impl ImageHost for GithubClient {
    async fn upload(
        &self,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<UploadedImage, CatalogError> {
        let data = tokio::fs::read(local_path).await?;
        let basename = local_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload");

        let body = PutContentRequest {
            message: format!("Add image {}", basename),
            content: STANDARD.encode(&data),
            committer: &self.committer,
        };

        let response = self
            .http_client
            .put(self.contents_url(remote_path))
            .header(header::AUTHORIZATION, self.auth_header())
            .header(header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Image upload to {} failed: {} - {}",
                remote_path, status, error_text
            );
            return Err(CatalogError::Upload(format!(
                "remote host returned {}",
                status
            )));
        }

        let payload: ContentEnvelope = response.json().await?;
        info!("Uploaded image {} ({} bytes)", remote_path, data.len());

        Ok(UploadedImage {
            download_url: payload.content.download_url,
            remote_path: remote_path.to_string(),
            sha: payload.content.sha,
        })
    }

    async fn delete(&self, image: &UploadedImage) -> Result<(), CatalogError> {
        let body = DeleteContentRequest {
            message: format!("Remove image {}", image.remote_path),
            sha: &image.sha,
            committer: &self.committer,
        };

        let response = self
            .http_client
            .delete(self.contents_url(&image.remote_path))
            .header(header::AUTHORIZATION, self.auth_header())
            .header(header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Image delete of {} failed: {} - {}",
                image.remote_path, status, error_text
            );
            return Err(CatalogError::Upload(format!(
                "remote delete returned {}",
                status
            )));
        }

        info!("Removed image {}", image.remote_path);
        Ok(())
    }
}
