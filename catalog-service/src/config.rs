use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub github: GithubConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub token: String,
    /// Target repository in `owner/repo` form.
    pub repo: String,
    pub committer_name: String,
    pub committer_email: String,
    pub upload_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Scratch directory for files in flight to the remote host.
    pub dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                host: std::env::var("SERVER_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
            },
            database: DatabaseConfig {
                url: std::env::var("MONGODB_URL")?,
                name: std::env::var("MONGODB_DATABASE")
                    .unwrap_or_else(|_| "kpop_catalog".to_string()),
            },
            github: GithubConfig {
                token: std::env::var("GITHUB_TOKEN")?,
                repo: std::env::var("GITHUB_REPO")?,
                committer_name: std::env::var("GITHUB_COMMITTER_NAME")
                    .unwrap_or_else(|_| "catalog-bot".to_string()),
                committer_email: std::env::var("GITHUB_COMMITTER_EMAIL")
                    .unwrap_or_else(|_| "catalog-bot@example.com".to_string()),
                upload_timeout_seconds: std::env::var("UPLOAD_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            },
            upload: UploadConfig {
                dir: std::env::var("UPLOAD_DIR")
                    .unwrap_or_else(|_| "/tmp/uploads".to_string()),
            },
        })
    }
}
