use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::messages::Messages;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Backend base URL (e.g., http://localhost:8080)
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Where downloaded files are saved
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Scratch space for downloads before they are saved
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Advisory upload limit shown to the user. The backend enforces the real one.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,

    #[serde(default)]
    pub messages: Messages,
}

fn default_request_timeout() -> u64 {
    30
}
fn default_download_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join("file-console")
}
fn default_max_upload_mb() -> u64 {
    100
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            request_timeout_secs: default_request_timeout(),
            download_dir: default_download_dir(),
            staging_dir: default_staging_dir(),
            max_upload_mb: default_max_upload_mb(),
            messages: Messages::default(),
        }
    }
}

impl ConsoleConfig {
    /// Default config file path for this platform
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "file-console", "console") {
            dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("console-config.json")
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        serde_json::from_slice(&data)
            .with_context(|| format!("invalid console config in {}", path.display()))
    }

    /// A missing file means defaults; an unreadable or malformed one is an error
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        info!("loading config from {}", path.display());
        Self::load(path)
    }

    /// Write via a sibling temp file so a crash never leaves half a config
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create config dir {}", dir.display()))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to move config into {}", path.display()))
    }

    /// Join an absolute API path onto the base URL
    pub fn route(&self, path: &str) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
