use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use console_platform::download::{ObjectUrl, ObjectUrls, SaveTrigger};
use tracing::{debug, warn};

const URL_SCHEME: &str = "blob:";

/// Object URLs backed by files in a staging directory.
/// Revoking a URL deletes its staged file.
pub struct StagingObjectUrls {
    dir: PathBuf,
}

impl StagingObjectUrls {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ObjectUrls for StagingObjectUrls {
    fn create(&self, name_hint: &str, data: Bytes) -> Result<ObjectUrl> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create staging dir {}", self.dir.display()))?;

        let path = self
            .dir
            .join(format!("{}-{}", uuid::Uuid::new_v4(), sanitize_file_name(name_hint)));
        fs::write(&path, &data)
            .with_context(|| format!("failed to stage {}", path.display()))?;

        debug!("staged {} bytes at {}", data.len(), path.display());
        Ok(ObjectUrl(format!("{}{}", URL_SCHEME, path.display())))
    }

    fn revoke(&self, url: &ObjectUrl) {
        let Some(path) = staged_path(url) else {
            warn!("revoke: not a staged url: {}", url);
            return;
        };
        if let Err(e) = fs::remove_file(&path) {
            warn!("failed to remove staged file {}: {}", path.display(), e);
        }
    }
}

/// Saves staged objects into a download directory.
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SaveTrigger for DirectorySaver {
    fn save_as(&self, url: &ObjectUrl, suggested_name: &str) -> Result<PathBuf> {
        let src = staged_path(url).with_context(|| format!("unsupported object url {}", url))?;

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create download dir {}", self.dir.display()))?;

        let dest = unique_destination(&self.dir, &sanitize_file_name(suggested_name));
        fs::copy(&src, &dest)
            .with_context(|| format!("failed to save {}", dest.display()))?;
        Ok(dest)
    }
}

fn staged_path(url: &ObjectUrl) -> Option<PathBuf> {
    url.as_str().strip_prefix(URL_SCHEME).map(PathBuf::from)
}

/// Strip path separators and control characters so a server-supplied name
/// can't escape the target directory
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            _ => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned
    }
}

/// `name.ext`, then `name (1).ext`, `name (2).ext`, ...
fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i..]),
        _ => (name, ""),
    };
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
