use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use bytes::Bytes;

/// Temporary local reference to downloaded bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(pub String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait ObjectUrls: Send + Sync {
    /// Stage `data` and hand back a URL that refers to it
    fn create(&self, name_hint: &str, data: Bytes) -> Result<ObjectUrl>;

    /// Release a URL created by `create`. Failures are logged, not returned.
    fn revoke(&self, url: &ObjectUrl);
}

pub trait SaveTrigger: Send + Sync {
    /// Save the staged object under the suggested name, returns where it landed
    fn save_as(&self, url: &ObjectUrl, suggested_name: &str) -> Result<PathBuf>;
}
