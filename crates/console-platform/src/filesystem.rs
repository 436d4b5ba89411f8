use std::path::Path;

use anyhow::Result;
use bytes::Bytes;

/// A local file chosen for upload, held in memory until it is sent
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl LocalFile {
    pub fn new(
        name: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type,
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

pub trait LocalFiles: Send + Sync {
    /// Read a file from local storage so it can be selected for upload
    fn open(&self, path: &Path) -> Result<LocalFile>;
}
