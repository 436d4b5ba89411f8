use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console_platform::filesystem::{LocalFile, LocalFiles};

pub struct LocalFileReader;

impl LocalFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalFiles for LocalFileReader {
    fn open(&self, path: &Path) -> Result<LocalFile> {
        let meta = fs::metadata(path)
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if meta.is_dir() {
            anyhow::bail!("{} is a directory", path.display());
        }

        let data =
            fs::read(path).with_context(|| format!("failed to read file {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let content_type = mime_guess::from_path(path).first().map(|m| m.essence_str().to_string());

        tracing::debug!("opened {} ({} bytes, {:?})", path.display(), data.len(), content_type);
        Ok(LocalFile::new(name, content_type, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_reads_name_type_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, b"%PDF-1.7").unwrap();

        let file = LocalFileReader::new().open(&path).unwrap();
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(&file.data[..], b"%PDF-1.7");
        assert_eq!(file.size(), 8);
    }

    #[test]
    fn test_open_unknown_extension_has_no_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzqq");
        fs::write(&path, b"x").unwrap();

        let file = LocalFileReader::new().open(&path).unwrap();
        assert!(file.content_type.is_none());
    }

    #[test]
    fn test_open_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let reader = LocalFileReader::new();
        assert!(reader.open(&dir.path().join("missing.txt")).is_err());
        assert!(reader.open(dir.path()).is_err());
    }
}
