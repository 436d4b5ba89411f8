use serde::{Deserialize, Serialize};

use crate::error::Operation;

/// User-facing strings. Any key can be overridden from the config file
/// to localize the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub list_failed: String,
    pub upload_failed: String,
    /// `{name}` is replaced with the file name
    pub download_failed: String,
    pub delete_failed: String,
    pub no_file_selected: String,
    pub unexpected: String,
    /// `{max}` is replaced with the advisory size limit in MB
    pub upload_hint: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            list_failed: "Could not load the file list.".to_string(),
            upload_failed: "Could not upload the file.".to_string(),
            download_failed: "Could not download {name}.".to_string(),
            delete_failed: "Could not delete the file.".to_string(),
            no_file_selected: "Select a file to upload.".to_string(),
            unexpected: "An unexpected error occurred.".to_string(),
            upload_hint: "Maximum file size: {max} MB".to_string(),
        }
    }
}

impl Messages {
    pub fn download_failed_for(&self, file_name: &str) -> String {
        self.download_failed.replace("{name}", file_name)
    }

    pub fn upload_hint_for(&self, max_upload_mb: u64) -> String {
        self.upload_hint.replace("{max}", &max_upload_mb.to_string())
    }

    /// Fixed message for a rejected request
    pub fn for_operation(&self, op: Operation, file_name: Option<&str>) -> String {
        match op {
            Operation::List => self.list_failed.clone(),
            Operation::Upload => self.upload_failed.clone(),
            Operation::Download => self.download_failed_for(file_name.unwrap_or_default()),
            Operation::Delete => self.delete_failed.clone(),
        }
    }
}
