//! Records returned by the file backend and the shapes of its list response.

use serde::{Deserialize, Deserializer, Serialize};

/// Metadata for one stored file, as supplied by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Opaque id, unique within one listing. Numeric ids are kept as text.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub file_name: String,
    pub size: u64,
    /// ISO-8601 timestamp
    pub uploaded_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Body of GET /api/files. Older servers return a bare array, newer ones
/// wrap it in `{ "files": [...] }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListPayload {
    Bare(Vec<FileRecord>),
    Wrapped {
        #[serde(default)]
        files: Option<Vec<FileRecord>>,
    },
    Empty,
}

impl ListPayload {
    pub fn into_files(self) -> Vec<FileRecord> {
        match self {
            ListPayload::Bare(files) => files,
            ListPayload::Wrapped { files } => files.unwrap_or_default(),
            ListPayload::Empty => Vec::new(),
        }
    }
}

impl From<Vec<FileRecord>> for ListPayload {
    fn from(files: Vec<FileRecord>) -> Self {
        ListPayload::Bare(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
        "id": "f1",
        "fileName": "report.pdf",
        "size": 2048,
        "uploadedAt": "2024-03-01T10:00:00Z",
        "contentType": "application/pdf",
        "description": "Q1"
    }"#;

    #[test]
    fn test_record_fields() {
        let rec: FileRecord = serde_json::from_str(RECORD).unwrap();
        assert_eq!(rec.id, "f1");
        assert_eq!(rec.file_name, "report.pdf");
        assert_eq!(rec.size, 2048);
        assert_eq!(rec.uploaded_at, "2024-03-01T10:00:00Z");
        assert_eq!(rec.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(rec.description.as_deref(), Some("Q1"));
    }

    #[test]
    fn test_record_optional_fields_and_numeric_id() {
        let rec: FileRecord = serde_json::from_str(
            r#"{"id": 42, "fileName": "a.txt", "size": 0, "uploadedAt": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(rec.id, "42");
        assert!(rec.content_type.is_none());
        assert!(rec.description.is_none());
    }

    #[test]
    fn test_record_rejects_negative_size() {
        let res: Result<FileRecord, _> = serde_json::from_str(
            r#"{"id": "x", "fileName": "a", "size": -1, "uploadedAt": ""}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_list_payload_shapes() {
        let bare: ListPayload = serde_json::from_str(&format!("[{}]", RECORD)).unwrap();
        assert_eq!(bare.into_files().len(), 1);

        let wrapped: ListPayload =
            serde_json::from_str(&format!(r#"{{"files": [{}, {}]}}"#, RECORD, RECORD)).unwrap();
        assert_eq!(wrapped.into_files().len(), 2);

        let empty_array: ListPayload = serde_json::from_str("[]").unwrap();
        assert!(empty_array.into_files().is_empty());

        let null_files: ListPayload = serde_json::from_str(r#"{"files": null}"#).unwrap();
        assert!(null_files.into_files().is_empty());

        let null: ListPayload = serde_json::from_str("null").unwrap();
        assert!(null.into_files().is_empty());
    }

    #[test]
    fn test_list_payload_rejects_garbage() {
        assert!(serde_json::from_str::<ListPayload>(r#"[{"id": "x"}]"#).is_err());
        assert!(serde_json::from_str::<ListPayload>("42").is_err());
    }
}
