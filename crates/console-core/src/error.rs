use std::fmt;

use thiserror::Error;

use crate::api::ApiError;
use crate::messages::Messages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Upload,
    Download,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::List => "list",
            Operation::Upload => "upload",
            Operation::Download => "download",
            Operation::Delete => "delete",
        })
    }
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("no file selected for upload")]
    NoFileSelected,

    #[error("{op} failed: {source}")]
    Api {
        op: Operation,
        file_name: Option<String>,
        #[source]
        source: ApiError,
    },

    #[error("failed to save {file_name}: {reason}")]
    Save { file_name: String, reason: String },
}

impl ConsoleError {
    pub fn api(op: Operation, source: ApiError) -> Self {
        ConsoleError::Api {
            op,
            file_name: None,
            source,
        }
    }

    /// Text shown to the user. Server bodies are never surfaced; rejected
    /// requests map to one fixed message per operation.
    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            ConsoleError::NoFileSelected => messages.no_file_selected.clone(),
            ConsoleError::Api {
                op,
                file_name,
                source,
            } => match source {
                ApiError::Status(_) => messages.for_operation(*op, file_name.as_deref()),
                ApiError::Transport(msg) | ApiError::Decode(msg) if !msg.trim().is_empty() => {
                    msg.clone()
                }
                _ => messages.unexpected.clone(),
            },
            ConsoleError::Save { file_name, .. } => messages.download_failed_for(file_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let m = Messages::default();

        assert_eq!(ConsoleError::NoFileSelected.user_message(&m), m.no_file_selected);
        assert_eq!(
            ConsoleError::api(Operation::List, ApiError::Status(500)).user_message(&m),
            m.list_failed
        );
        assert_eq!(
            ConsoleError::Api {
                op: Operation::Download,
                file_name: Some("cat.png".into()),
                source: ApiError::Status(404),
            }
            .user_message(&m),
            "Could not download cat.png."
        );
        assert_eq!(
            ConsoleError::api(Operation::Delete, ApiError::Transport("connection refused".into()))
                .user_message(&m),
            "connection refused"
        );
        assert_eq!(
            ConsoleError::api(Operation::Upload, ApiError::Transport(String::new()))
                .user_message(&m),
            m.unexpected
        );
        assert_eq!(
            ConsoleError::Save {
                file_name: "a.txt".into(),
                reason: "disk full".into(),
            }
            .user_message(&m),
            "Could not download a.txt."
        );
    }
}
