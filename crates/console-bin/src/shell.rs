//! Line-oriented console over stdin. Mounts the controller the way the web
//! page does, then maps each command onto one controller operation.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use console_core::controller::{ConsoleState, FileManagerController};
use console_core::format::format_file_size;
use console_platform::filesystem::LocalFiles;

use crate::{find_record, print_files};

const HELP: &str = "\
commands:
  ls | refresh        reload the file list
  select <path>       choose a local file to upload
  describe <text>     set the description for the pending upload
  upload              upload the selected file
  get <id>            download a file
  rm <id>             delete a file
  status              show pending upload and in-flight flags
  help                show this help
  quit                leave the console";

pub async fn run(controller: &FileManagerController, files: &dyn LocalFiles) -> Result<()> {
    println!("file console - type `help` for commands");
    println!("{}", controller.upload_hint());

    if controller.mount().await.is_ok() {
        print_files(&controller.state().files);
    }
    report_error(&controller.state());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        match dispatch(controller, files, cmd, arg).await {
            Outcome::Quit => break,
            Outcome::Local => {}
            Outcome::Operation => report_error(&controller.state()),
        }
    }

    Ok(())
}

/// What a shell command did, so stale errors are only reported after a
/// backend operation
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Quit,
    Local,
    Operation,
}

async fn dispatch(
    controller: &FileManagerController,
    files: &dyn LocalFiles,
    cmd: &str,
    arg: &str,
) -> Outcome {
    match cmd {
        "" => Outcome::Local,
        "ls" | "refresh" => {
            if controller.refresh().await.is_ok() {
                print_files(&controller.state().files);
            }
            Outcome::Operation
        }
        "select" => {
            if arg.is_empty() {
                controller.select_file(None);
                println!("selection cleared");
            } else {
                match files.open(Path::new(arg)) {
                    Ok(file) => {
                        println!("selected {} ({})", file.name, format_file_size(file.size()));
                        controller.select_file(Some(file));
                    }
                    Err(e) => println!("cannot open {}: {:#}", arg, e),
                }
            }
            Outcome::Local
        }
        "describe" => {
            controller.set_description(arg);
            Outcome::Local
        }
        "upload" => {
            if controller.upload().await.is_ok() {
                println!("uploaded");
                print_files(&controller.state().files);
            }
            Outcome::Operation
        }
        "get" => match find_record(controller, arg) {
            Ok(record) => {
                if let Ok(path) = controller.download(&record).await {
                    println!("saved {}", path.display());
                }
                Outcome::Operation
            }
            Err(e) => {
                println!("{:#}", e);
                Outcome::Local
            }
        },
        "rm" => {
            if controller.delete(arg).await.is_ok() {
                println!("deleted {}", arg);
            }
            Outcome::Operation
        }
        "status" => {
            print_status(&controller.state());
            Outcome::Local
        }
        "help" => {
            println!("{}", HELP);
            Outcome::Local
        }
        "quit" | "exit" => Outcome::Quit,
        other => {
            warn!("unknown command: {}", other);
            println!("unknown command `{}`, try `help`", other);
            Outcome::Local
        }
    }
}

fn report_error(state: &ConsoleState) {
    if let Some(message) = &state.error_message {
        println!("error: {}", message);
    }
}

fn print_status(state: &ConsoleState) {
    match &state.selected_file {
        Some(file) => println!("selected: {} ({})", file.name, format_file_size(file.size())),
        None => println!("selected: -"),
    }
    if !state.description.is_empty() {
        println!("description: {}", state.description);
    }
    println!("files: {}", state.files.len());
    println!(
        "loading: {}  uploading: {}  downloading: {}  deleting: {}",
        state.is_loading,
        state.is_uploading,
        state.active_download_id.as_deref().unwrap_or("-"),
        state.deleting_id.as_deref().unwrap_or("-"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;
    use console_core::api::{ApiError, FileApi, UploadForm};
    use console_core::messages::Messages;
    use console_core::records::ListPayload;
    use console_platform::download::{ObjectUrl, ObjectUrls, SaveTrigger};
    use console_platform::filesystem::LocalFile;

    /// Backend that is down for everything
    struct DownApi;

    #[async_trait]
    impl FileApi for DownApi {
        async fn list(&self) -> Result<ListPayload, ApiError> {
            Err(ApiError::Status(503))
        }
        async fn upload(&self, _form: UploadForm) -> Result<(), ApiError> {
            Err(ApiError::Status(503))
        }
        async fn download(&self, _id: &str) -> Result<Bytes, ApiError> {
            Err(ApiError::Status(503))
        }
        async fn delete(&self, _id: &str) -> Result<(), ApiError> {
            Err(ApiError::Status(503))
        }
    }

    struct NoUrls;

    impl ObjectUrls for NoUrls {
        fn create(&self, _name_hint: &str, _data: Bytes) -> anyhow::Result<ObjectUrl> {
            anyhow::bail!("not used")
        }
        fn revoke(&self, _url: &ObjectUrl) {}
    }

    impl SaveTrigger for NoUrls {
        fn save_as(&self, _url: &ObjectUrl, _suggested_name: &str) -> anyhow::Result<PathBuf> {
            anyhow::bail!("not used")
        }
    }

    struct NoFiles;

    impl LocalFiles for NoFiles {
        fn open(&self, path: &Path) -> anyhow::Result<LocalFile> {
            anyhow::bail!("no such file {}", path.display())
        }
    }

    fn controller() -> FileManagerController {
        FileManagerController::new(
            Arc::new(DownApi),
            Arc::new(NoUrls),
            Arc::new(NoUrls),
            Messages::default(),
        )
    }

    #[tokio::test]
    async fn test_backend_commands_are_operations() {
        let c = controller();
        for (cmd, arg) in [("ls", ""), ("refresh", ""), ("upload", ""), ("rm", "f1")] {
            assert_eq!(dispatch(&c, &NoFiles, cmd, arg).await, Outcome::Operation, "{}", cmd);
            assert!(c.state().error_message.is_some());
        }
    }

    #[tokio::test]
    async fn test_local_commands_do_not_report_old_errors() {
        let c = controller();
        assert_eq!(dispatch(&c, &NoFiles, "ls", "").await, Outcome::Operation);
        let error = c.state().error_message;
        assert!(error.is_some());

        for (cmd, arg) in [
            ("describe", "notes"),
            ("select", "/nope.txt"),
            ("status", ""),
            ("help", ""),
            ("get", "unknown-id"),
            ("bogus", ""),
            ("", ""),
        ] {
            assert_eq!(dispatch(&c, &NoFiles, cmd, arg).await, Outcome::Local, "{}", cmd);
        }
        // the stored error is untouched, it just isn't printed again
        assert_eq!(c.state().error_message, error);
        assert_eq!(c.state().description, "notes");
    }

    #[tokio::test]
    async fn test_quit() {
        let c = controller();
        assert_eq!(dispatch(&c, &NoFiles, "quit", "").await, Outcome::Quit);
        assert_eq!(dispatch(&c, &NoFiles, "exit", "").await, Outcome::Quit);
    }
}
