use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use console_core::api::HttpFileApi;
use console_core::config::ConsoleConfig;
use console_core::controller::FileManagerController;
use console_core::error::ConsoleError;
use console_core::format::{format_file_size, format_uploaded_at};
use console_core::records::FileRecord;
use console_local::download::{DirectorySaver, StagingObjectUrls};
use console_local::filesystem::LocalFileReader;
use console_platform::filesystem::LocalFiles;

mod shell;

#[derive(Parser, Debug)]
#[command(name = "file-console")]
#[command(about = "Manage files stored behind an object-storage backend")]
#[command(version)]
struct Cli {
    /// Backend base URL (e.g., http://localhost:8080)
    #[arg(long, env = "CONSOLE_API_URL", global = true)]
    api_url: Option<String>,

    /// Path to config file
    #[arg(long, env = "CONSOLE_CONFIG_PATH", global = true)]
    config_path: Option<String>,

    /// Directory downloads are saved into
    #[arg(long, env = "CONSOLE_DOWNLOAD_DIR", global = true)]
    download_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "CONSOLE_LOG_LEVEL", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List stored files
    List,
    /// Upload a local file
    Upload {
        path: PathBuf,
        /// Optional free-text annotation
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Download a file by id
    Download { id: String },
    /// Delete a file by id
    Delete { id: String },
    /// Interactive console (default)
    Shell,
    /// Write the effective config to the config path
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli
        .config_path
        .map(PathBuf::from)
        .unwrap_or_else(ConsoleConfig::default_path);

    let mut config = ConsoleConfig::load_or_default(&config_path)?;

    // CLI args override config file
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    if let Some(dir) = cli.download_dir {
        config.download_dir = PathBuf::from(dir);
    }

    let command = cli.command.unwrap_or(Commands::Shell);
    if let Commands::InitConfig = command {
        config.save(&config_path)?;
        println!("config written to {}", config_path.display());
        return Ok(());
    }

    if config.api_base_url.is_empty() {
        anyhow::bail!("api URL is required (--api-url or config file)");
    }

    let controller = build_controller(&config)?;
    let files = LocalFileReader::new();

    match command {
        Commands::List => {
            controller.mount().await.map_err(|e| user_error(&controller, e))?;
            print_files(&controller.state().files);
        }
        Commands::Upload { path, description } => {
            let file = files.open(&path)?;
            controller.select_file(Some(file));
            controller.set_description(description.unwrap_or_default());
            controller.upload().await.map_err(|e| user_error(&controller, e))?;
            println!("uploaded {}", path.display());
        }
        Commands::Download { id } => {
            controller.mount().await.map_err(|e| user_error(&controller, e))?;
            let record = find_record(&controller, &id)?;
            let saved = controller
                .download(&record)
                .await
                .map_err(|e| user_error(&controller, e))?;
            println!("saved {}", saved.display());
        }
        Commands::Delete { id } => {
            controller.delete(&id).await.map_err(|e| user_error(&controller, e))?;
            println!("deleted {}", id);
        }
        Commands::Shell => shell::run(&controller, &files).await?,
        // written before the controller is built
        Commands::InitConfig => {}
    }

    Ok(())
}

fn build_controller(config: &ConsoleConfig) -> Result<FileManagerController> {
    let api = HttpFileApi::new(config).context("failed to set up backend client")?;
    Ok(FileManagerController::new(
        Arc::new(api),
        Arc::new(StagingObjectUrls::new(&config.staging_dir)),
        Arc::new(DirectorySaver::new(&config.download_dir)),
        config.messages.clone(),
    )
    .with_max_upload_mb(config.max_upload_mb))
}

/// The user-facing message, with the technical cause attached for `{:#}`
fn user_error(controller: &FileManagerController, err: ConsoleError) -> anyhow::Error {
    let message = controller
        .state()
        .error_message
        .unwrap_or_else(|| err.user_message(controller.messages()));
    anyhow::Error::new(err).context(message)
}

pub(crate) fn find_record(controller: &FileManagerController, id: &str) -> Result<FileRecord> {
    controller
        .state()
        .files
        .into_iter()
        .find(|f| f.id == id)
        .with_context(|| format!("no file with id {}", id))
}

pub(crate) fn print_files(files: &[FileRecord]) {
    if files.is_empty() {
        println!("(no files)");
        return;
    }

    let id_width = files.iter().map(|f| f.id.len()).max().unwrap_or(2).max(2);
    let name_width = files.iter().map(|f| f.file_name.len()).max().unwrap_or(4).max(4);

    println!(
        "{:<iw$}  {:<nw$}  {:>9}  {:<16}  {}",
        "ID",
        "NAME",
        "SIZE",
        "UPLOADED",
        "DESCRIPTION",
        iw = id_width,
        nw = name_width,
    );
    for f in files {
        println!(
            "{:<iw$}  {:<nw$}  {:>9}  {:<16}  {}",
            f.id,
            f.file_name,
            format_file_size(f.size),
            format_uploaded_at(&f.uploaded_at),
            f.description.as_deref().unwrap_or(""),
            iw = id_width,
            nw = name_width,
        );
    }
}
