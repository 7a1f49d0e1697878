use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use filecrypt_client::config::ApiConfig;
use filecrypt_client::download::MemoryArtifactStore;
use filecrypt_client::input::SelectedFile;
use filecrypt_client::transport::HttpTransport;
use filecrypt_client::{OperationController, OperationKind};

#[derive(Parser)]
#[command(name = "filecrypt")]
#[command(about = "Encrypt, decrypt and verify files through the filecrypt API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides FILECRYPT_API_URL and FILECRYPT_ENV)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (default: none)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file
    Encrypt(OperationArgs),
    /// Decrypt a previously encrypted file (.enc)
    Decrypt(OperationArgs),
    /// Verify a file against the hash stored at encryption time
    Verify(OperationArgs),
}

impl Commands {
    fn into_parts(self) -> (OperationKind, OperationArgs) {
        match self {
            Commands::Encrypt(args) => (OperationKind::Encrypt, args),
            Commands::Decrypt(args) => (OperationKind::Decrypt, args),
            Commands::Verify(args) => (OperationKind::Verify, args),
        }
    }
}

#[derive(Args)]
struct OperationArgs {
    /// File to upload
    #[arg(short, long)]
    file: PathBuf,

    /// Username the file is stored under
    #[arg(short, long)]
    username: String,

    /// Secret keyword
    #[arg(short, long, env = "FILECRYPT_KEYWORD", hide_env_values = true)]
    keyword: String,

    /// Directory for the processed file
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("filecrypt: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match cli.api_url {
        Some(url) => ApiConfig::new(url)?,
        None => ApiConfig::from_env()?,
    };
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let (kind, args) = cli.command.into_parts();
    let file = SelectedFile::from_path(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let transport = HttpTransport::new(config)?;
    let mut controller = OperationController::new(transport, MemoryArtifactStore::new());
    controller.select_operation(kind);
    controller.set_identity(args.username);
    controller.set_keyword(args.keyword);
    controller.set_file(file);

    let report = controller.dispatch(kind).await;
    println!("{}", report.status);

    if let Some(message) = &report.server_message {
        println!("Server: {message}");
    }

    if report.artifact.is_some() {
        let path = controller
            .save_artifact(&args.out_dir)
            .await
            .with_context(|| format!("failed to save into {}", args.out_dir.display()))?;
        println!("Saved: {}", path.display());
    }

    controller.close();

    Ok(if report.status.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
