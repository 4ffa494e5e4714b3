use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use recordbookd::conf::Settings;
use recordbookd::ipc::AppState;
use recordbookd::{backup, db, http, ipc};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "student record book service")]
struct Cmd {
    /// Directory holding records.sqlite3 (overrides RECORDBOOK_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    /// Serve the HTTP endpoint and pages.
    Serve {
        #[arg(long)]
        listen: Option<String>,
    },
    /// Answer line-delimited JSON requests on stdin.
    Stdio,
    #[command(subcommand)]
    Backup(BackupCommand),
}

#[derive(Subcommand)]
enum BackupCommand {
    Export { out: PathBuf },
    Import { input: PathBuf },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cmd::parse();
    let mut settings = Settings::new().context("invalid RECORDBOOK_* configuration")?;
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }
    init_logging(&settings.log);

    let state = AppState::new(settings.data_dir.clone());
    match args.command {
        Some(SubCommandType::Serve { listen }) => {
            db::open_db(&settings.data_dir)?;
            let addr = listen.unwrap_or(settings.listen_addr);
            http::listen(state, &addr).await?;
        }
        Some(SubCommandType::Backup(BackupCommand::Export { out })) => {
            let summary = backup::export_bundle(&settings.data_dir, &out)?;
            tracing::info!(format = %summary.bundle_format, sha256 = %summary.db_sha256, "export done");
        }
        Some(SubCommandType::Backup(BackupCommand::Import { input })) => {
            let summary = backup::import_bundle(&input, &settings.data_dir)?;
            tracing::info!(format = %summary.bundle_format_detected, "import done");
        }
        Some(SubCommandType::Stdio) | None => {
            db::open_db(&settings.data_dir)?;
            tokio::task::spawn_blocking(move || {
                let stdin = std::io::stdin();
                ipc::serve_lines(&state, stdin.lock(), std::io::stdout())
            })
            .await
            .context("stdio loop failed")??;
        }
    }
    Ok(())
}
