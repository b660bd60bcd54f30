pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

use clap::Parser;
use commands::{Cli, Command};
use config::AppConfig;
use error::AppError;
use services::classifier::client::HttpClassifier;
use services::history::HistoryLedger;
use services::store::{KeyValueStore, MemoryStore, SqliteStore};
use services::workflow::{WorkflowConfig, WorkflowController};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!("Starting corn-doctor v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::resolve(cli.overrides())?;
    let store = open_store(&config, cli.ephemeral);
    let ledger = HistoryLedger::open(store, config.history_limit());

    let classifier = HttpClassifier::new(config.endpoint.clone(), config.request_timeout())?;
    info!("Classification endpoint: {}", classifier.endpoint());

    let controller = WorkflowController::new(
        Arc::new(classifier),
        ledger,
        WorkflowConfig {
            report_connection_status: config.show_connection_status,
        },
    );

    let mut out = std::io::stdout();
    let input = tokio::io::BufReader::new(tokio::io::stdin());

    match cli.command.unwrap_or(Command::Session) {
        Command::Diagnose { path } => commands::diagnose::diagnose(&controller, &path, &mut out).await,
        Command::History => commands::history::show_history(&controller, &mut out),
        Command::ClearHistory { yes } => {
            let mut lines = input.lines();
            commands::history::clear_history(&controller, yes, &mut lines, &mut out)
                .await
                .map(|_| ())
        }
        Command::Session => commands::session::run_session(&controller, input, &mut out).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// History falls back to memory when the database cannot be opened.
fn open_store(config: &AppConfig, ephemeral: bool) -> Arc<dyn KeyValueStore> {
    if ephemeral {
        return Arc::new(MemoryStore::new());
    }

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        warn!("Cannot create data directory {}: {}", config.data_dir.display(), e);
        return Arc::new(MemoryStore::new());
    }

    let db_path = config.database_path();
    match SqliteStore::new(&db_path) {
        Ok(store) => {
            info!("History database: {}", db_path.display());
            Arc::new(store)
        }
        Err(e) => {
            warn!("Cannot open history database {}: {}; history will not persist", db_path.display(), e);
            Arc::new(MemoryStore::new())
        }
    }
}
