use clap::Parser;
use miette::{IntoDiagnostic, Result};
use reseller_ledger::application::ledger::LedgerService;
use reseller_ledger::config::{ENV_CONFIG_PATH, LedgerConfig};
use reseller_ledger::infrastructure::in_memory::{
    InMemoryResellerStore, InMemorySaleStore, InMemorySettlementStore,
};
#[cfg(feature = "storage-rocksdb")]
use reseller_ledger::infrastructure::rocksdb::RocksDBStore;
use reseller_ledger::interfaces::csv::command_reader::CommandReader;
use reseller_ledger::interfaces::csv::report_writer::ReportWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command journal CSV file
    input: PathBuf,

    /// Ledger configuration file (TOML)
    #[arg(long, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = LedgerConfig::load(cli.config.as_deref()).into_diagnostic()?;
    let ledger = open_ledger(cli.db_path)?;

    if !config.default_tiers.is_empty() || config.apply_defaults_to_all {
        ledger
            .set_default_tiers(config.default_tiers, config.apply_defaults_to_all)
            .await
            .into_diagnostic()?;
    }

    // Replay the journal
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (record, cmd_result) in reader.commands().enumerate() {
        match cmd_result {
            Ok(cmd) => {
                let kind = cmd.r#type;
                if let Err(e) = ledger.process_command(cmd).await {
                    warn!(record = record + 1, command = ?kind, "Error processing command: {e}");
                }
            }
            Err(e) => {
                warn!(record = record + 1, "Error reading command: {e}");
            }
        }
    }

    let summaries = ledger.into_results().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_summaries(&summaries).into_diagnostic()?;

    Ok(())
}

fn in_memory_ledger() -> LedgerService {
    LedgerService::new(
        Box::new(InMemoryResellerStore::new()),
        Box::new(InMemorySaleStore::new()),
        Box::new(InMemorySettlementStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_ledger(db_path: Option<PathBuf>) -> Result<LedgerService> {
    match db_path {
        Some(db_path) => {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            Ok(LedgerService::new(
                Box::new(store.clone()),
                Box::new(store.clone()),
                Box::new(store),
            ))
        }
        None => Ok(in_memory_ledger()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_ledger(db_path: Option<PathBuf>) -> Result<LedgerService> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_ledger())
}
