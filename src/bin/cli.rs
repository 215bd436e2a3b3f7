//! feedwatch CLI
//!
//! Local execution entry point. One `sync` invocation performs one full run;
//! scheduling is left to cron or similar.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use feedwatch::{
    config,
    error::{AppError, Result},
    models::SourceRecord,
    services::selector::parse_selector,
    storage::RecordStore,
};

/// feedwatch - Blog and Feed Change Tracker
#[derive(Parser, Debug)]
#[command(
    name = "feedwatch",
    version,
    about = "Checks tracked feeds and pages for new posts"
)]

struct Cli {
    /// Path to storage directory containing config.toml and the records file
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every eligible record once and write back changes
    Sync,

    /// Validate configuration and every record's source settings
    Validate,

    /// List records with their status and extraction strategy
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config(&cli.storage_dir)?;
    log::debug!("Loaded configuration from {}", cli.storage_dir.display());

    match cli.command {
        Command::Sync => {
            let orchestrator = config::build_orchestrator(config, &cli.storage_dir)?;
            let summary = orchestrator.run().await?;

            log::info!(
                "Checked {} records in {}s",
                summary.total(),
                (summary.finished_at - summary.started_at).num_seconds()
            );
        }

        Command::Validate => {
            log::info!("✓ Config OK");

            let store = config::open_store(&config, &cli.storage_dir);
            let records = store.list_records().await?;

            let mut problems = 0;
            for raw in &records {
                let record = SourceRecord::from_raw(raw, &config.fields);
                if let Err(e) = record.plan() {
                    problems += 1;
                    log::warn!("[{}] {}", record.label(), e);
                }
                if let Some(selector) = &record.selector {
                    if let Err(e) = parse_selector(selector) {
                        problems += 1;
                        log::warn!("[{}] {}", record.label(), e);
                    }
                }
            }

            if problems > 0 {
                log::error!("{} problems in {} records", problems, records.len());
                return Err(AppError::validation(format!(
                    "{problems} record problems found"
                )));
            }
            log::info!("✓ {} records OK", records.len());
        }

        Command::Info => {
            let store = config::open_store(&config, &cli.storage_dir);
            log::info!("Records file: {}", store.path().display());

            let records = store.list_records().await?;
            for raw in &records {
                let record = SourceRecord::from_raw(raw, &config.fields);
                let strategy = record
                    .plan()
                    .map(|plan| plan.describe())
                    .unwrap_or("unconfigured");
                let eligibility = if record.status.is_eligible() {
                    "checked"
                } else {
                    "skipped"
                };
                log::info!(
                    "{} [{}] {} via {}; last: {}",
                    record.label(),
                    record.status,
                    eligibility,
                    strategy,
                    if record.last_url.is_empty() {
                        "(never captured)"
                    } else {
                        record.last_url.as_str()
                    }
                );
            }
            log::info!("{} records", records.len());
        }
    }

    Ok(())
}
