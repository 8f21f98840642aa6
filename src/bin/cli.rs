//! stockwatch CLI
//!
//! Local execution entry point for the storefront inventory monitor.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use stockwatch::{
    error::Result,
    models::Config,
    pipeline::run_monitor,
    services::{
        ConsoleNotifier, HtmlFetcher, HtmlRegionCatalog, Notifier, TelegramNotifier,
        discover_regions,
    },
    storage::LocalStateStore,
    utils::http,
};

/// stockwatch - Storefront Inventory Monitor
#[derive(Parser, Debug)]
#[command(
    name = "stockwatch",
    version,
    about = "Monitors storefront inventory regions and reports stock changes"
)]
struct Cli {
    /// Path to storage directory containing config and state files
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
    /// Run a single monitor pass
    Run,

    /// Run monitor passes forever, sleeping between them
    Watch {
        /// Seconds between passes (default: monitor.scan_interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// List currently discoverable regions
    Regions,

    /// Show persisted state summary
    Info,

    /// Validate configuration
    Validate,
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

    log::info!("stockwatch starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    config.validate()?;

    let base_url = url::Url::parse(&config.storefront.base_url)?;
    let client = http::create_async_client(&config.scraper)?;

    let catalog = HtmlRegionCatalog::new(client.clone(), base_url.clone());
    let fetcher = HtmlFetcher::new(client.clone(), base_url);
    let store = LocalStateStore::new(&cli.storage_dir);

    let notifier: Box<dyn Notifier> =
        match TelegramNotifier::from_config(&config.telegram, client.clone()) {
            Some(telegram) => {
                log::info!("Telegram delivery enabled");
                Box::new(telegram)
            }
            None => {
                log::info!("Telegram not configured, printing digests to console");
                Box::new(ConsoleNotifier)
            }
        };

    match cli.command {
        Command::Run => {
            let outcome = run_monitor(&config, &catalog, &fetcher, &store, notifier.as_ref()).await?;
            log::info!(
                "Run complete: {} regions, {} changes, {} fetch failures",
                outcome.regions_discovered,
                outcome.event_count(),
                outcome.fetch_failures
            );
        }

        Command::Watch { interval } => {
            let secs = interval.unwrap_or(config.monitor.scan_interval_secs);
            log::info!("Watching every {}s, Ctrl-C to stop", secs);

            loop {
                match run_monitor(&config, &catalog, &fetcher, &store, notifier.as_ref()).await {
                    Ok(outcome) => log::info!(
                        "Pass complete: {} regions, {} changes, {} fetch failures",
                        outcome.regions_discovered,
                        outcome.event_count(),
                        outcome.fetch_failures
                    ),
                    // A failed pass never stops the watch loop.
                    Err(e) => log::error!("Monitor pass failed: {}", e),
                }

                tokio::time::sleep(Duration::from_secs(secs)).await;
            }
        }

        Command::Regions => {
            let regions = discover_regions(&catalog).await?;
            log::info!("Discovered {} regions:", regions.len());
            for region in &regions {
                println!("{:<24} {}", region.key(), region.label);
            }
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let state_path = cli.storage_dir.join("inventory.json");
            if state_path.exists() {
                let content = std::fs::read_to_string(&state_path)?;
                let state: serde_json::Value = serde_json::from_str(&content)?;
                if let Some(updated) = state.get("updated_at") {
                    log::info!("Last updated: {}", updated);
                }
                if let Some(count) = state.get("region_count") {
                    log::info!("Regions tracked: {}", count);
                }
            } else {
                log::info!("No state found yet.");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            // Already validated above; report the effective values.
            log::info!("✓ storefront.base_url = {}", config.storefront.base_url);
            log::info!("✓ scraper.user_agent = {}", config.scraper.user_agent);
            log::info!("✓ scraper.timeout_secs = {}", config.scraper.timeout_secs);
            log::info!("✓ scraper.max_concurrent = {}", config.scraper.max_concurrent);
            log::info!(
                "✓ monitor.scan_interval_secs = {}",
                config.monitor.scan_interval_secs
            );
            log::info!(
                "✓ telegram = {}",
                if config.telegram.resolve().is_some() {
                    "configured"
                } else {
                    "not configured"
                }
            );
            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}
