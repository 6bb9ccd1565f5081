//! loc-harvest main entry point
//!
//! This is the command-line interface for the resumable archive harvester.

use anyhow::Context;
use clap::Parser;
use loc_harvest::config::{load_config_with_hash, Config};
use loc_harvest::harvest::{plan_jobs, run_harvest};
use loc_harvest::output::{print_checkpoint_stats, print_summary};
use loc_harvest::storage::open_checkpoint_store;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// loc-harvest: a resumable harvester for the Library of Congress API
///
/// For every configured candidate, loc-harvest walks the paginated newspaper
/// search results, fetches each item's full text and metadata, and writes one
/// CSV table. Progress is checkpointed, so a run stopped by a rate limit
/// resumes where it left off.
#[derive(Parser, Debug)]
#[command(name = "loc-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable harvester for paginated archive APIs", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Clear each job's checkpoint before fetching
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    fresh: bool,

    /// Validate config and show the planned searches without any network traffic
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// List stored checkpoints and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_harvest(config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("loc_harvest=info,warn"),
            1 => EnvFilter::new("loc_harvest=debug,info"),
            2 => EnvFilter::new("loc_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the planned jobs
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== loc-harvest Dry Run ===\n");

    println!("User Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nPacing:");
    println!(
        "  Page delay: {}ms every {} pages",
        config.pacing.page_delay, config.pacing.page_throttle_every
    );
    println!("  Item delay: {}ms", config.pacing.item_delay);
    println!("  Retry delay: {}ms", config.pacing.retry_delay);

    println!("\nCheckpoints:");
    println!("  Backend: {:?}", config.checkpoint.backend);
    println!("  Path: {}", config.checkpoint.path);
    println!("\nOutput table: {}", config.output.table_path);

    let plan = plan_jobs(config).context("failed to build search URLs")?;

    println!("\nJobs ({}):", plan.len());
    for job in &plan {
        match &job.key {
            Some(key) => println!("  - {} ({})", key, job.year),
            None => println!("  - <no job key, will be skipped> ({})", job.year),
        }
        println!("    {}", job.url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: lists stored checkpoints
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Checkpoints: {}\n", config.checkpoint.path);

    let store = open_checkpoint_store(&config.checkpoint)
        .context("failed to open checkpoint store")?;
    let checkpoints = store.list().context("failed to list checkpoints")?;
    print_checkpoint_stats(&checkpoints);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh harvest (clearing checkpoints)");
    } else {
        tracing::info!("Starting harvest (resuming from checkpoints where present)");
    }
    tracing::info!("Candidates: {}", config.candidates.len());

    let summary = run_harvest(config, fresh).await.context("harvest failed")?;
    print_summary(&summary);

    Ok(())
}
