//! Coauthor-Ripple main entry point
//!
//! This is the command-line interface for the Coauthor-Ripple crawler.

use clap::Parser;
use coauthor_ripple::config::{load_config_with_hash, validate, Config};
use coauthor_ripple::crawler::run_crawl;
use coauthor_ripple::output::{print_statistics, CrawlStatistics, STDOUT_PATH};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Coauthor-Ripple: a polite co-authorship graph crawler
///
/// Coauthor-Ripple starts from one or more author profiles, follows the
/// co-authors listed on their publications up to a bounded depth, and
/// writes one CSV row per crawled profile.
#[derive(Parser, Debug)]
#[command(name = "coauthor-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A polite co-authorship graph crawler", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Seed profile URL; replaces the configured seeds (repeatable)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Dataset path; `-` writes to stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, cli.seeds, cli.output);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid command-line override: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else {
        handle_crawl(config, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the dataset can be streamed to stdout.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("coauthor_ripple=info,warn"),
            1 => EnvFilter::new("coauthor_ripple=debug,info"),
            2 => EnvFilter::new("coauthor_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line values win over the configuration file
fn apply_overrides(config: &mut Config, seeds: Vec<String>, output: Option<String>) {
    if !seeds.is_empty() {
        tracing::info!("Using {} seed URLs from the command line", seeds.len());
        config.source.seeds = seeds;
    }

    if let Some(path) = output {
        config.output.csv_path = path;
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Coauthor-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!(
        "  Delay: {}ms + up to {}ms random",
        config.crawler.delay, config.crawler.random_delay
    );
    println!("  Allow revisit: {}", config.crawler.allow_revisit);
    println!("  Request timeout: {}s", config.crawler.request_timeout);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nSource:");
    println!("  Base URL: {}", config.source.base_url);
    println!(
        "  Allowed domains: {}",
        config.source.effective_allowed_domains().join(", ")
    );

    println!("\nSelectors:");
    println!("  Name: {}", config.selectors.name);
    println!("  Id: {}", config.selectors.id);
    println!("  Collaborator: {}", config.selectors.collaborator);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Write mode: {:?}", config.output.write_mode);

    println!("\nSeeds ({}):", config.source.seeds.len());
    for seed in &config.source.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    if config.source.seeds.is_empty() {
        println!("✗ No seed URLs: pass --seed or set [source].seeds");
    } else {
        println!(
            "✓ Would start crawling with {} seed URLs",
            config.source.seeds.len()
        );
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let to_stdout = config.output.csv_path == STDOUT_PATH;

    tracing::info!(
        "Crawling from {} seeds (max depth {}, concurrency {})",
        config.source.seeds.len(),
        config.crawler.max_depth,
        config.crawler.concurrency
    );

    match run_crawl(config).await {
        Ok(outcome) => {
            tracing::info!("Crawl completed successfully");
            // Statistics would be interleaved with the dataset on stdout
            if !quiet && !to_stdout {
                println!();
                print_statistics(&CrawlStatistics::from_outcome(&outcome));
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
