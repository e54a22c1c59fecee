//! Chapter-Trawl main entry point
//!
//! This is the command-line driver for the Chapter-Trawl extractor. It only
//! wires configuration, logging and Ctrl+C to the library; storing or
//! rendering chapters is left to downstream tools reading `--json` output.

use anyhow::Context;
use chapter_trawl::config::{load_config, validate, Config};
use chapter_trawl::crawler::Crawler;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Chapter-Trawl: a polite serial-content extractor
///
/// Starts at a chapter URL, extracts the chapter text, and follows
/// "next chapter" links until the work ends or the page budget runs out.
#[derive(Parser, Debug)]
#[command(name = "chapter-trawl")]
#[command(version)]
#[command(about = "A polite serial-content extractor", long_about = None)]
struct Cli {
    /// URL of the first chapter
    #[arg(value_name = "URL")]
    start_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of pages to follow
    #[arg(short, long, default_value_t = 1)]
    max_pages: usize,

    /// Override the delay between requests (milliseconds)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Override the User-Agent header
    #[arg(long)]
    user_agent: Option<String>,

    /// Print the chapters as a JSON array on stdout
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    // Ctrl+C cancels the run
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            on_interrupt.cancel();
        }
    });

    let started = std::time::Instant::now();
    let mut crawler = Crawler::from_config(&config)?;
    let chapters = crawler
        .run(&cancel, &cli.start_url, cli.max_pages)
        .await
        .with_context(|| format!("Crawl from {} failed", cli.start_url))?;

    tracing::info!(
        "Parsed {} chapter(s) in {:?}",
        chapters.len(),
        started.elapsed()
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&chapters)?);
    } else {
        for chapter in &chapters {
            println!("{}\t{}\t{}", chapter.code, chapter.title, chapter.url);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("chapter_trawl=info,warn"),
            1 => EnvFilter::new("chapter_trawl=debug,info"),
            2 => EnvFilter::new("chapter_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file (or the stock config) and applies CLI overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(delay_ms) = cli.delay_ms {
        config.fetcher.delay_ms = delay_ms;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.fetcher.user_agent = user_agent.clone();
    }

    // Overrides go through the same checks as the file
    validate(&config).context("Invalid command-line override")?;

    Ok(config)
}
