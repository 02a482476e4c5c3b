use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use readme_feed::app::{self, Output};
use readme_feed::config::Config;
use readme_feed::feed::FeedFetcher;

#[derive(Parser, Debug)]
#[command(
    name = "readme-feed",
    about = "Refresh the blog section of a README from an RSS/Atom feed"
)]
struct Args {
    /// README to rewrite
    #[arg(long, value_name = "FILE", default_value = "README.md")]
    readme: PathBuf,

    /// Optional TOML config file (environment variables take precedence)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the regenerated README to stdout instead of writing it (logs go to stderr)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let output = if args.dry_run {
        Output::Print
    } else {
        Output::Write
    };

    // Diagnostics go to stdout unless stdout carries the document
    let log_writer = if output.logs_to_stderr() {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(log_writer)
        .init();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => Config::default(),
    }
    .apply_env()
    .context("Invalid configuration in environment")?;
    tracing::debug!(config = ?config, "Resolved configuration");

    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let fetcher = FeedFetcher::new(client, config.request_timeout());

    let outcome = app::run(&config, &fetcher, &args.readme, output)
        .await
        .context("Failed to refresh README")?;

    // NoEntries is a successful run too: exit 0 either way
    tracing::debug!(outcome = ?outcome, "Run complete");

    Ok(())
}
