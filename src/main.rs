//! Tumblr-Mirror main entry point
//!
//! Command-line interface for mirroring a single tumblr blog into a local
//! SQLite database.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tumblr_mirror::config::{DEFAULT_MS_PER_REQUEST, DEFAULT_REQUEST_TIMEOUT_SECS};
use tumblr_mirror::{mirror, MirrorConfig};

/// Tumblr-Mirror: a polite single-site archiver
///
/// Discovers pages via the blog's robots.txt and sitemaps, follows
/// same-origin links breadth-first, and stores every fetched page in a
/// SQLite database keyed by canonical URL. Re-running against the same
/// database refreshes content in place.
#[derive(Parser, Debug)]
#[command(name = "tumblr-mirror")]
#[command(version)]
#[command(about = "Mirrors a tumblr blog to a local database", long_about = None)]
struct Cli {
    /// Name of tumblr to mirror
    #[arg(long = "tumblr_name", value_name = "NAME")]
    tumblr_name: String,

    /// Database file to use
    #[arg(long = "db_file", value_name = "PATH")]
    db_file: PathBuf,

    /// Milliseconds between network requests
    #[arg(long = "request_time", value_name = "MILLIS", default_value_t = DEFAULT_MS_PER_REQUEST)]
    request_time: u64,

    /// HTTP request timeout in seconds
    #[arg(long = "request_timeout", value_name = "SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = MirrorConfig::for_tumblr(
        &cli.tumblr_name,
        cli.db_file,
        cli.request_time,
        Duration::from_secs(cli.request_timeout),
    )?;

    tracing::info!("starting up");
    let stats = mirror(config).await?;
    tracing::info!(
        "shutting down: {} pages stored this run",
        stats.pages_stored
    );

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tumblr_mirror=info,warn"),
            1 => EnvFilter::new("tumblr_mirror=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
