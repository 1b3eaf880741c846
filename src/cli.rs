//! Command-line interface definitions.
//!
//! Every setting can be given as a flag or through its environment variable.
//! Values left unset fall through to the optional YAML file and then to the
//! built-in defaults (see [`crate::config::Settings::load`]).

use clap::Parser;
use std::path::PathBuf;

/// Collect EU AI Act news on a cron schedule and write JSON snapshots.
///
/// # Examples
///
/// ```sh
/// # Run the scheduler with the default cadence (every 6 hours)
/// ai_act_news --out-dir ./data
///
/// # One ingest for the EU region, then exit
/// ai_act_news --once --region eu --api-key YOUR_KEY
///
/// # Read settings from a YAML file
/// ai_act_news --config ./ingest.yaml
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Tavily search API key; without it, empty snapshots are written
    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log level (trace, debug, info, warning, error)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Cron expression for scheduled runs (5 or 6 fields, UTC)
    #[arg(long, env = "INGEST_CRON")]
    pub cron: Option<String>,

    /// HTTP timeout for the search request, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_S")]
    pub timeout_secs: Option<u64>,

    /// Search region: dach, eu or all
    #[arg(short, long, env = "INGEST_REGION")]
    pub region: Option<String>,

    /// Directory receiving the snapshot files
    #[arg(short, long, env = "OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Search API endpoint
    #[arg(long, env = "SEARCH_ENDPOINT")]
    pub search_endpoint: Option<String>,

    /// Run a single ingest and exit instead of starting the scheduler
    #[arg(long)]
    pub once: bool,
}
