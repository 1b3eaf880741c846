//! Runtime settings.
//!
//! Settings are resolved once at startup, in precedence order: CLI flags (or
//! their environment variables), then an optional YAML file, then defaults.
//! The result is shared read-only as `Arc<Settings>`.

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::models::Region;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_LOG_LEVEL: &str = "INFO";
/// Every 6 hours.
pub const DEFAULT_CRON: &str = "0 */6 * * *";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_REGION: &str = "dach";
pub const DEFAULT_OUT_DIR: &str = "/app/data";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";

#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` puts the ingestor in degraded mode (empty snapshots).
    pub api_key: Option<String>,
    pub log_level: String,
    pub cron: String,
    pub timeout_secs: u64,
    pub region: Region,
    /// Configured region tag that was not recognized and fell back to `all`.
    pub unknown_region: Option<String>,
    pub out_dir: PathBuf,
    pub search_endpoint: Url,
}

/// Keys accepted in the YAML settings file. All optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    api_key: Option<String>,
    log_level: Option<String>,
    cron: Option<String>,
    timeout_secs: Option<u64>,
    region: Option<String>,
    out_dir: Option<PathBuf>,
    search_endpoint: Option<String>,
}

impl Settings {
    /// Resolve settings from parsed CLI arguments and the optional YAML file they name.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => read_file_settings(path)?,
            None => FileSettings::default(),
        };
        Self::merge(cli, file)
    }

    fn merge(cli: &Cli, file: FileSettings) -> Result<Self, ConfigError> {
        let api_key = cli
            .api_key
            .clone()
            .or(file.api_key)
            .filter(|k| !k.trim().is_empty());

        let region_tag = cli
            .region
            .clone()
            .or(file.region)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let region = Region::from_tag(&region_tag);
        let unknown_region = (region == Region::All
            && !region_tag.trim().eq_ignore_ascii_case("all"))
        .then_some(region_tag);

        let endpoint = cli
            .search_endpoint
            .clone()
            .or(file.search_endpoint)
            .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string());

        Ok(Self {
            api_key,
            log_level: cli
                .log_level
                .clone()
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            cron: cli
                .cron
                .clone()
                .or(file.cron)
                .unwrap_or_else(|| DEFAULT_CRON.to_string()),
            timeout_secs: cli
                .timeout_secs
                .or(file.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            region,
            unknown_region,
            out_dir: cli
                .out_dir
                .clone()
                .or(file.out_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            search_endpoint: Url::parse(&endpoint)?,
        })
    }
}

fn read_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&raw)?)
}

/// Translate a configured log level into an `EnvFilter` directive.
///
/// Accepts the usual Python-style names (`WARNING`, `CRITICAL`) as well as
/// tracing's own. Unknown values map to `info`.
pub fn log_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        "off" => "off",
        _ => "info",
    }
}
