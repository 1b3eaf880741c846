//! Error types for the ingest pipeline, persistence, scheduling, and configuration.
//!
//! Only [`PersistError`] is allowed to surface from an ingest run. A missing
//! API key and fetch failures are absorbed by the orchestration and turned
//! into an empty snapshot.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the search provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Failure writing a snapshot to disk.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write snapshot {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Anything that can go wrong during one ingest run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no search API key configured")]
    ConfigMissing,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid cron expression {expr:?}: {source}")]
    InvalidCron {
        expr: String,
        source: cron::error::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid search endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}
