//! # AI Act News
//!
//! A small ingest service that periodically asks the Tavily search API for
//! news about the EU AI Act, keeps the relevant hits, and stores each run as
//! a dated JSON snapshot.
//!
//! ## Usage
//!
//! ```sh
//! TAVILY_API_KEY=... ai_act_news --region dach --out-dir ./data
//! ```
//!
//! ## Architecture
//!
//! 1. **Scheduling**: One run at startup, then one per cron tick ([`scheduler`])
//! 2. **Querying**: Region-scoped search for AI Act name variants ([`ingest::query`])
//! 3. **Filtering**: Keyword match, title dedup, cap at 20 ([`ingest::filter`])
//! 4. **Output**: One `news-{region}-{timestamp}.json` file per run ([`outputs::json`])
//!
//! Everything runs on a single-threaded tokio runtime. SIGINT/SIGTERM stop
//! the scheduler, which waits up to the HTTP timeout for in-flight runs.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod outputs;
mod scheduler;
mod utils;

use api::TavilyClient;
use cli::Cli;
use config::{Settings, log_directive};
use ingest::Ingestor;
use scheduler::Scheduler;
use utils::ensure_writable_dir;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let settings = Arc::new(Settings::load(&args)?);

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(&settings.log_level)));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    if let Some(tag) = &settings.unknown_region {
        warn!(region = %tag, "Unknown region; using 'all'");
    }

    info!(
        region = %settings.region,
        cron = %settings.cron,
        out_dir = %settings.out_dir.display(),
        api_key_set = settings.api_key.is_some(),
        "ai_act_news starting up"
    );

    if let Err(e) = ensure_writable_dir(&settings.out_dir).await {
        warn!(
            path = %settings.out_dir.display(),
            error = %e,
            "Output directory is not writable; snapshot writes will fail until this is fixed"
        );
    }

    let timeout = Duration::from_secs(settings.timeout_secs);
    let client = TavilyClient::new(settings.search_endpoint.clone(), timeout)?;
    let ingestor = Ingestor::new(client, Arc::clone(&settings));

    if args.once {
        let report = ingestor.ingest().await?;
        info!(
            items = report.item_count,
            path = %report.saved_path.display(),
            "Single ingest complete"
        );
        return Ok(());
    }

    let scheduler = Scheduler::new(ingestor, &settings.cron, timeout)?;
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    scheduler.run(shutdown).await;
    Ok(())
}

/// Cancel `token` on Ctrl-C or, on Unix, SIGTERM.
#[instrument(level = "debug", skip_all)]
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Received stop signal; shutting down");
    token.cancel();
}
