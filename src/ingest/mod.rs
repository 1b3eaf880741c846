//! The ingest pipeline.
//!
//! One run walks these stages strictly in sequence:
//! 1. **Query**: Build the region-scoped search query ([`query`])
//! 2. **Fetch**: Run it against the search provider ([`crate::api`])
//! 3. **Filter**: Keep AI Act mentions, drop repeated titles, cap the list ([`filter`])
//! 4. **Persist**: Write the [`Snapshot`] ([`crate::outputs::json`])
//!
//! A missing API key or a failed fetch still produces a valid, empty
//! snapshot. Only persistence failures make a run fail.

pub mod filter;
pub mod query;

use crate::api::{SearchClient, fetch_news};
use crate::config::Settings;
use crate::error::IngestError;
use crate::models::{IngestReport, NewsItem, Snapshot};
use crate::outputs::json;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A unit of work the scheduler can run repeatedly.
pub trait IngestJob: Send + Sync + 'static {
    fn run(&self) -> impl Future<Output = Result<IngestReport, IngestError>> + Send;
}

/// Context for ingest runs: the search client plus read-only settings.
#[derive(Debug)]
pub struct Ingestor<C> {
    client: C,
    settings: Arc<Settings>,
}

impl<C: SearchClient + Sync> Ingestor<C> {
    pub fn new(client: C, settings: Arc<Settings>) -> Self {
        Self { client, settings }
    }

    /// Run the full pipeline once and persist the snapshot.
    ///
    /// # Errors
    ///
    /// Only [`IngestError::Persist`] is ever returned.
    #[instrument(level = "info", skip_all, fields(region = %self.settings.region))]
    pub async fn ingest(&self) -> Result<IngestReport, IngestError> {
        let started = Utc::now();

        let items = match self.collect().await {
            Ok(items) => items,
            Err(IngestError::ConfigMissing) => {
                info!("No search API key set; writing empty snapshot");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Fetch failed; writing empty snapshot");
                Vec::new()
            }
        };

        let snapshot = Snapshot::new(started, self.settings.region, items);
        let report = json::write_snapshot(&snapshot, &self.settings.out_dir).await?;
        info!(
            path = %report.saved_path.display(),
            items = report.item_count,
            "Snapshot saved"
        );
        Ok(report)
    }

    /// Query, fetch, filter and dedup.
    async fn collect(&self) -> Result<Vec<NewsItem>, IngestError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(IngestError::ConfigMissing)?;

        let query = query::build_query(self.settings.region);
        let raw = fetch_news(&self.client, api_key, &query).await?;
        let raw_count = raw.len();

        let matching = filter::filter_ai_act(raw);
        let matching_count = matching.len();
        let items = filter::dedup_and_cap(matching);

        info!(
            fetched = raw_count,
            matching = matching_count,
            kept = items.len(),
            "Filtered search results"
        );
        Ok(items)
    }
}

impl<C> IngestJob for Ingestor<C>
where
    C: SearchClient + Send + Sync + 'static,
{
    fn run(&self) -> impl Future<Output = Result<IngestReport, IngestError>> + Send {
        self.ingest()
    }
}
