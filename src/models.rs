//! Data models for news items and the snapshots they are persisted in.
//!
//! - [`Region`]: Site scope applied to the search query
//! - [`NewsItem`]: A single search hit after mapping from the provider schema
//! - [`Snapshot`]: One ingest run's worth of items, written as a JSON file
//! - [`IngestReport`]: What a run produced, for logging by the caller

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Geographic site scope for the search query.
///
/// Configuration values other than `dach` and `eu` resolve to [`Region::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// German-speaking countries: `.de`, `.at`, `.ch`.
    #[default]
    Dach,
    /// Official EU domains.
    Eu,
    /// Union of both scopes.
    All,
}

impl Region {
    /// Resolve a configured region tag, falling back to [`Region::All`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "dach" => Region::Dach,
            "eu" => Region::Eu,
            _ => Region::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Dach => "dach",
            Region::Eu => "eu",
            Region::All => "all",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A news hit as stored in a snapshot.
///
/// `published` is `None` when the provider did not report a date; it is
/// serialized as `null`, never as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub published: Option<String>,
}

/// The result of a single ingest run.
///
/// Each run produces one `Snapshot`, written once to
/// `news-{region}-{timestamp}.json` and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    /// When the run started, in UTC.
    pub ts: DateTime<Utc>,
    pub region: Region,
    pub items: Vec<NewsItem>,
}

impl Snapshot {
    pub fn new(ts: DateTime<Utc>, region: Region, items: Vec<NewsItem>) -> Self {
        Self { ts, region, items }
    }

    /// File name this snapshot is persisted under.
    ///
    /// Uses the compact basic ISO form at second precision, e.g.
    /// `news-dach-20250506T143000Z.json`.
    pub fn file_name(&self) -> String {
        format!(
            "news-{}-{}.json",
            self.region,
            self.ts.format("%Y%m%dT%H%M%SZ")
        )
    }
}

/// Outcome of a persisted ingest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub item_count: usize,
    pub saved_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_region_from_tag() {
        assert_eq!(Region::from_tag("dach"), Region::Dach);
        assert_eq!(Region::from_tag(" EU "), Region::Eu);
        assert_eq!(Region::from_tag("all"), Region::All);
        assert_eq!(Region::from_tag("nordics"), Region::All);
        assert_eq!(Region::from_tag(""), Region::All);
    }

    #[test]
    fn test_snapshot_file_name() {
        let ts = Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 5).unwrap();
        let snapshot = Snapshot::new(ts, Region::Eu, vec![]);
        assert_eq!(snapshot.file_name(), "news-eu-20250506T143005Z.json");
    }

    #[test]
    fn test_snapshot_serialization() {
        let ts = Utc.with_ymd_and_hms(2025, 5, 6, 8, 0, 0).unwrap();
        let snapshot = Snapshot::new(
            ts,
            Region::Dach,
            vec![NewsItem {
                title: "AI Act passes".to_string(),
                url: "https://example.de/a".to_string(),
                snippet: "Parliament votes".to_string(),
                published: None,
            }],
        );

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["region"], "dach");
        assert_eq!(value["ts"], "2025-05-06T08:00:00Z");
        assert!(value["items"][0]["published"].is_null());
    }

    #[test]
    fn test_snapshot_deserialization() {
        let json = r#"{
            "ts": "2025-05-06T08:00:00Z",
            "region": "all",
            "items": []
        }"#;

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.region, Region::All);
        assert!(snapshot.items.is_empty());
    }
}
