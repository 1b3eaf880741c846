//! Search provider access.
//!
//! The module uses a trait-based design so the ingest pipeline can run
//! against a fake provider in tests:
//! - [`SearchClient`]: Core trait issuing one search request
//! - [`TavilyClient`]: `reqwest`-backed implementation for the Tavily API
//! - [`fetch_news`]: Builds the request and maps provider results to [`NewsItem`]s
//!
//! There is no retry logic. A failed request is reported once as a
//! [`FetchError`] and the caller decides what to do with it.

use crate::error::FetchError;
use crate::models::NewsItem;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Tavily-Api-Key";
pub const SEARCH_DEPTH: &str = "advanced";
pub const MAX_RESULTS: u32 = 12;

/// Body of a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub search_depth: &'static str,
    pub max_results: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_depth: SEARCH_DEPTH,
            max_results: MAX_RESULTS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One hit as reported by the provider. Every field may be absent or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
}

impl From<SearchResult> for NewsItem {
    fn from(res: SearchResult) -> Self {
        NewsItem {
            title: res.title.unwrap_or_default(),
            url: res.url.unwrap_or_default(),
            snippet: res.content.unwrap_or_default(),
            published: res.published_date.filter(|d| !d.trim().is_empty()),
        }
    }
}

/// Something that can run a search against the provider.
pub trait SearchClient {
    /// Send `request` authenticated with `api_key`.
    ///
    /// Transport errors and non-success statuses are both reported as
    /// [`FetchError`].
    fn search(
        &self,
        api_key: &str,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, FetchError>> + Send;
}

/// Tavily search over HTTPS.
#[derive(Debug, Clone)]
pub struct TavilyClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl TavilyClient {
    /// Build a client whose requests time out after `timeout`.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }
}

impl SearchClient for TavilyClient {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint))]
    async fn search(
        &self,
        api_key: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, FetchError> {
        let t0 = Instant::now();
        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Search provider returned an error status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed = resp.json::<SearchResponse>().await?;
        debug!(
            results = parsed.results.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Search request succeeded"
        );
        Ok(parsed)
    }
}

/// Run `query` against the provider and map the hits to [`NewsItem`]s.
///
/// Provider order is preserved. The request always asks for
/// [`SEARCH_DEPTH`] depth and at most [`MAX_RESULTS`] results.
///
/// # Arguments
///
/// * `client` - The search provider
/// * `api_key` - Key sent in the [`API_KEY_HEADER`] header
/// * `query` - Query string from [`crate::ingest::query::build_query`]
///
/// # Returns
///
/// The mapped items, or the provider's [`FetchError`] unchanged.
#[instrument(level = "info", skip_all)]
pub async fn fetch_news<C: SearchClient>(
    client: &C,
    api_key: &str,
    query: &str,
) -> Result<Vec<NewsItem>, FetchError> {
    let request = SearchRequest::new(query);
    let response = client.search(api_key, &request).await?;
    let items: Vec<NewsItem> = response.results.into_iter().map(NewsItem::from).collect();
    info!(count = items.len(), "Fetched search results");
    Ok(items)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory provider used across the crate's tests.
    #[derive(Debug)]
    pub(crate) struct FakeClient {
        outcome: Result<Vec<SearchResult>, u16>,
        pub calls: AtomicUsize,
        pub last_request: Mutex<Option<(String, SearchRequest)>>,
    }

    impl FakeClient {
        pub(crate) fn returning(results: Vec<SearchResult>) -> Self {
            Self {
                outcome: Ok(results),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub(crate) fn failing(status: u16) -> Self {
            Self {
                outcome: Err(status),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SearchClient for FakeClient {
        async fn search(
            &self,
            api_key: &str,
            request: &SearchRequest,
        ) -> Result<SearchResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some((api_key.to_string(), request.clone()));
            match &self.outcome {
                Ok(results) => Ok(SearchResponse {
                    results: results.clone(),
                }),
                Err(status) => Err(FetchError::Status {
                    status: *status,
                    body: "upstream unavailable".to_string(),
                }),
            }
        }
    }

    pub(crate) fn result(title: &str, content: &str) -> SearchResult {
        SearchResult {
            title: Some(title.to_string()),
            url: Some(format!(
                "https://example.de/{}",
                title.to_lowercase().replace(' ', "-")
            )),
            content: Some(content.to_string()),
            published_date: None,
        }
    }

    /// Serve one canned HTTP response on a local port and hand back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: String,
    ) -> (Url, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });

        let url = Url::parse(&format!("http://{addr}/search")).unwrap();
        (url, handle)
    }

    #[tokio::test]
    async fn test_tavily_client_error_status_is_fetch_error() {
        let (url, server) = serve_once("HTTP/1.1 503 Service Unavailable", "x".repeat(400)).await;
        let client = TavilyClient::new(url, Duration::from_secs(5)).unwrap();

        let err = client
            .search("key-123", &SearchRequest::new("\"AI Act\""))
            .await
            .unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, format!("{}…(+100 bytes)", "x".repeat(300)));
            }
            other => panic!("expected status error, got {other:?}"),
        }

        let request = server.await.unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /search "), "{request}");
        assert!(lower.contains("x-tavily-api-key: key-123"), "{request}");
        assert!(request.contains(r#""search_depth":"advanced""#), "{request}");
        assert!(request.contains(r#""max_results":12"#), "{request}");
    }

    #[tokio::test]
    async fn test_tavily_client_parses_success() {
        let body = r#"{"results":[{"title":"AI Act passes","url":"https://a.de","content":"Brüssel","published_date":null}]}"#;
        let (url, server) = serve_once("HTTP/1.1 200 OK", body.to_string()).await;
        let client = TavilyClient::new(url, Duration::from_secs(5)).unwrap();

        let items = fetch_news(&client, "key-123", "q").await.unwrap();
        assert_eq!(
            items,
            vec![NewsItem {
                title: "AI Act passes".to_string(),
                url: "https://a.de".to_string(),
                snippet: "Brüssel".to_string(),
                published: None,
            }]
        );
        assert!(server.await.unwrap().contains(r#""query":"q""#));
    }

    #[test]
    fn test_search_request_body() {
        let body = serde_json::to_value(SearchRequest::new("\"AI Act\"")).unwrap();
        assert_eq!(body["query"], "\"AI Act\"");
        assert_eq!(body["search_depth"], "advanced");
        assert_eq!(body["max_results"], 12);
    }

    #[test]
    fn test_response_mapping() {
        let json = r#"{
            "results": [
                {"title": "AI Act passes", "url": "https://a.de", "content": "Text", "published_date": "2025-05-06"},
                {"title": "No date", "url": "https://b.at", "content": "Text", "published_date": ""},
                {"title": "Null date", "url": "https://c.ch", "content": null, "published_date": null},
                {"url": "https://d.de"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let items: Vec<NewsItem> = response.results.into_iter().map(NewsItem::from).collect();

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].published.as_deref(), Some("2025-05-06"));
        assert_eq!(items[0].snippet, "Text");
        assert_eq!(items[1].published, None);
        assert_eq!(items[2].published, None);
        assert_eq!(items[2].snippet, "");
        assert_eq!(items[3].title, "");
    }

    #[test]
    fn test_missing_results_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"answer": null}"#).unwrap();
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_news_sends_key_and_request() {
        let client = FakeClient::returning(vec![result("AI Act passes", "Brussels")]);
        let items = fetch_news(&client, "key-123", "q").await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(client.calls(), 1);
        let (key, request) = client.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(key, "key-123");
        assert_eq!(request, SearchRequest::new("q"));
    }

    #[tokio::test]
    async fn test_fetch_news_propagates_status_error() {
        let client = FakeClient::failing(502);
        let err = fetch_news(&client, "key", "q").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 502, .. }));
    }
}
