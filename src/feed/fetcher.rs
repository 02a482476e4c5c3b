use crate::feed::parser::{parse_feed, FeedEntry};
use crate::util::{resolve_feed_source, FeedSource, FeedSourceError};
use futures::StreamExt;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use thiserror::Error;

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// User-Agent sent with the fallback request.
pub const FALLBACK_USER_AGENT: &str = "readme-feed-updater/1.0";

/// Errors that can occur while obtaining a feed document.
///
/// None of these escape [`FeedFetcher::fetch`]; they are logged and
/// recorded on the returned [`FeedDocument`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Feed could not be parsed as RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
    /// Response body or local file exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// The feed location is not something we know how to read
    #[error("Unsupported feed location: {0}")]
    Source(#[from] FeedSourceError),
    /// Reading a local feed file failed
    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),
}

/// Entries obtained from a feed, plus the reason there are none (if any).
#[derive(Debug, Default)]
pub struct FeedDocument {
    pub entries: Vec<FeedEntry>,
    pub error: Option<FetchError>,
}

impl FeedDocument {
    fn from_result(result: Result<Vec<FeedEntry>, FetchError>) -> Self {
        match result {
            Ok(entries) => Self {
                entries,
                error: None,
            },
            Err(e) => Self {
                entries: Vec::new(),
                error: Some(e),
            },
        }
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Resolves a feed URL into a [`FeedDocument`].
///
/// Holds the HTTP client and the timeout applied to the fallback request.
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl FeedFetcher {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetches and parses a feed, falling back to an explicit request once.
    ///
    /// # Behavior
    ///
    /// - Empty `url`: returns an empty document without touching the network
    /// - Direct attempt: reads the location (HTTP, `file://` or plain path)
    ///   with no timeout and no custom headers, then parses it
    /// - If that yields no entries: one GET with the configured timeout and
    ///   `User-Agent: readme-feed-updater/1.0`
    /// - Fallback succeeded: its document is returned even when empty
    /// - Fallback failed: the direct document is returned
    pub async fn fetch(&self, url: &str) -> FeedDocument {
        if url.is_empty() {
            return FeedDocument::default();
        }

        let direct = FeedDocument::from_result(self.fetch_direct(url).await);
        if direct.has_entries() {
            tracing::debug!(url = %url, entries = direct.entries.len(), "Direct feed parse succeeded");
            return direct;
        }

        if let Some(e) = &direct.error {
            tracing::warn!(url = %url, error = %e, "Direct feed parse failed");
        }

        match self.fetch_fallback(url).await {
            Ok(bytes) => {
                let fallback = FeedDocument::from_result(parse_feed(&bytes).map_err(FetchError::from));
                if !fallback.has_entries() {
                    match &fallback.error {
                        Some(e) => tracing::warn!(
                            url = %url,
                            error = %e,
                            "Fallback feed parse returned no entries"
                        ),
                        None => tracing::warn!(url = %url, "Fallback feed parse returned no entries"),
                    }
                }
                fallback
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Fallback feed request failed");
                direct
            }
        }
    }

    async fn fetch_direct(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
        let bytes = match resolve_feed_source(url)? {
            FeedSource::Http(url) => {
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(FetchError::HttpStatus(response.status().as_u16()));
                }
                read_limited_bytes(response, MAX_FEED_SIZE).await?
            }
            FeedSource::File(path) => {
                let len = tokio::fs::metadata(&path).await?.len();
                if len as usize > MAX_FEED_SIZE {
                    return Err(FetchError::ResponseTooLarge);
                }
                tokio::fs::read(&path).await?
            }
        };

        Ok(parse_feed(&bytes)?)
    }

    async fn fetch_fallback(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tokio::time::timeout(self.timeout, self.request_with_user_agent(url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }

    async fn request_with_user_agent(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, FALLBACK_USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        read_limited_bytes(response, MAX_FEED_SIZE).await
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>测试</title><link>https://blog.example.com/a</link></item>
</channel></rss>"#;

    const EMPTY_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel></channel></rss>"#;

    fn fetcher(timeout: Duration) -> FeedFetcher {
        FeedFetcher::new(reqwest::Client::new(), timeout)
    }

    /// Client that sends every HTTP request through `server` as a proxy.
    fn proxied_fetcher(server: &MockServer) -> FeedFetcher {
        let client = reqwest::Client::builder()
            .proxy(reqwest::Proxy::all(server.uri()).unwrap())
            .build()
            .unwrap();
        FeedFetcher::new(client, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_empty_url_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .mount(&mock_server)
            .await;
        let fetcher = proxied_fetcher(&mock_server);

        let doc = fetcher.fetch("").await;
        assert!(doc.entries.is_empty());
        assert!(doc.error.is_none());
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 0);

        // The same client does reach the server for a real URL
        let doc = fetcher.fetch("http://blog.invalid/feed.xml").await;
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_direct_success_skips_fallback() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed.xml", mock_server.uri());
        let doc = fetcher(Duration::from_secs(5)).fetch(&url).await;
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].title.as_deref(), Some("测试"));
    }

    #[tokio::test]
    async fn test_fallback_sends_user_agent() {
        let mock_server = MockServer::start().await;
        // Only the fallback request carries our User-Agent
        Mock::given(method("GET"))
            .and(header("User-Agent", FALLBACK_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed.xml", mock_server.uri());
        let doc = fetcher(Duration::from_secs(5)).fetch(&url).await;
        assert_eq!(doc.entries.len(), 1);
        assert!(doc.error.is_none());
    }

    #[tokio::test]
    async fn test_fallback_empty_feed_is_returned() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RSS))
            .expect(2)
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed.xml", mock_server.uri());
        let doc = fetcher(Duration::from_secs(5)).fetch(&url).await;
        assert!(doc.entries.is_empty());
        assert!(doc.error.is_none());
    }

    #[tokio::test]
    async fn test_fallback_http_error_returns_direct_document() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed.xml", mock_server.uri());
        let doc = fetcher(Duration::from_secs(5)).fetch(&url).await;
        assert!(doc.entries.is_empty());
        // The error kept is the direct attempt's
        match doc.error {
            Some(FetchError::HttpStatus(404)) => {}
            e => panic!("Expected HttpStatus(404), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_fallback_timeout_returns_direct_document() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("User-Agent", FALLBACK_USER_AGENT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed.xml", mock_server.uri());
        let doc = fetcher(Duration::from_millis(200)).fetch(&url).await;
        assert!(doc.entries.is_empty());
        match doc.error {
            Some(FetchError::Parse(_)) => {}
            e => panic!("Expected Parse error from direct attempt, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b' '; MAX_FEED_SIZE + 1]))
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed.xml", mock_server.uri());
        let doc = fetcher(Duration::from_secs(5)).fetch(&url).await;
        assert!(doc.entries.is_empty());
        assert!(matches!(doc.error, Some(FetchError::ResponseTooLarge)));
    }

    #[tokio::test]
    async fn test_local_file_is_parsed_directly() {
        let dir = std::env::temp_dir().join("readme_feed_fetcher_local");
        std::fs::create_dir_all(&dir).unwrap();
        let feed_path = dir.join("feed.xml");
        std::fs::write(&feed_path, VALID_RSS).unwrap();

        let doc = fetcher(Duration::from_secs(5))
            .fetch(feed_path.to_str().unwrap())
            .await;
        assert_eq!(doc.entries.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_missing_local_file_degrades_to_empty() {
        let doc = fetcher(Duration::from_secs(5))
            .fetch("/nonexistent/readme_feed/feed.xml")
            .await;
        assert!(doc.entries.is_empty());
        assert!(matches!(doc.error, Some(FetchError::Io(_))));
    }
}
