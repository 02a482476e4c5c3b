use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Where a feed document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Remote document fetched over HTTP(S).
    Http(Url),
    /// Local document, given as a `file://` URL or a plain path.
    File(PathBuf),
}

/// Errors that can occur while resolving a feed location.
#[derive(Error, Debug)]
pub enum FeedSourceError {
    /// The URL uses a scheme other than http, https or file.
    #[error("Unsupported scheme: {0} (only http/https/file allowed)")]
    UnsupportedScheme(String),
    /// A `file://` URL that does not map to a local path.
    #[error("Invalid file URL: {0}")]
    InvalidFileUrl(String),
}

/// Resolves a feed location string into a [`FeedSource`].
///
/// Absolute URLs must use `http`, `https` or `file`. Anything that does not
/// parse as an absolute URL (for example `feed.xml` or `./out/atom.xml`) is
/// treated as a filesystem path.
///
/// # Examples
///
/// ```
/// use readme_feed::util::{resolve_feed_source, FeedSource};
///
/// let source = resolve_feed_source("https://example.com/feed.xml").unwrap();
/// assert!(matches!(source, FeedSource::Http(_)));
///
/// let source = resolve_feed_source("public/feed.xml").unwrap();
/// assert!(matches!(source, FeedSource::File(_)));
///
/// assert!(resolve_feed_source("ftp://example.com/feed.xml").is_err());
/// ```
pub fn resolve_feed_source(location: &str) -> Result<FeedSource, FeedSourceError> {
    let url = match Url::parse(location) {
        Ok(url) => url,
        Err(_) => return Ok(FeedSource::File(PathBuf::from(location))),
    };

    match url.scheme() {
        "http" | "https" => Ok(FeedSource::Http(url)),
        "file" => url
            .to_file_path()
            .map(FeedSource::File)
            .map_err(|_| FeedSourceError::InvalidFileUrl(location.to_owned())),
        // Windows drive letters ("C:\feed.xml") parse as a one-letter scheme
        scheme if scheme.len() == 1 => Ok(FeedSource::File(PathBuf::from(location))),
        scheme => Err(FeedSourceError::UnsupportedScheme(scheme.to_owned())),
    }
}
