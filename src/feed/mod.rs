//! Feed retrieval and parsing.
//!
//! - [`parser`] - RSS/Atom/JSON parsing with `feed-rs`, plus a `quick-xml`
//!   pass that keeps each entry's date text as written
//! - [`fetcher`] - Direct read of the feed location with one explicit HTTP
//!   fallback
//!
//! # Example
//!
//! ```ignore
//! use readme_feed::feed::FeedFetcher;
//!
//! let fetcher = FeedFetcher::new(reqwest::Client::new(), Duration::from_secs(20));
//! let document = fetcher.fetch("https://example.com/feed.xml").await;
//! ```

mod fetcher;
mod parser;

pub use fetcher::{FeedDocument, FeedFetcher, FetchError, FALLBACK_USER_AGENT};
pub use parser::{parse_feed, FeedEntry};
