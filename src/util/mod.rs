//! Utility functions for common operations.
//!
//! This module provides reusable utilities for:
//!
//! - **Feed locations**: Resolving a configured feed string into an HTTP URL or a local path
//! - **Text processing**: Fragment stripping and the CJK heuristic used by the language filter
//!
//! # Examples
//!
//! ```
//! use readme_feed::util::{contains_cjk, resolve_feed_source, strip_fragment};
//!
//! let source = resolve_feed_source("https://example.com/feed.xml").unwrap();
//! assert_eq!(strip_fragment("https://example.com/a#b"), "https://example.com/a");
//! assert!(contains_cjk("你好"));
//! ```

mod feed_source;
mod text;

pub use feed_source::{resolve_feed_source, FeedSource, FeedSourceError};
pub use text::{contains_cjk, strip_fragment};
