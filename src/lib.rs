//! Regenerates a marked README section with the latest posts from a feed.
//!
//! The pipeline is linear: [`feed::FeedFetcher`] obtains entries,
//! [`entries::select_entries`] filters and formats them, and
//! [`readme::replace_chunk`] splices the rendered block between
//! `<!-- blog starts -->` and `<!-- blog ends -->`. [`app::run`] ties the
//! steps together for the binary.

pub mod app;
pub mod config;
pub mod entries;
pub mod feed;
pub mod readme;
pub mod util;
