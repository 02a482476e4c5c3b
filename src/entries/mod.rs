//! Entry selection and formatting.
//!
//! Turns parsed [`FeedEntry`] values into the [`DisplayItem`]s that end up in
//! the README:
//!
//! - [`is_allowed_entry`] - language heuristic (`zh` keeps CJK titles only)
//! - [`format_entry_date`] - date normalization to `YYYY-MM-DD`
//! - [`select_entries`] - filter, normalize and cap, preserving feed order
//! - [`render_block`] - the markdown block spliced between the markers

mod date;
mod filter;

use crate::feed::FeedEntry;
use crate::util::strip_fragment;
use std::fmt;

pub use date::{format_entry_date, UNKNOWN_DATE};
pub use filter::{is_allowed_entry, CHINESE};

/// Title used when an entry has none.
pub const UNTITLED: &str = "Untitled";

/// Separator placed between rendered items.
pub const ITEM_SEPARATOR: &str = "<br>";

/// One line of the generated block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub title: String,
    pub url: String,
    pub published: String,
}

impl fmt::Display for DisplayItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "• [{}]({}) - {}", self.title, self.url, self.published)
    }
}

/// Picks the entries that have a link and pass the language filter, in feed
/// order, then keeps the first `limit` of them. Feeds are assumed
/// newest-first; nothing is sorted.
///
/// A negative `limit` drops that many candidates from the end instead, so
/// `-1` keeps all but the last one.
pub fn select_entries(entries: &[FeedEntry], language: &str, limit: i64) -> Vec<DisplayItem> {
    let mut items: Vec<DisplayItem> = entries
        .iter()
        .filter(|entry| entry.link.as_deref().is_some_and(|l| !l.is_empty()))
        .filter(|entry| is_allowed_entry(entry, language))
        .map(|entry| DisplayItem {
            title: entry.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
            url: strip_fragment(entry.link.as_deref().unwrap_or("")).to_string(),
            published: format_entry_date(entry),
        })
        .collect();
    items.truncate(resolve_limit(limit, items.len()));
    items
}

/// Number of items a `limit` keeps out of `len` candidates.
fn resolve_limit(limit: i64, len: usize) -> usize {
    let magnitude = usize::try_from(limit.unsigned_abs()).unwrap_or(usize::MAX);
    if limit >= 0 {
        magnitude.min(len)
    } else {
        len.saturating_sub(magnitude)
    }
}

/// Renders items as `• [title](url) - date`, joined with `<br>`.
pub fn render_block(items: &[DisplayItem]) -> String {
    items
        .iter()
        .map(DisplayItem::to_string)
        .collect::<Vec<_>>()
        .join(ITEM_SEPARATOR)
}
