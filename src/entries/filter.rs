use crate::feed::FeedEntry;
use crate::util::{contains_cjk, strip_fragment};

/// The only language with a filter; every other value allows all entries.
pub const CHINESE: &str = "zh";

/// Decides whether an entry belongs to the configured language.
///
/// For `zh`, entries under an `/en/` path are dropped, and the rest are kept
/// only if the title contains a CJK ideograph. Any other language keeps
/// everything.
pub fn is_allowed_entry(entry: &FeedEntry, language: &str) -> bool {
    if language != CHINESE {
        return true;
    }

    let link = strip_fragment(entry.link.as_deref().unwrap_or(""));
    if link.contains("/en/") {
        return false;
    }

    contains_cjk(entry.title.as_deref().unwrap_or(""))
}
