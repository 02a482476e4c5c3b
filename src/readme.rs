//! Marker-delimited regions of a README.
//!
//! A region named `blog` is everything from `<!-- blog starts -->` through
//! `<!-- blog ends -->`. The content between the markers belongs to this
//! tool and is replaced wholesale.
use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadmeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn start_marker(marker: &str) -> String {
    format!("<!-- {marker} starts -->")
}

fn end_marker(marker: &str) -> String {
    format!("<!-- {marker} ends -->")
}

fn region_pattern(marker: &str) -> Regex {
    let pattern = format!(
        "(?s){}.*?{}",
        regex::escape(&start_marker(marker)),
        regex::escape(&end_marker(marker))
    );
    // Both halves are escaped, so the pattern is always valid
    Regex::new(&pattern).expect("Invalid marker region pattern")
}

/// Returns `true` if `content` has at least one complete `marker` region.
pub fn has_marker(content: &str, marker: &str) -> bool {
    region_pattern(marker).is_match(content)
}

/// Replaces every `marker` region in `content` with `chunk`.
///
/// The markers are kept and `chunk` sits on its own lines between them.
/// `chunk` is inserted literally (`$1` stays `$1`). Content without the
/// region is returned unchanged.
///
/// # Examples
///
/// ```
/// use readme_feed::readme::replace_chunk;
///
/// let doc = "x\n<!-- blog starts -->\nold\n<!-- blog ends -->\ny";
/// assert_eq!(
///     replace_chunk(doc, "blog", "new"),
///     "x\n<!-- blog starts -->\nnew\n<!-- blog ends -->\ny"
/// );
/// ```
pub fn replace_chunk(content: &str, marker: &str, chunk: &str) -> String {
    let replacement = format!("{}\n{}\n{}", start_marker(marker), chunk, end_marker(marker));
    region_pattern(marker)
        .replace_all(content, NoExpand(&replacement))
        .into_owned()
}

/// Reads the whole README as UTF-8.
pub fn read(path: &Path) -> Result<String, ReadmeError> {
    std::fs::read_to_string(path).map_err(|source| ReadmeError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrites the README in place. Not atomic.
pub fn write(path: &Path, content: &str) -> Result<(), ReadmeError> {
    std::fs::write(path, content).map_err(|source| ReadmeError::Write {
        path: path.to_path_buf(),
        source,
    })
}
