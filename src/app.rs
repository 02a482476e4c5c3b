use crate::config::Config;
use crate::entries::{render_block, select_entries};
use crate::feed::FeedFetcher;
use crate::readme::{self, ReadmeError};
use std::path::Path;

/// What a run did to the README.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No entries survived fetching and filtering; the README was not touched.
    NoEntries,
    /// The block was regenerated. `changed` is false when the new text was
    /// byte-identical to the old one.
    Updated { items: usize, changed: bool },
}

/// How the regenerated README is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Overwrite the README in place.
    Write,
    /// Print the regenerated README to stdout, leave the file alone.
    Print,
}

impl Output {
    /// Stdout carries the document in print mode, so diagnostics move to stderr.
    pub fn logs_to_stderr(self) -> bool {
        matches!(self, Output::Print)
    }
}

/// Regenerates the marker region of the README at `readme_path`.
///
/// The README is read before anything is fetched, so a missing file fails
/// fast. Fetch and parse failures degrade to [`RunOutcome::NoEntries`];
/// only README I/O errors are returned.
pub async fn run(
    config: &Config,
    fetcher: &FeedFetcher,
    readme_path: &Path,
    output: Output,
) -> Result<RunOutcome, ReadmeError> {
    let contents = readme::read(readme_path)?;

    let document = fetcher.fetch(&config.feed_url).await;
    let items = select_entries(&document.entries, &config.language, config.post_limit);
    tracing::debug!(
        fetched = document.entries.len(),
        selected = items.len(),
        language = %config.language,
        "Selected feed entries"
    );

    if items.is_empty() {
        tracing::info!("No blog content fetched, keeping existing blog block.");
        return Ok(RunOutcome::NoEntries);
    }

    if !readme::has_marker(&contents, &config.marker) {
        tracing::warn!(
            path = %readme_path.display(),
            marker = %config.marker,
            "README has no marker region, nothing will be replaced"
        );
    }

    let block = render_block(&items);
    let rewritten = readme::replace_chunk(&contents, &config.marker, &block);
    let changed = rewritten != contents;

    match output {
        Output::Write => {
            readme::write(readme_path, &rewritten)?;
            tracing::info!(
                path = %readme_path.display(),
                items = items.len(),
                changed = changed,
                "README updated"
            );
        }
        Output::Print => print!("{rewritten}"),
    }

    Ok(RunOutcome::Updated {
        items: items.len(),
        changed,
    })
}
