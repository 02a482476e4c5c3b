use chrono::{DateTime, Utc};
use feed_rs::model::Link;
use feed_rs::parser::{self, ParseFeedError};
use quick_xml::events::Event;
use quick_xml::Reader;

/// One entry of a feed, before filtering and formatting.
///
/// `published` and `updated` hold the date text exactly as the document
/// wrote it; the `_parsed` fields hold the same instants normalized to UTC.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub published_parsed: Option<DateTime<Utc>>,
    pub updated_parsed: Option<DateTime<Utc>>,
}

/// Parses an RSS, Atom or JSON feed into entries, in document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, ParseFeedError> {
    let feed = parser::parse(bytes)?;

    let mut entries: Vec<FeedEntry> = feed
        .entries
        .into_iter()
        .map(|entry| FeedEntry {
            title: entry.title.map(|t| t.content),
            link: pick_link(&entry.links).map(|l| l.href.clone()),
            published: None,
            updated: None,
            published_parsed: entry.published,
            updated_parsed: entry.updated,
        })
        .collect();

    match scan_raw_dates(bytes) {
        Some(raw) if raw.len() == entries.len() => {
            for (entry, dates) in entries.iter_mut().zip(raw) {
                entry.published = dates.published;
                entry.updated = dates.updated;
            }
        }
        Some(raw) => {
            tracing::debug!(
                entries = entries.len(),
                scanned = raw.len(),
                "Raw date scan disagrees with parsed entry count, using parsed dates only"
            );
        }
        None => {}
    }

    Ok(entries)
}

/// Alternate (or untyped) link first, anything else as a last resort.
fn pick_link(links: &[Link]) -> Option<&Link> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
}

#[derive(Debug, Default)]
struct RawDates {
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum DateField {
    Published,
    Updated,
}

fn is_entry_element(local_name: &[u8]) -> bool {
    matches!(local_name, b"item" | b"entry")
}

fn date_field(qualified_name: &[u8], local_name: &[u8]) -> Option<DateField> {
    if qualified_name == b"dc:date" {
        return Some(DateField::Updated);
    }
    match local_name {
        b"pubDate" | b"published" | b"issued" => Some(DateField::Published),
        b"updated" | b"modified" => Some(DateField::Updated),
        _ => None,
    }
}

/// Collects the raw date text of every `item`/`entry` element.
///
/// Only direct children of the entry count, so an Atom `<source><updated>`
/// does not shadow the entry's own date. Returns `None` when the document
/// is not well-formed XML.
fn scan_raw_dates(bytes: &[u8]) -> Option<Vec<RawDates>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut out = Vec::new();
    let mut depth = 0usize;
    // (depth of the open entry element, dates collected so far)
    let mut current: Option<(usize, RawDates)> = None;
    let mut field: Option<DateField> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let local = e.local_name();
                let entry_depth = current.as_ref().map(|(d, _)| *d);
                match entry_depth {
                    None if is_entry_element(local.as_ref()) => {
                        current = Some((depth, RawDates::default()));
                    }
                    Some(d) if depth == d + 1 => {
                        field = date_field(e.name().as_ref(), local.as_ref());
                        text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if current.is_none() && is_entry_element(e.local_name().as_ref()) {
                    out.push(RawDates::default());
                }
            }
            Ok(Event::Text(t)) if field.is_some() => match t.unescape() {
                Ok(s) => text.push_str(&s),
                Err(_) => text.push_str(&String::from_utf8_lossy(&t)),
            },
            Ok(Event::CData(c)) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Ok(Event::End(_)) => {
                let entry_depth = current.as_ref().map(|(d, _)| *d);
                match entry_depth {
                    Some(d) if depth == d + 1 => {
                        if let (Some(f), Some((_, dates))) = (field.take(), current.as_mut()) {
                            let slot = match f {
                                DateField::Published => &mut dates.published,
                                DateField::Updated => &mut dates.updated,
                            };
                            if slot.is_none() {
                                *slot = Some(std::mem::take(&mut text));
                            }
                        }
                    }
                    Some(d) if depth == d => {
                        if let Some((_, dates)) = current.take() {
                            out.push(dates);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Raw date scan stopped on malformed XML");
                return None;
            }
            _ => {}
        }
        buf.clear();
    }

    Some(out)
}
