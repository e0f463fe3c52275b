//! RSS 2.0 and Atom parsing with `quick-xml`.
//!
//! Only the fields the pipeline reads are kept: title, summary, link and
//! the publish timestamp. Elements are matched by local name, so
//! namespaced forms such as `dc:date` and `content:encoded` are picked up.
//!
//! | Field | RSS 2.0 | Atom |
//! |-------|---------|------|
//! | title | `<title>` | `<title>` |
//! | summary | `<description>`, else `<content:encoded>` | `<summary>`, else `<content>` |
//! | link | `<link>` text | `<link href>` (alternate or unqualified) |
//! | published | `<pubDate>`, `<dc:date>` | `<published>`, else `<updated>` |

use crate::models::FeedEntry;
use crate::utils::collapse_whitespace;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use scraper::Html;
use tracing::debug;

/// Naive timestamp layouts tried after RFC 2822 and RFC 3339. Read as UTC.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Summary,
    Content,
    Link,
    Published,
    Updated,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"description" | b"summary" => Some(Field::Summary),
            b"encoded" | b"content" => Some(Field::Content),
            b"link" => Some(Field::Link),
            b"pubDate" | b"published" | b"date" | b"issued" => Some(Field::Published),
            b"updated" | b"modified" => Some(Field::Updated),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PendingEntry {
    title: String,
    summary: String,
    content: String,
    link: String,
    published: String,
    updated: String,
}

impl PendingEntry {
    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Link => &mut self.link,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
        };
        // first occurrence wins, e.g. <dc:date> after <pubDate>
        if slot.trim().is_empty() {
            *slot = value;
        }
    }

    fn finish(self) -> Option<FeedEntry> {
        let link = self.link.trim().to_string();
        if link.is_empty() {
            return None;
        }

        let summary_source = if self.summary.trim().is_empty() {
            &self.content
        } else {
            &self.summary
        };

        let published_raw = [self.published, self.updated]
            .into_iter()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty());
        let published = published_raw.as_deref().and_then(parse_timestamp);

        Some(FeedEntry {
            title: strip_markup(&self.title),
            summary: strip_markup(summary_source),
            link,
            published,
            published_raw,
        })
    }
}

/// Parse an RSS or Atom document into entries, in document order.
///
/// Items without a link are skipped. A document that contains no items
/// yields an empty vector.
///
/// # Errors
///
/// Returns the underlying [`quick_xml::Error`] if the document is not
/// well-formed XML.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut entries = Vec::new();
    let mut pending: Option<PendingEntry> = None;
    // field being captured plus the local name of the element that opened it
    let mut capture: Option<(Field, Vec<u8>)> = None;
    let mut text = String::new();
    let mut skipped = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                if is_entry_element(&local) {
                    pending = Some(PendingEntry::default());
                    capture = None;
                    continue;
                }
                let Some(entry) = pending.as_mut() else {
                    continue;
                };
                if capture.is_some() {
                    // nested markup inside a captured field, e.g. XHTML content
                    continue;
                }
                if let Some(field) = Field::from_local_name(&local) {
                    if field == Field::Link {
                        if let Some(href) = atom_href(&e) {
                            entry.set(Field::Link, href);
                        }
                    }
                    capture = Some((field, local));
                    text.clear();
                }
            }
            Event::Empty(e) => {
                if let Some(entry) = pending.as_mut() {
                    if capture.is_none() && e.local_name().as_ref() == b"link" {
                        if let Some(href) = atom_href(&e) {
                            entry.set(Field::Link, href);
                        }
                    }
                }
            }
            Event::Text(e) => {
                if capture.is_some() {
                    let raw = String::from_utf8_lossy(&e);
                    match unescape(&raw) {
                        Ok(unescaped) => text.push_str(&unescaped),
                        Err(_) => text.push_str(&raw),
                    }
                }
            }
            Event::CData(e) => {
                if capture.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::GeneralRef(e) => {
                if capture.is_some() {
                    push_entity(&mut text, &String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let local = e.local_name();
                let local = local.as_ref();
                if is_entry_element(local) {
                    if let Some(entry) = pending.take() {
                        match entry.finish() {
                            Some(entry) => entries.push(entry),
                            None => skipped += 1,
                        }
                    }
                    capture = None;
                    continue;
                }
                let closes_capture = matches!(&capture, Some((_, tag)) if tag.as_slice() == local);
                if closes_capture {
                    if let (Some((field, _)), Some(entry)) = (capture.take(), pending.as_mut()) {
                        entry.set(field, std::mem::take(&mut text));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(count = entries.len(), skipped, "Parsed feed document");
    Ok(entries)
}

fn is_entry_element(local: &[u8]) -> bool {
    local == b"item" || local == b"entry"
}

/// `href` of an Atom `<link>`, when it points at the article itself.
fn atom_href(e: &BytesStart) -> Option<String> {
    let rel = e
        .try_get_attribute("rel")
        .ok()
        .flatten()
        .map(|a| String::from_utf8_lossy(&a.value).into_owned());
    if matches!(rel.as_deref(), Some(rel) if rel != "alternate") {
        return None;
    }
    let href = e.try_get_attribute("href").ok().flatten()?;
    let raw = String::from_utf8_lossy(&href.value).into_owned();
    let href = unescape(&raw).map(|s| s.into_owned()).unwrap_or(raw);
    Some(href)
}

/// Resolve an entity reference (`amp`, `#39`, `#x2019`) into `out`.
///
/// Unknown named entities are kept verbatim.
fn push_entity(out: &mut String, name: &str) {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        };
        if let Some(c) = code.and_then(char::from_u32) {
            out.push(c);
            return;
        }
    } else if let Some(resolved) = resolve_predefined_entity(name) {
        out.push_str(resolved);
        return;
    }
    out.push('&');
    out.push_str(name);
    out.push(';');
}

/// Visible text of an HTML fragment, entities decoded, whitespace collapsed.
///
/// Feeds often escape HTML twice, so a fragment with no tags can still
/// carry entities such as `&nbsp;` once the XML layer is unwrapped.
fn strip_markup(fragment: &str) -> String {
    if !fragment.contains(['<', '&']) {
        return collapse_whitespace(fragment);
    }
    let html = Html::parse_fragment(fragment);
    let text = html.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

/// Parse a feed timestamp into UTC.
///
/// Tries RFC 2822 (RSS `pubDate`), RFC 3339 (Atom), then a few naive ISO
/// layouts read as UTC. Indian feeds often write `IST` as the zone, which
/// RFC 2822 parsing does not know; it is rewritten to `+0530`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let rfc2822 = match raw.strip_suffix(" IST") {
        Some(head) => format!("{head} +0530"),
        None => raw.to_string(),
    };

    DateTime::parse_from_rfc2822(&rfc2822)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}
