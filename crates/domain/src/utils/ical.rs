//! Calendar feed parser.
//!
//! Turns iCalendar-like feed text into [`ExternalReservation`] candidates.
//! Booking platforms export feeds that are only loosely RFC 5545 conformant,
//! so the parser is deliberately forgiving: line endings may be mixed, folded
//! lines may appear anywhere, and a malformed event is skipped without
//! aborting the batch.
//!
//! Output order follows the feed; duplicates are kept.

use chrono::{Duration, NaiveDate};

use super::booking_code::extract_booking_code;
use super::guest::{extract_guest_count, extract_guest_name};
use crate::types::ExternalReservation;

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";

/// Result of parsing a feed, including events that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedParseReport {
    pub reservations: Vec<ExternalReservation>,
    pub skipped: Vec<SkippedEvent>,
}

/// An event block that could not be turned into a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    /// Zero-based position of the block in the feed.
    pub index: usize,
    pub reason: String,
}

/// Parse feed text into reservation candidates, dropping malformed events.
pub fn parse_feed(text: &str) -> Vec<ExternalReservation> {
    parse_feed_with_report(text).reservations
}

/// Parse feed text and report which event blocks were skipped and why.
pub fn parse_feed_with_report(text: &str) -> FeedParseReport {
    let lines = unfold_lines(text);
    let mut report = FeedParseReport::default();

    for (index, block) in split_event_blocks(&lines).into_iter().enumerate() {
        match parse_event_block(block) {
            Ok(reservation) => report.reservations.push(reservation),
            Err(reason) => report.skipped.push(SkippedEvent { index, reason }),
        }
    }

    report
}

/// Normalise line endings and join folded continuation lines.
///
/// A continuation line starts with exactly one space or tab, which is removed
/// before the remainder is appended to the previous line.
pub fn unfold_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = Vec::new();

    for raw in normalized.split('\n') {
        match raw.strip_prefix([' ', '\t']) {
            Some(continuation) if !lines.is_empty() => {
                if let Some(last) = lines.last_mut() {
                    last.push_str(continuation);
                }
            }
            _ => {
                if !raw.trim().is_empty() {
                    lines.push(raw.to_string());
                }
            }
        }
    }

    lines
}

/// Decode TEXT value escapes: `\n`/`\N`, `\,`, `\;` and `\\`.
///
/// Unknown escapes are kept verbatim.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Parse a DATE or DATE-TIME value into its calendar date.
///
/// Accepts `20250101`, `20250101T150000`, `20250101T150000Z` and, for
/// non-conformant feeds, `2025-01-01`.
pub fn parse_ical_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if value.len() >= 8 && value.as_bytes()[..8].iter().all(u8::is_ascii_digit) {
        let rest = &value[8..];
        if !(rest.is_empty() || rest.starts_with('T')) {
            return None;
        }
        return NaiveDate::parse_from_str(&value[..8], "%Y%m%d").ok();
    }

    value.get(..10).and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}

struct ContentLine<'a> {
    name: String,
    params: &'a str,
    value: &'a str,
}

/// Split `NAME;PARAM=x:VALUE` into its parts. Colons inside quoted parameter
/// values do not terminate the name section.
fn parse_content_line(line: &str) -> Option<ContentLine<'_>> {
    let mut in_quotes = false;
    let mut split_at = None;

    for (idx, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                split_at = Some(idx);
                break;
            }
            _ => {}
        }
    }

    let idx = split_at?;
    let head = &line[..idx];
    let value = &line[idx + 1..];
    let (name, params) = match head.split_once(';') {
        Some((name, params)) => (name, params),
        None => (head, ""),
    };

    if name.trim().is_empty() {
        return None;
    }

    Some(ContentLine { name: name.trim().to_ascii_uppercase(), params, value })
}

fn split_event_blocks(lines: &[String]) -> Vec<&[String]> {
    let mut blocks = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        let marker = line.trim().to_ascii_uppercase();
        if marker == BEGIN_EVENT {
            // A BEGIN without a matching END is abandoned.
            start = Some(idx);
        } else if marker == END_EVENT {
            if let Some(begin) = start.take() {
                blocks.push(&lines[begin..=idx]);
            }
        }
    }

    blocks
}

#[derive(Default)]
struct EventFields {
    uid: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    dtstart: Option<(String, String)>,
    dtend: Option<(String, String)>,
}

fn parse_event_block(block: &[String]) -> Result<ExternalReservation, String> {
    let mut fields = EventFields::default();

    // Properties of nested components (VALARM) never describe the event.
    let mut depth = 0usize;

    for line in &block[1..block.len().saturating_sub(1)] {
        let Some(content) = parse_content_line(line) else {
            continue;
        };

        match content.name.as_str() {
            "BEGIN" => {
                depth += 1;
                continue;
            }
            "END" => {
                depth = depth.saturating_sub(1);
                continue;
            }
            _ if depth > 0 => continue,
            _ => {}
        }

        match content.name.as_str() {
            "UID" => fields.uid = Some(content.value.trim().to_string()),
            "SUMMARY" => fields.summary = Some(unescape_text(content.value).trim().to_string()),
            "DESCRIPTION" => fields.description = Some(unescape_text(content.value)),
            "DTSTART" => {
                fields.dtstart = Some((content.params.to_string(), content.value.to_string()))
            }
            "DTEND" => fields.dtend = Some((content.params.to_string(), content.value.to_string())),
            _ => {}
        }
    }

    let (start_params, start_value) = fields.dtstart.ok_or_else(|| "missing DTSTART".to_string())?;
    let start_date = parse_ical_date(&start_value)
        .ok_or_else(|| format!("unparseable DTSTART '{}'", start_value.trim()))?;

    let end_date = match fields.dtend {
        Some((_, end_value)) => parse_ical_date(&end_value)
            .ok_or_else(|| format!("unparseable DTEND '{}'", end_value.trim()))?,
        // A date-only event without DTEND lasts one day.
        None if is_date_only(&start_params, &start_value) => start_date + Duration::days(1),
        None => start_date,
    };

    if end_date < start_date {
        return Err(format!("DTEND {end_date} precedes DTSTART {start_date}"));
    }

    let summary = fields.summary.unwrap_or_default();
    let description = fields.description.unwrap_or_default();
    let haystack = format!("{summary}\n{description}");

    let id = match fields.uid.filter(|uid| !uid.is_empty()) {
        Some(uid) => uid,
        None => format!("evt-{}-{}", start_date.format("%Y%m%d"), end_date.format("%Y%m%d")),
    };

    Ok(ExternalReservation {
        id,
        guest_name: extract_guest_name(&summary, &description),
        guest_count: extract_guest_count(&haystack),
        external_code: extract_booking_code(&haystack),
        summary,
        start_date,
        end_date,
        description,
        raw_event: block.join("\n"),
    })
}

fn is_date_only(params: &str, value: &str) -> bool {
    let params = params.to_ascii_uppercase();
    params.contains("VALUE=DATE") && !params.contains("DATE-TIME") || value.trim().len() == 8
}
