//! Guest detail heuristics for feed events.
//!
//! Platforms rarely export guest names in a structured field, so names come
//! from labelled description lines or from the summary. Every heuristic returns
//! `None` when nothing convincing is found; callers decide precedence.

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_NAME_LEN: usize = 80;
const MAX_GUEST_COUNT: u32 = 99;

/// Summary and name fragments that describe a booking state, not a person.
const GENERIC_WORDS: &[&str] = &[
    "reserved",
    "reservation",
    "booked",
    "blocked",
    "closed",
    "not available",
    "unavailable",
    "airbnb",
    "vrbo",
    "booking.com",
    "owner stay",
];

#[allow(clippy::expect_used)]
static LABELLED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(?:guest(?:\s+name)?|name)\s*:\s*(.+?)\s*$")
        .expect("LABELLED_NAME should compile - this is a bug")
});

#[allow(clippy::expect_used)]
static STATUS_PREFIXED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:reserved|booked|booking|reservation)\s*[-:\u{2013}]\s*(.+?)\s*$")
        .expect("STATUS_PREFIXED_NAME should compile - this is a bug")
});

#[allow(clippy::expect_used)]
static NAME_WITH_TRAILER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(.+?)\s*\([^)]*\)\s*$").expect("NAME_WITH_TRAILER should compile - this is a bug")
});

#[allow(clippy::expect_used)]
static PERSONAL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\p{Lu}[\p{L}'.-]*(?:\s+\p{Lu}[\p{L}'.-]*){1,4}$")
        .expect("PERSONAL_NAME should compile - this is a bug")
});

#[allow(clippy::expect_used)]
static COUNT_BEFORE_NOUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*(?:guests?|adults?|persons?|people|pax)\b")
        .expect("COUNT_BEFORE_NOUN should compile - this is a bug")
});

#[allow(clippy::expect_used)]
static COUNT_AFTER_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:number\s+of\s+guests|guests?|adults)\s*:\s*(\d{1,3})\b")
        .expect("COUNT_AFTER_LABEL should compile - this is a bug")
});

/// Best-effort guest name from an event's summary and description.
pub fn extract_guest_name(summary: &str, description: &str) -> Option<String> {
    if let Some(name) = LABELLED_NAME
        .captures_iter(description)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| clean_candidate(m.as_str()))
    {
        return Some(name);
    }

    if let Some(name) = STATUS_PREFIXED_NAME
        .captures(summary)
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean_candidate(m.as_str()))
    {
        return Some(name);
    }

    let bare = NAME_WITH_TRAILER
        .captures(summary)
        .and_then(|caps| caps.get(1))
        .map_or(summary, |m| m.as_str());

    clean_candidate(bare).filter(|name| PERSONAL_NAME.is_match(name))
}

/// Guest count from text such as `2 guests`, `3 adults` or `Guests: 4`.
pub fn extract_guest_count(text: &str) -> Option<u32> {
    [&*COUNT_BEFORE_NOUN, &*COUNT_AFTER_LABEL]
        .iter()
        .filter_map(|re| re.captures(text))
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .find(|count| (1..=MAX_GUEST_COUNT).contains(count))
}

/// A stored name is worth keeping over a freshly parsed one when it has at
/// least two words and does not look like a phone number or a booking code.
pub fn is_well_formed_guest_name(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() || is_generic(trimmed) {
        return false;
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }

    !looks_like_phone(trimmed) && !words.iter().any(|w| w.chars().any(|c| c.is_ascii_digit()))
}

fn clean_candidate(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let name = collapsed.trim_matches(|c: char| c == '-' || c == ':' || c.is_whitespace());

    if name.is_empty()
        || name.len() > MAX_NAME_LEN
        || !name.chars().any(char::is_alphabetic)
        || is_generic(name)
    {
        return None;
    }

    Some(name.to_string())
}

fn is_generic(text: &str) -> bool {
    let lower = text.to_lowercase();
    GENERIC_WORDS.iter().any(|word| lower.contains(word))
}

fn looks_like_phone(text: &str) -> bool {
    let digits = text.chars().filter(char::is_ascii_digit).count();
    digits >= 6
        && text.chars().all(|c| c.is_ascii_digit() || " +-().".contains(c))
}
