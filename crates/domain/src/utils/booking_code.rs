//! Booking-code extraction.
//!
//! Strategies are tried in order and the first match wins. Each strategy is a
//! plain function over the event text so new platforms can be added without
//! touching the parser.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{
    MAX_BOOKING_CODE_LEN, MIN_BOOKING_CODE_LEN, PLATFORM_CODE_PREFIX, PLATFORM_CODE_SUFFIX_LEN,
};

/// A single extraction rule: event text in, normalized code out.
pub type CodeStrategy = fn(&str) -> Option<String>;

/// Default strategies, most specific first.
pub const DEFAULT_STRATEGIES: &[(&str, CodeStrategy)] = &[
    ("platform_url", from_platform_url),
    ("labelled", from_labelled_reference),
    ("bare_token", from_bare_token),
];

#[allow(clippy::expect_used)]
static PLATFORM_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:airbnb\.[a-z.]+/(?:hosting/)?(?:reservations?|trips)/(?:details/)?|vrbo\.com/\S*?reservations?/|booking\.com/\S*?(?:res_id|reservation_id|bn)=)([a-z0-9]{8,12})\b",
    )
    .expect("PLATFORM_URL should compile - this is a bug")
});

#[allow(clippy::expect_used)]
static LABELLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:BOOKING|REF|ID)\s*[:#]\s*([a-z0-9][a-z0-9-]{3,19})\b")
        .expect("LABELLED should compile - this is a bug")
});

#[allow(clippy::expect_used)]
static BARE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z0-9]{8,12}\b").expect("BARE_TOKEN should compile - this is a bug")
});

/// Uppercase words that show up in feed summaries and are never codes.
const STOPWORDS: &[&str] = &[
    "AVAILABLE",
    "BLOCKED",
    "CANCELLED",
    "CONFIRMED",
    "CHECKIN",
    "CHECKOUT",
    "RESERVED",
    "RESERVATION",
    "UNAVAILABLE",
    "BOOKINGCOM",
];

/// Extract a booking code from event text with the default strategies.
pub fn extract_booking_code(text: &str) -> Option<String> {
    extract_booking_code_with(DEFAULT_STRATEGIES, text)
}

/// Extract a booking code with a caller-supplied strategy list.
pub fn extract_booking_code_with(strategies: &[(&str, CodeStrategy)], text: &str) -> Option<String> {
    strategies.iter().find_map(|(_, strategy)| strategy(text))
}

/// Trim and uppercase a code so comparisons are case-insensitive.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Platform confirmation codes: `HM` followed by eight uppercase alphanumerics.
pub fn is_platform_booking_code(code: &str) -> bool {
    let code = normalize_code(code);
    code.len() == PLATFORM_CODE_PREFIX.len() + PLATFORM_CODE_SUFFIX_LEN
        && code.starts_with(PLATFORM_CODE_PREFIX)
        && code[PLATFORM_CODE_PREFIX.len()..].chars().all(|c| c.is_ascii_alphanumeric())
}

/// Code taken from a reservation URL path on a known platform.
pub fn from_platform_url(text: &str) -> Option<String> {
    PLATFORM_URL.captures(text).and_then(|caps| caps.get(1)).map(|m| normalize_code(m.as_str()))
}

/// Code following an explicit `BOOKING:`, `REF:` or `ID:` label.
pub fn from_labelled_reference(text: &str) -> Option<String> {
    LABELLED.captures(text).and_then(|caps| caps.get(1)).map(|m| normalize_code(m.as_str()))
}

/// First standalone uppercase alphanumeric token of code length that is not
/// a number, a date, or a known word.
pub fn from_bare_token(text: &str) -> Option<String> {
    BARE_TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| is_plausible_bare_code(candidate))
        .map(normalize_code)
}

fn is_plausible_bare_code(candidate: &str) -> bool {
    let len = candidate.len();
    if !(MIN_BOOKING_CODE_LEN..=MAX_BOOKING_CODE_LEN).contains(&len) {
        return false;
    }

    let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
    let has_letter = candidate.chars().any(|c| c.is_ascii_alphabetic());

    // Pure numbers are phone fragments or dates; pure words are words.
    if !has_digit || !has_letter {
        return false;
    }

    !looks_like_date(candidate) && !STOPWORDS.contains(&candidate)
}

/// `20250101T1500`, `1999T...` and friends: a year followed only by digits
/// and date-time separators.
fn looks_like_date(candidate: &str) -> bool {
    let Some(year) = candidate.get(..4) else {
        return false;
    };
    let is_year = (year.starts_with("19") || year.starts_with("20"))
        && year.chars().all(|c| c.is_ascii_digit());

    is_year && candidate[4..].chars().all(|c| c.is_ascii_digit() || c == 'T' || c == 'Z')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_url_wins_over_other_tokens() {
        let text = "REF: OTHER123\nhttps://www.airbnb.com/hosting/reservations/details/hmabcd1234";
        assert_eq!(extract_booking_code(text).as_deref(), Some("HMABCD1234"));
    }

    #[test]
    fn recognises_other_platform_urls() {
        assert_eq!(
            from_platform_url("https://www.vrbo.com/owner/reservations/A1B2C3D4E5").as_deref(),
            Some("A1B2C3D4E5")
        );
        assert_eq!(
            from_platform_url("https://admin.booking.com/hotel/x?res_id=4412345678").as_deref(),
            Some("4412345678")
        );
    }

    #[test]
    fn labelled_reference_is_second() {
        assert_eq!(extract_booking_code("Booking: abc-1234").as_deref(), Some("ABC-1234"));
        assert_eq!(extract_booking_code("Reserved\nREF #Q7X2").as_deref(), Some("Q7X2"));
        assert_eq!(from_labelled_reference("UID:HM12345678"), None);
    }

    #[test]
    fn bare_token_rejects_numbers_dates_and_words() {
        assert_eq!(from_bare_token("Call 5551234567"), None);
        assert_eq!(from_bare_token("20250101T150000Z"), None);
        assert_eq!(from_bare_token("RESERVED BLOCKED"), None);
        assert_eq!(from_bare_token("Stay 20250101 HM12345678").as_deref(), Some("HM12345678"));
    }

    #[test]
    fn bare_token_requires_uppercase() {
        assert_eq!(from_bare_token("hm12345678"), None);
        assert_eq!(from_bare_token("Jane Doe (HMXY4Z9Q2P)").as_deref(), Some("HMXY4Z9Q2P"));
    }

    #[test]
    fn no_strategy_matches() {
        assert_eq!(extract_booking_code("Airbnb (Not available)"), None);
        assert_eq!(extract_booking_code(""), None);
    }

    #[test]
    fn custom_strategy_list_is_honoured() {
        fn always(_: &str) -> Option<String> {
            Some("FIXED".into())
        }
        let strategies: &[(&str, CodeStrategy)] = &[("always", always)];
        assert_eq!(extract_booking_code_with(strategies, "anything").as_deref(), Some("FIXED"));
    }

    #[test]
    fn platform_code_shape() {
        assert!(is_platform_booking_code("HM12345678"));
        assert!(is_platform_booking_code(" hmabcd1234 "));
        assert!(!is_platform_booking_code("HM1234567"));
        assert!(!is_platform_booking_code("XX12345678"));
        assert!(!is_platform_booking_code("HM1234-678"));
    }
}
