//! Calendar feed fixtures

use guestlink_domain::Property;

pub const PROPERTY_ID: &str = "villa-7";
pub const FEED_URL: &str = "https://calendar.example.test/ical/villa-7.ics?s=secret";

pub fn property() -> Property {
    Property {
        id: PROPERTY_ID.to_string(),
        name: "Villa Seven".to_string(),
        ical_url: Some(FEED_URL.to_string()),
    }
}

/// One feed event: (booking code, summary, DTSTART, DTEND)
pub type EventSpec<'a> = (&'a str, &'a str, &'a str, &'a str);

/// Build an Airbnb-style feed whose codes sit in a folded reservation URL.
pub fn feed(events: &[EventSpec<'_>]) -> String {
    let mut out = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n");
    for (code, summary, start, end) in events {
        out.push_str("BEGIN:VEVENT\r\n");
        out.push_str(&format!("DTSTART;VALUE=DATE:{start}\r\n"));
        out.push_str(&format!("DTEND;VALUE=DATE:{end}\r\n"));
        out.push_str(&format!("UID:{code}@calendar.example.test\r\n"));
        out.push_str(&format!("SUMMARY:{summary}\r\n"));
        out.push_str("DESCRIPTION:Reservation URL: https://www.airbnb.com/hosting/res\r\n");
        out.push_str(&format!(" ervations/details/{code}\\nPhone Number (Last 4 Digits): 1234\r\n"));
        out.push_str("END:VEVENT\r\n");
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}
