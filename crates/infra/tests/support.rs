#![allow(dead_code)]

use std::net::TcpListener;

use guestlink_core::PropertyRepository;
use guestlink_domain::{Config, DatabaseConfig, Property};
use guestlink_infra::GuestLinkContext;
use tempfile::TempDir;

pub const PROPERTY_ID: &str = "seaside-3";
pub const PEPPER: &str = "integration-pepper";

/// Context over a throwaway database file that lives as long as the harness.
pub struct Harness {
    pub ctx: GuestLinkContext,
    _temp_dir: TempDir,
}

impl Harness {
    pub fn new(proxy_url: Option<String>, pepper: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let mut config = Config {
            database: DatabaseConfig {
                path: temp_dir.path().join("guestlink.db").to_string_lossy().into_owned(),
                pool_size: 4,
            },
            ..Config::default()
        };
        config.feed.proxy_url = proxy_url;
        config.feed.timeout_seconds = 5;
        config.tokens.pepper = pepper.map(str::to_string);

        let ctx = GuestLinkContext::from_config(config).expect("context should build");
        Self { ctx, _temp_dir: temp_dir }
    }

    pub async fn register(&self, ical_url: &str) {
        self.ctx
            .properties
            .upsert_property(&Property {
                id: PROPERTY_ID.into(),
                name: "Seaside Three".into(),
                ical_url: Some(ical_url.into()),
            })
            .await
            .expect("property should be stored");
    }

    pub fn count(&self, sql: &str) -> i64 {
        let conn = self.ctx.db.get_connection().expect("connection");
        conn.query_row(sql, [], |row| row.get(0)).expect("count query")
    }
}

/// A local URL nobody listens on.
pub fn refused_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}{path}")
}

/// Airbnb-style feed; each code sits in a folded reservation URL.
pub fn feed(events: &[(&str, &str, &str, &str)]) -> String {
    let mut out = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n");
    for (code, summary, start, end) in events {
        out.push_str("BEGIN:VEVENT\r\n");
        out.push_str(&format!("DTSTART;VALUE=DATE:{start}\r\n"));
        out.push_str(&format!("DTEND;VALUE=DATE:{end}\r\n"));
        out.push_str(&format!("UID:{code}@feeds.example.test\r\n"));
        out.push_str(&format!("SUMMARY:{summary}\r\n"));
        out.push_str("DESCRIPTION:Reservation URL: https://www.airbnb.com/hosting/res\r\n");
        out.push_str(&format!(" ervations/details/{code}\\nPhone Number (Last 4 Digits): 0000\r\n"));
        out.push_str("END:VEVENT\r\n");
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}

/// Dates (YYYYMMDD) starting `offset` days from today, `nights` long.
pub fn upcoming(offset: i64, nights: i64) -> (String, String) {
    let start = chrono::Utc::now().date_naive() + chrono::Duration::days(offset);
    let end = start + chrono::Duration::days(nights);
    (start.format("%Y%m%d").to_string(), end.format("%Y%m%d").to_string())
}
