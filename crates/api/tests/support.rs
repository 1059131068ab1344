#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use guestlink_api::{build_router, AppState};
use guestlink_domain::{Config, DatabaseConfig};
use guestlink_infra::GuestLinkContext;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PEPPER: &str = "api-test-pepper";

/// Router over a throwaway database that lives as long as the app.
pub struct TestApp {
    pub router: Router,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new(pepper: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let mut config = Config {
            database: DatabaseConfig {
                path: temp_dir.path().join("guestlink.db").to_string_lossy().into_owned(),
                pool_size: 4,
            },
            ..Config::default()
        };
        config.feed.timeout_seconds = 5;
        config.tokens.pepper = pepper.map(str::to_string);

        let ctx = GuestLinkContext::from_config(config).expect("context should build");
        Self { router: build_router(AppState::new(ctx)), _temp_dir: temp_dir }
    }

    /// Send a request and return the status with the decoded JSON body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request should build"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response should be JSON")
        };
        (status, json)
    }

    pub async fn register(&self, property_id: &str, ical_url: Option<&str>) {
        let (status, _) = self
            .send(
                Method::PUT,
                &format!("/properties/{property_id}"),
                Some(serde_json::json!({ "name": "Harbour Loft", "icalUrl": ical_url })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

/// Single-event Airbnb-style feed starting a few days from now.
pub fn feed(code: &str) -> String {
    let start = chrono::Utc::now().date_naive() + chrono::Duration::days(4);
    let end = start + chrono::Duration::days(3);
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nDTSTART;VALUE=DATE:{}\r\n\
         DTEND;VALUE=DATE:{}\r\nUID:{code}@feeds.example.test\r\nSUMMARY:Reserved\r\n\
         DESCRIPTION:Reservation URL: https://www.airbnb.com/hosting/reservations/details/{code}\r\n\
         END:VEVENT\r\nEND:VCALENDAR\r\n",
        start.format("%Y%m%d"),
        end.format("%Y%m%d"),
    )
}
