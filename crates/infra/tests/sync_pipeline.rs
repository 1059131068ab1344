//! Sync runs against a real SQLite store and HTTP feeds served by wiremock.

mod support;

use guestlink_core::ReservationRepository;
use guestlink_domain::{GuestLinkError, ResolveTokenRequest, SyncOptions, SyncState};
use guestlink_infra::SqliteReservationRepository;
use support::{feed, refused_url, upcoming, Harness, PEPPER, PROPERTY_ID};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forced() -> SyncOptions {
    SyncOptions { force: true, force_proxy: false }
}

async fn serve_feed(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_persists_and_reconciles_reservations() {
    let server = MockServer::start().await;
    let (start, end) = upcoming(5, 3);
    serve_feed(
        &server,
        "/ical/seaside.ics",
        feed(&[
            ("HMAAAA1111", "Reserved - Maria Lopez", &start, &end),
            ("HMBBBB2222", "Reserved", &start, &end),
        ]),
    )
    .await;

    let harness = Harness::new(None, Some(PEPPER));
    harness.register(&format!("{}/ical/seaside.ics", server.uri())).await;

    let outcome = harness.ctx.sync.sync(PROPERTY_ID, SyncOptions::default()).await.unwrap();
    assert_eq!(outcome.reservations_count, 2);
    assert_eq!(outcome.tokens_created, 2);

    let repo = SqliteReservationRepository::new(harness.ctx.db.clone());
    let rows = repo.list_for_property(PROPERTY_ID).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.guest_name.as_deref() == Some("Maria Lopez")));

    // The second reservation is cancelled upstream.
    server.reset().await;
    serve_feed(
        &server,
        "/ical/seaside.ics",
        feed(&[("HMAAAA1111", "Reserved - Maria Lopez", &start, &end)]),
    )
    .await;

    let outcome = harness.ctx.sync.sync(PROPERTY_ID, forced()).await.unwrap();
    assert_eq!(outcome.deleted_count, 1);
    assert_eq!(outcome.tokens_created, 0);
    assert_eq!(harness.count("SELECT COUNT(*) FROM reservations"), 1);

    let status = harness.ctx.sync.status(PROPERTY_ID).await.unwrap();
    assert_eq!(status.state, SyncState::Success);
    assert_eq!(status.reservations_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn second_unforced_run_is_throttled() {
    let server = MockServer::start().await;
    let (start, end) = upcoming(5, 2);
    Mock::given(method("GET"))
        .and(path("/feed.ics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(feed(&[("HMAAAA1111", "Reserved", &start, &end)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(None, Some(PEPPER));
    harness.register(&format!("{}/feed.ics", server.uri())).await;

    harness.ctx.sync.sync(PROPERTY_ID, SyncOptions::default()).await.unwrap();
    let outcome = harness.ctx.sync.sync(PROPERTY_ID, SyncOptions::default()).await.unwrap();

    assert!(outcome.skipped);
    assert_eq!(outcome.reservations_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_feed_falls_back_to_proxy() {
    let proxy = MockServer::start().await;
    let direct_url = refused_url("/ical/seaside.ics");
    let (start, end) = upcoming(2, 2);
    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(query_param("url", direct_url.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(feed(&[("HMCCCC3333", "Reserved", &start, &end)])),
        )
        .expect(1)
        .mount(&proxy)
        .await;

    let harness = Harness::new(Some(format!("{}/proxy", proxy.uri())), Some(PEPPER));
    harness.register(&direct_url).await;

    let outcome = harness.ctx.sync.sync(PROPERTY_ID, SyncOptions::default()).await.unwrap();

    assert_eq!(outcome.reservations_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn upstream_http_error_is_recorded_without_feed_secret() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&proxy)
        .await;

    let harness = Harness::new(Some(format!("{}/proxy", proxy.uri())), Some(PEPPER));
    harness.register(&format!("{}/feed.ics?s=very-secret", server.uri())).await;

    let err = harness.ctx.sync.sync(PROPERTY_ID, SyncOptions::default()).await.unwrap_err();
    assert!(matches!(err, GuestLinkError::UpstreamFetch(_)));

    let status = harness.ctx.sync.status(PROPERTY_ID).await.unwrap();
    assert_eq!(status.state, SyncState::Error);
    let message = status.last_error.unwrap();
    assert!(message.contains("503"));
    assert!(!message.contains("very-secret"));
}

#[tokio::test(flavor = "multi_thread")]
async fn auto_token_resolves_only_with_its_booking_code() {
    let server = MockServer::start().await;
    let (start, end) = upcoming(3, 4);
    serve_feed(&server, "/feed.ics", feed(&[("HMDDDD4444", "Reserved", &start, &end)])).await;

    let harness = Harness::new(None, Some(PEPPER));
    harness.register(&format!("{}/feed.ics", server.uri())).await;
    harness.ctx.sync.sync(PROPERTY_ID, SyncOptions::default()).await.unwrap();

    let token: String = {
        let conn = harness.ctx.db.get_connection().unwrap();
        conn.query_row(
            "SELECT token FROM guest_verification_tokens WHERE source = 'auto'",
            [],
            |row| row.get(0),
        )
        .unwrap()
    };

    let request = |code: Option<&str>| ResolveTokenRequest {
        token: token.clone(),
        property_id: Some(PROPERTY_ID.into()),
        external_code: code.map(str::to_string),
    };

    let err = harness.ctx.tokens.resolve(request(None)).await.unwrap_err();
    assert_eq!(err, GuestLinkError::CodeRequired);
    let err = harness.ctx.tokens.resolve(request(Some("HMEEEE5555"))).await.unwrap_err();
    assert_eq!(err, GuestLinkError::InvalidCode);

    let resolved = harness.ctx.tokens.resolve(request(Some("hmdddd4444"))).await.unwrap();
    assert!(resolved.requires_code);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_pepper_still_syncs_without_tokens() {
    let server = MockServer::start().await;
    let (start, end) = upcoming(3, 4);
    serve_feed(&server, "/feed.ics", feed(&[("HMDDDD4444", "Reserved", &start, &end)])).await;

    let harness = Harness::new(None, None);
    harness.register(&format!("{}/feed.ics", server.uri())).await;

    let outcome = harness.ctx.sync.sync(PROPERTY_ID, SyncOptions::default()).await.unwrap();

    assert_eq!(outcome.reservations_count, 1);
    assert_eq!(outcome.tokens_created, 0);
    assert_eq!(harness.count("SELECT COUNT(*) FROM guest_verification_tokens"), 0);
}
