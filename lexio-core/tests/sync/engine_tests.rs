// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for sync cycles against a mock backend
//!
//! Scenarios:
//! - Fetch, merge and serve a translation tab
//! - Concurrent syncs for one resource collapse to one request
//! - One authentication shared across resources
//! - Expired session re-authenticates on the next cycle
//! - 404 responses succeed with empty content
//! - Re-fetches merge additively
//! - Failed cycles keep serving cached content
//! - No credentials, no network traffic

use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lexio_core::{Lexio, Resource};

use super::support::*;

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_fetches_and_merges_tab() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server, &[], &[]).await;
    mount_reserved_empty(&server).await;
    mount_home_tab(&server).await;

    let lexio = Lexio::new(test_config(&server, &temp)).unwrap();
    lexio.configure("key", "secret").unwrap();

    assert!(lexio.sync(&Resource::tab("home")).await);
    assert_eq!(lexio.translation("title", "home"), "Home");
    assert_eq!(lexio.translation("subtitle", "home"), "Welcome");
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_syncs_deduplicate() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server, &[], &[]).await;
    mount_reserved_empty(&server).await;
    // The delay keeps the first cycle in flight while the second starts.
    Mock::given(method("GET"))
        .and(path(format!("/resource/{}/home", PROJECT)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(home_tab_body()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let lexio = Lexio::new(test_config(&server, &temp)).unwrap();
    lexio.configure("key", "secret").unwrap();

    let home = Resource::tab("home");
    let (first, second) = tokio::join!(lexio.sync(&home), lexio.sync(&home));
    assert!(
        first ^ second,
        "exactly one of the concurrent cycles may run"
    );
    assert_eq!(lexio.translation("title", "home"), "Home");
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_authentication_happens_once() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": TOKEN,
            "tabs": [],
            "stores": [],
            "availableLanguages": ["en"],
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_reserved_empty(&server).await;
    mount_home_tab(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/resource/{}/about", PROJECT)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let lexio = Lexio::new(test_config(&server, &temp)).unwrap();
    lexio.configure("key", "secret").unwrap();

    // Both cycles and the configure catch-up race for the session; the
    // auth gate collapses them into the single expected POST.
    let home_tab = Resource::tab("home");
    let about_tab = Resource::tab("about");
    let (home, about) = tokio::join!(lexio.sync(&home_tab), lexio.sync(&about_tab));
    assert!(home);
    assert!(about);
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_session_reauthenticates() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server, &[], &[]).await;
    mount_reserved_empty(&server).await;
    // First fetch is rejected; the retry after re-auth succeeds.
    Mock::given(method("GET"))
        .and(path(format!("/resource/{}/home", PROJECT)))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_home_tab(&server).await;

    let lexio = Lexio::new(test_config(&server, &temp)).unwrap();
    lexio.configure("key", "secret").unwrap();

    let home = Resource::tab("home");
    assert!(!lexio.sync(&home).await, "rejected cycle reports failure");
    assert!(lexio.sync(&home).await, "next cycle re-authenticates");
    assert_eq!(lexio.translation("title", "home"), "Home");

    let auths = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/auth")
        .count();
    assert!(auths >= 2, "the dropped session forced a fresh auth");
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_resource_is_successful_and_empty() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server, &[], &[]).await;
    // Every content path 404s: published projects can still have
    // resources with nothing in them.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let lexio = Lexio::new(test_config(&server, &temp)).unwrap();
    lexio.configure("key", "secret").unwrap();

    assert!(lexio.sync(&Resource::store("faq")).await);
    assert!(lexio.records("faq").is_empty());

    assert!(lexio.sync(&Resource::tab("legal")).await);
    assert_eq!(lexio.translation("terms", "legal"), "");
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_listing_seeds_refresh_targets() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server, &["home", "about"], &["faq"]).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let lexio = Lexio::new(test_config(&server, &temp)).unwrap();
    lexio.configure("key", "secret").unwrap();

    // Open the session, then refresh everything the listing announced.
    assert!(lexio.sync(&Resource::tab("boot")).await);
    lexio.sync_all().await;

    for p in [
        format!("/resource/{}/home", PROJECT),
        format!("/resource/{}/about", PROJECT),
        format!("/store/{}/faq", PROJECT),
    ] {
        assert!(
            requests_for(&server, &p).await >= 1,
            "expected a refresh of {}",
            p
        );
    }
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refetch_merges_additively() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server, &[], &[]).await;
    mount_reserved_empty(&server).await;
    // The second publish dropped the subtitle key entirely.
    Mock::given(method("GET"))
        .and(path(format!("/resource/{}/home", PROJECT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(home_tab_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/resource/{}/home", PROJECT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"key": "title", "values": {"en": "Home v2"}}]
        })))
        .mount(&server)
        .await;

    let lexio = Lexio::new(test_config(&server, &temp)).unwrap();
    lexio.configure("key", "secret").unwrap();

    let home = Resource::tab("home");
    assert!(lexio.sync(&home).await);
    assert_eq!(lexio.translation("subtitle", "home"), "Welcome");

    assert!(lexio.sync(&home).await);
    assert_eq!(lexio.translation("title", "home"), "Home v2");
    // Keys absent from the re-fetch survive.
    assert_eq!(lexio.translation("subtitle", "home"), "Welcome");
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_cycle_keeps_cached_content() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server, &[], &[]).await;
    mount_reserved_empty(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/resource/{}/home", PROJECT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(home_tab_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/resource/{}/home", PROJECT)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let lexio = Lexio::new(test_config(&server, &temp)).unwrap();
    lexio.configure("key", "secret").unwrap();

    let home = Resource::tab("home");
    assert!(lexio.sync(&home).await);
    assert!(!lexio.sync(&home).await, "server error reports failure");
    assert_eq!(
        lexio.translation("title", "home"),
        "Home",
        "stale content outlives a failed refresh"
    );
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_without_credentials_makes_no_requests() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let lexio = Lexio::new(test_config(&server, &temp)).unwrap();
    assert!(!lexio.sync(&Resource::tab("home")).await);

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    lexio.shutdown();
}
