// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for cache durability
//!
//! Scenarios:
//! - Synced content is served after a restart with no network
//! - A corrupt snapshot is discarded and rebuilt from the backend
//! - clear_cache removes the content files but keeps credentials

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lexio_core::{Lexio, LexioConfig, Resource};

const PROJECT: &str = "proj";

fn config(server: &MockServer, temp: &TempDir) -> LexioConfig {
    LexioConfig::new(server.uri(), PROJECT, temp.path())
}

/// Auth, a published "home" tab and 404 for everything else.
async fn mount_backend(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-1",
            "tabs": [],
            "stores": [],
            "availableLanguages": ["en"],
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/resource/{}/home", PROJECT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"key": "title", "values": {"en": "Home"}}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..150 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread")]
async fn test_content_survives_restart_without_network() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_backend(&server).await;

    {
        let lexio = Lexio::new(config(&server, &temp)).unwrap();
        lexio.configure("key", "secret").unwrap();
        assert!(lexio.sync(&Resource::tab("home")).await);
        lexio.shutdown();
    }
    // The backend is gone; only the snapshot remains.
    drop(server);

    let offline = LexioConfig::new("http://127.0.0.1:9", PROJECT, temp.path());
    let lexio = Lexio::new(offline).unwrap();
    assert_eq!(lexio.translation("title", "home"), "Home");
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_corrupt_snapshot_is_discarded_and_rebuilt() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_backend(&server).await;

    {
        let lexio = Lexio::new(config(&server, &temp)).unwrap();
        lexio.configure("key", "secret").unwrap();
        assert!(lexio.sync(&Resource::tab("home")).await);
        lexio.shutdown();
    }

    let snapshot = temp.path().join("lexio").join("cache.json");
    assert!(snapshot.exists());
    std::fs::write(&snapshot, b"{ this is not json").unwrap();

    // Startup self-heals: the mangled file is dropped, the first read
    // serves the sentinel and bootstraps a resync.
    let lexio = Lexio::new(config(&server, &temp)).unwrap();
    assert_eq!(lexio.translation("title", "home"), "");
    assert!(!snapshot.exists(), "corrupt snapshot deleted on load");
    assert!(eventually(|| lexio.translation("title", "home") == "Home").await);
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clear_cache_removes_content_but_keeps_credentials() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_backend(&server).await;

    let lexio = Lexio::new(config(&server, &temp)).unwrap();
    lexio.configure("key", "secret").unwrap();
    assert!(lexio.sync(&Resource::tab("home")).await);
    assert_eq!(lexio.translation("title", "home"), "Home");

    lexio.clear_cache();

    let dir = temp.path().join("lexio");
    assert!(
        eventually(|| {
            !dir.join("cache.json").exists() && !dir.join("known_resources.json").exists()
        })
        .await,
        "content files removed"
    );
    assert!(dir.join("credentials.json").exists(), "credentials stay");

    // Content is gone, but the next access rebuilds it with the stored
    // credentials and no re-configure.
    assert_eq!(lexio.translation("title", "home"), "");
    assert!(eventually(|| lexio.translation("title", "home") == "Home").await);
    lexio.shutdown();
}
