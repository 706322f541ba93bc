// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for update delivery
//!
//! Scenarios:
//! - Registered callbacks receive resolved values after a sync
//! - Removed handlers stop receiving
//! - The broadcast feed signals every delivered update
//! - A panicking handler does not take down delivery

use std::sync::mpsc;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::MockServer;

use lexio_core::{Resource, ResourceUpdate, UpdatePayload};

use super::support::*;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test(flavor = "multi_thread")]
async fn test_on_updated_delivers_resolved_values() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server).await;
    mount_home(&server).await;
    mount_fallback(&server).await;

    let lexio = client(&server, &temp).await;
    let home = Resource::tab("home");

    let (tx, rx) = mpsc::channel::<ResourceUpdate>();
    lexio.on_updated(&home, move |update| {
        let _ = tx.send(update.clone());
    });

    assert!(lexio.sync(&home).await);

    let update = rx.recv_timeout(WAIT).expect("update delivered");
    assert_eq!(update.resource, home);
    match &update.payload {
        UpdatePayload::Entries(entries) => assert_eq!(entries["title"], "Home"),
        UpdatePayload::Records(_) => panic!("tab update carried records"),
    }
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_removed_handler_stops_receiving() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server).await;
    mount_home(&server).await;
    mount_fallback(&server).await;

    let lexio = client(&server, &temp).await;
    let home = Resource::tab("home");

    let (a_tx, a_rx) = mpsc::channel::<String>();
    let (b_tx, b_rx) = mpsc::channel::<String>();
    let a_id = lexio.on_updated(&home, move |update| {
        let _ = a_tx.send(update.resource.slug());
    });
    lexio.on_updated(&home, move |update| {
        let _ = b_tx.send(update.resource.slug());
    });

    assert!(lexio.sync(&home).await);
    assert_eq!(a_rx.recv_timeout(WAIT).unwrap(), "tab:home");
    assert_eq!(b_rx.recv_timeout(WAIT).unwrap(), "tab:home");

    assert!(lexio.remove_handler(a_id));
    assert!(!lexio.remove_handler(a_id), "double removal is rejected");

    assert!(lexio.sync(&home).await);
    // B receiving the second update proves the delivery task got to it;
    // A must see nothing past that point.
    assert_eq!(b_rx.recv_timeout(WAIT).unwrap(), "tab:home");
    assert!(a_rx.try_recv().is_err());
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_broadcast_signals_every_update() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server).await;
    mount_home(&server).await;
    mount_fallback(&server).await;

    let lexio = client(&server, &temp).await;
    let mut changes = lexio.subscribe_changes();

    assert!(lexio.sync(&Resource::tab("home")).await);

    // The startup pass may emit color/image signals first; scan past
    // them to the tab signal.
    let mut seen = Vec::new();
    let mut got_home = false;
    for _ in 0..10 {
        match tokio::time::timeout(WAIT, changes.recv()).await {
            Ok(Ok(changed)) => {
                if changed.slug == "tab:home" {
                    got_home = true;
                    break;
                }
                seen.push(changed.slug);
            }
            _ => break,
        }
    }
    assert!(got_home, "no tab:home signal on the change feed, saw {:?}", seen);
    lexio.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_panicking_handler_is_isolated() {
    init_tracing();
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_auth(&server).await;
    mount_home(&server).await;
    mount_fallback(&server).await;

    let lexio = client(&server, &temp).await;
    let home = Resource::tab("home");

    // Registered first, so it panics before the collector runs.
    lexio.on_updated(&home, |_| panic!("handler bug"));
    let (tx, rx) = mpsc::channel::<String>();
    lexio.on_updated(&home, move |update| {
        let _ = tx.send(update.resource.slug());
    });

    assert!(lexio.sync(&home).await);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "tab:home");

    // The delivery task survived the panic and keeps delivering.
    assert!(lexio.sync(&home).await);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), "tab:home");
    lexio.shutdown();
}
