// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Channel listener
//!
//! Drives the channel protocol over whatever transport it is given:
//! handshake on connect, wait for the acknowledgement, then turn pushes
//! into targeted syncs. Pushes received before the acknowledgement are
//! dropped; the catch-up refresh on establishment covers them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::sync::{SyncEngine, WILDCARD_ID};

use super::channel::{ChannelFrame, ChannelState, ChannelTransport, TransportEvent};

/// Spawns the listener task. The `connected` flag mirrors whether the
/// channel is currently established.
pub(crate) fn spawn_listener(
    engine: SyncEngine,
    mut transport: Box<dyn ChannelTransport>,
    mut shutdown: watch::Receiver<bool>,
    connected: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut state = ChannelState::Offline;
        loop {
            let event = tokio::select! {
                event = transport.next_event() => match event {
                    Some(event) => event,
                    None => break,
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            };

            match event {
                TransportEvent::Connected => {
                    state = open_channel(&engine, transport.as_mut()).await;
                }
                TransportEvent::Disconnected => {
                    if state == ChannelState::Established {
                        debug!("Realtime channel lost; transport reconnects");
                    }
                    state = ChannelState::Offline;
                    connected.store(false, Ordering::SeqCst);
                }
                TransportEvent::Frame(ChannelFrame::HandshakeAck) => {
                    if state == ChannelState::AwaitingAck {
                        state = ChannelState::Established;
                        connected.store(true, Ordering::SeqCst);
                        info!("Realtime channel established");
                        // Catch up on pushes missed while offline.
                        engine.sync_detached();
                    } else {
                        debug!("Ignoring ack in {:?} state", state);
                    }
                }
                TransportEvent::Frame(ChannelFrame::ResourceUpdated { resource_id }) => {
                    if state != ChannelState::Established {
                        debug!("Ignoring push for {} before ack", resource_id);
                        continue;
                    }
                    if resource_id == WILDCARD_ID {
                        debug!("Wildcard invalidation received");
                        engine.sync_detached();
                    } else {
                        let resource = engine.resolve_remote_id(&resource_id);
                        engine.spawn_sync(resource);
                    }
                }
                TransportEvent::Frame(ChannelFrame::Handshake { .. }) => {
                    debug!("Ignoring handshake frame from server");
                }
            }
        }
        connected.store(false, Ordering::SeqCst);
        debug!("Channel listener stopped");
    })
}

/// Sends the handshake for a fresh connection. Failures leave the
/// channel offline; the poll scheduler still covers updates.
async fn open_channel(engine: &SyncEngine, transport: &mut dyn ChannelTransport) -> ChannelState {
    let token = match engine.handshake_token().await {
        Ok(token) => token,
        Err(e) => {
            warn!("Cannot open realtime channel: {}", e);
            return ChannelState::Offline;
        }
    };
    let frame = ChannelFrame::Handshake {
        token,
        project_id: engine.config().project_id.clone(),
    };
    match transport.send(frame).await {
        Ok(()) => ChannelState::AwaitingAck,
        Err(e) => {
            warn!("Handshake send failed: {}", e);
            ChannelState::Offline
        }
    }
}
