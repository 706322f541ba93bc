// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Channel protocol
//!
//! Wire frames and transport seam for the realtime invalidation
//! channel. The transport owns the socket and its reconnection policy;
//! the listener owns the protocol state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a channel transport.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The transport is closed and will not reconnect.
    #[error("channel transport closed")]
    Closed,

    /// The transport failed to deliver a frame.
    #[error("channel transport failure: {0}")]
    Transport(String),
}

/// Protocol position of the listener on its current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No usable connection.
    Offline,
    /// Handshake sent, acknowledgement outstanding.
    AwaitingAck,
    /// Acknowledged; pushes are trusted.
    Established,
}

/// Frames exchanged over the realtime channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ChannelFrame {
    /// Client opener: authenticates the connection for one project.
    Handshake { token: String, project_id: String },
    /// Server acknowledgement of a handshake.
    HandshakeAck,
    /// Server notification that a resource changed.
    #[serde(rename = "resource-updated")]
    ResourceUpdated { resource_id: String },
}

/// Connection-level events a transport reports to the listener.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A connection is up. Every connection needs its own handshake.
    Connected,
    /// A frame arrived on the live connection.
    Frame(ChannelFrame),
    /// The connection dropped. Reconnecting is the transport's job.
    Disconnected,
}

/// Bidirectional frame transport for the realtime channel.
///
/// Implementations wrap a concrete socket (or an in-memory pair for
/// tests) and surface connection changes as [`TransportEvent`]s.
#[async_trait]
pub trait ChannelTransport: Send {
    /// Waits for the next event. `None` means the transport is gone
    /// for good and the listener should stop.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Sends one frame over the live connection.
    async fn send(&mut self, frame: ChannelFrame) -> Result<(), ChannelError>;
}
