// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory channel transport
//!
//! Scripted stand-in for a real socket. Tests and offline development
//! drive connection events and server frames by hand through the
//! paired handle.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::channel::{ChannelError, ChannelFrame, ChannelTransport, TransportEvent};

/// Creates a connected transport/handle pair.
pub fn mock_channel() -> (MockChannel, MockChannelHandle) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (sent_tx, sent_rx) = mpsc::unbounded_channel();
    (
        MockChannel {
            events: event_rx,
            sent: sent_tx,
        },
        MockChannelHandle {
            events: event_tx,
            sent: sent_rx,
        },
    )
}

/// Transport half: handed to the engine in place of a real socket.
pub struct MockChannel {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    sent: mpsc::UnboundedSender<ChannelFrame>,
}

#[async_trait]
impl ChannelTransport for MockChannel {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    async fn send(&mut self, frame: ChannelFrame) -> Result<(), ChannelError> {
        self.sent.send(frame).map_err(|_| ChannelError::Closed)
    }
}

/// Scripting half: plays the server's side of the channel.
pub struct MockChannelHandle {
    events: mpsc::UnboundedSender<TransportEvent>,
    sent: mpsc::UnboundedReceiver<ChannelFrame>,
}

impl MockChannelHandle {
    /// Signals that a connection came up.
    pub fn connect(&self) {
        let _ = self.events.send(TransportEvent::Connected);
    }

    /// Signals that the connection dropped.
    pub fn disconnect(&self) {
        let _ = self.events.send(TransportEvent::Disconnected);
    }

    /// Delivers a server frame.
    pub fn frame(&self, frame: ChannelFrame) {
        let _ = self.events.send(TransportEvent::Frame(frame));
    }

    /// Acknowledges the pending handshake.
    pub fn ack(&self) {
        self.frame(ChannelFrame::HandshakeAck);
    }

    /// Pushes an invalidation for one remote ID.
    pub fn push_update(&self, resource_id: &str) {
        self.frame(ChannelFrame::ResourceUpdated {
            resource_id: resource_id.to_string(),
        });
    }

    /// Next frame the client sent, once one arrives.
    pub async fn next_sent(&mut self) -> Option<ChannelFrame> {
        self.sent.recv().await
    }
}
