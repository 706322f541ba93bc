// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Realtime channel
//!
//! Push-driven cache invalidation: protocol frames, the transport
//! seam, the listener state machine and an in-memory transport for
//! tests.

mod channel;
mod listener;
mod mock;

pub(crate) use listener::spawn_listener;
pub use channel::{ChannelError, ChannelFrame, ChannelState, ChannelTransport, TransportEvent};
pub use mock::{mock_channel, MockChannel, MockChannelHandle};
