// SPDX-FileCopyrightText: 2026 Lexio Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Poll scheduler
//!
//! Periodic safety net behind the realtime channel: fires a refresh
//! tick at a fixed period until shut down. Missed ticks are skipped,
//! not replayed, so a machine waking from sleep runs one refresh
//! instead of a burst.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// Shortest accepted poll period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Longest accepted poll period.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(600);

/// Clamps a requested poll period into the accepted range.
pub fn clamp_poll_interval(requested: Duration) -> Duration {
    requested.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

/// Spawns the scheduler task. `tick` runs once per period until the
/// shutdown flag flips; the startup refresh belongs to the engine, so
/// the first tick fires one full period in.
pub(crate) fn spawn_poller<F>(
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let period = clamp_poll_interval(period);
        debug!("Polling every {}s", period.as_secs());
        let mut timer = time::interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // An interval's first tick completes immediately; swallow it.
        timer.tick().await;
        loop {
            tokio::select! {
                _ = timer.tick() => tick(),
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("Poll scheduler stopped");
    })
}
