//! Client-side plumbing shared by the tracker binary: a typed HTTP
//! client, the marker lifecycle the commuter map runs, the driver send
//! loop and the OSRM detour for road ETAs.

use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

pub mod api;
pub mod markers;
pub mod osrm;
pub mod tracker;
pub mod watcher;

/// How often the commuter view polls the feeds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
/// Feed entries older than this get their marker dropped.
pub const DEFAULT_MARKER_TIMEOUT_MS: i64 = 10_000;
/// How often a driving client reports its position.
pub const DEFAULT_SEND_INTERVAL_MS: u64 = 2_000;

/// Ticker for the send and poll loops. The period is floored at one
/// millisecond since `interval` panics on zero, and a missed tick
/// pushes the schedule back instead of bursting catch-up requests, so
/// the spacing between requests never drops below the period.
pub(crate) fn steady_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
