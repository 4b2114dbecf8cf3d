//! Transient driver status board.
//!
//! Statuses live only in process memory. A restart clears the board and
//! drivers repopulate it with their next report; nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tracing::debug;

use crate::status::dto::{DriverStatus, StatusEntry};

/// Source of "now" in epoch milliseconds. The board takes it as a
/// constructor argument so tests can steer time.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock used outside tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Test clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock(std::sync::atomic::AtomicI64);

#[cfg(test)]
impl ManualClock {
    pub fn new(start_ms: i64) -> Arc<Self> {
        Arc::new(Self(std::sync::atomic::AtomicI64::new(start_ms)))
    }

    pub fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct StatusBoard {
    entries: Arc<DashMap<i32, StatusEntry>>,
    clock: Arc<dyn Clock>,
    fresh_ms: i64,
}

impl StatusBoard {
    pub fn new(clock: Arc<dyn Clock>, fresh: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
            fresh_ms: fresh.as_millis() as i64,
        }
    }

    /// Record a status, stamped with the board's clock. A later report
    /// for the same driver overwrites the earlier one.
    pub fn set(&self, driver_id: i32, status: DriverStatus) -> StatusEntry {
        let entry = StatusEntry {
            status,
            timestamp: self.clock.now_ms(),
        };
        self.entries.insert(driver_id, entry);
        entry
    }

    /// Snapshot of the entries still strictly inside the freshness
    /// window. An entry aged exactly the window is already out.
    pub fn fresh(&self) -> HashMap<i32, StatusEntry> {
        let now = self.clock.now_ms();
        self.entries
            .iter()
            .filter(|kv| now - kv.value().timestamp < self.fresh_ms)
            .map(|kv| (*kv.key(), *kv.value()))
            .collect()
    }

    /// Drop entries no longer inside the freshness window; returns how
    /// many went.
    pub fn purge_stale(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now - entry.timestamp < self.fresh_ms);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Purge in the background for as long as the process lives. Reads
    /// already filter by freshness; this just keeps memory bounded when
    /// drivers go quiet without sending `End`.
    pub fn spawn_sweeper(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let board = self.clone();
        tokio::spawn(async move {
            // A zero period would panic the interval timer and silently
            // kill this task.
            let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = board.purge_stale();
                if removed > 0 {
                    debug!(removed, "swept stale driver statuses");
                }
            }
        })
    }
}
