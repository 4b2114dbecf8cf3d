use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::client::api::ApiClient;
use crate::client::markers::{MarkerBoard, MarkerSink};
use crate::status::board::{Clock, SystemClock};

/// Drives the commuter-view loop: poll both feeds, fold the result
/// into the marker board, wait, repeat. Ticks never overlap; a slow
/// response simply delays the next poll.
pub struct Watcher {
    api: ApiClient,
    board: MarkerBoard,
    interval: Duration,
}

impl Watcher {
    pub fn new(api: ApiClient, interval: Duration, timeout_ms: i64) -> Self {
        Self {
            api,
            board: MarkerBoard::new(timeout_ms),
            interval,
        }
    }

    /// Polls until ctrl-c.
    pub async fn run(mut self, sink: &mut dyn MarkerSink) -> anyhow::Result<()> {
        let mut ticker = super::steady_ticker(self.interval);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(sink).await,
                _ = &mut ctrl_c => break,
            }
        }
        Ok(())
    }

    /// One poll: both feeds fetched concurrently. A failed location
    /// fetch skips the whole tick so markers never flicker on a dropped
    /// connection; a failed status fetch only costs the labels.
    pub async fn tick(&mut self, sink: &mut dyn MarkerSink) {
        let (locations, statuses) =
            tokio::join!(self.api.fetch_locations(), self.api.fetch_statuses());

        let locations = match locations {
            Ok(locations) => locations,
            Err(e) => {
                debug!(error = %e, "location poll failed; keeping markers");
                return;
            }
        };
        let statuses = statuses.unwrap_or_else(|e| {
            debug!(error = %e, "status poll failed");
            HashMap::new()
        });

        self.board
            .apply(SystemClock.now_ms(), &locations, &statuses, sink);
    }
}
