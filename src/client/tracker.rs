use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use crate::client::api::{ApiClient, ClientError};
use crate::geo::LatLng;
use crate::status::dto::DriverStatus;

/// Settings for a simulated drive along a waypoint loop.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub send_interval: Duration,
    /// Re-announce "On Route" every this many position sends.
    pub status_every: u32,
    /// Radius of the random wobble applied to each sent point, meters.
    pub jitter_m: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            send_interval: Duration::from_millis(super::DEFAULT_SEND_INTERVAL_MS),
            status_every: 15,
            jitter_m: 15.0,
        }
    }
}

/// Replays a waypoint loop as live position reports, the way the
/// in-cab tracker follows real GPS fixes. Network hiccups are logged
/// and skipped; an auth rejection ends the drive.
pub struct DriveLoop {
    api: ApiClient,
    token: String,
    driver_id: i32,
    waypoints: Vec<LatLng>,
    config: DriveConfig,
}

impl DriveLoop {
    pub fn new(
        api: ApiClient,
        token: String,
        driver_id: i32,
        waypoints: Vec<LatLng>,
        config: DriveConfig,
    ) -> Self {
        Self {
            api,
            token,
            driver_id,
            waypoints,
            config,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.waypoints.is_empty(), "no waypoints to drive");
        let status_every = self.config.status_every.max(1);

        if let Err(e) = self
            .api
            .post_status(&self.token, self.driver_id, DriverStatus::OnRoute)
            .await
        {
            warn!(error = %e, "could not announce initial status");
        }

        let mut ticker = super::steady_ticker(self.config.send_interval);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut tick: u32 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let base = self.waypoints[tick as usize % self.waypoints.len()];
                    let position = jitter(base, self.config.jitter_m);

                    match self.api.post_location(&self.token, self.driver_id, position).await {
                        Ok(()) => info!(lat = position.lat, lng = position.lng, "position sent"),
                        Err(ClientError::Unauthorized(message)) => {
                            anyhow::bail!("authentication rejected: {message}");
                        }
                        Err(e) => warn!(error = %e, "position send failed; continuing"),
                    }

                    tick = tick.wrapping_add(1);
                    if tick % status_every == 0 {
                        if let Err(e) = self
                            .api
                            .post_status(&self.token, self.driver_id, DriverStatus::OnRoute)
                            .await
                        {
                            warn!(error = %e, "status refresh failed");
                        }
                    }
                }
                _ = &mut ctrl_c => {
                    // Best effort; the board ages the entry out anyway.
                    let _ = self
                        .api
                        .post_status(&self.token, self.driver_id, DriverStatus::End)
                        .await;
                    info!("drive ended");
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Offset a point by up to `radius_m` in each axis, at roughly 111.32
/// km per degree.
fn jitter(point: LatLng, radius_m: f64) -> LatLng {
    if radius_m <= 0.0 {
        return point;
    }
    let deg = radius_m / 111_320.0;
    let mut rng = rand::thread_rng();
    LatLng {
        lat: point.lat + rng.gen_range(-deg..deg),
        lng: point.lng + rng.gen_range(-deg..deg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_the_radius() {
        let base = LatLng {
            lat: 14.8433,
            lng: 120.8114,
        };
        let max_deg = 15.0 / 111_320.0;
        for _ in 0..200 {
            let moved = jitter(base, 15.0);
            assert!((moved.lat - base.lat).abs() <= max_deg);
            assert!((moved.lng - base.lng).abs() <= max_deg);
        }
    }

    #[test]
    fn zero_radius_leaves_the_point_alone() {
        let base = LatLng {
            lat: 14.8433,
            lng: 120.8114,
        };
        assert_eq!(jitter(base, 0.0), base);
    }
}
