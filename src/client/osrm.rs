use anyhow::{bail, Context};
use serde::Deserialize;

use crate::geo::LatLng;

pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
}

/// Distance and travel time of the best road route between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
}

impl RouteSummary {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    pub fn eta_minutes(&self) -> i64 {
        (self.duration_s / 60.0).round() as i64
    }
}

/// Ask OSRM for the driving route between two points. Coordinates go
/// into the path as `lng,lat` pairs because that is OSRM's order, not
/// ours.
pub async fn route_summary(
    http: &reqwest::Client,
    base: &str,
    from: LatLng,
    to: LatLng,
) -> anyhow::Result<RouteSummary> {
    let url = format!(
        "{}/route/v1/driving/{},{};{},{}?overview=false",
        base.trim_end_matches('/'),
        from.lng,
        from.lat,
        to.lng,
        to.lat
    );
    let response = http.get(&url).send().await.context("osrm request failed")?;
    let parsed: OsrmResponse = response
        .json()
        .await
        .context("osrm response was not json")?;

    if parsed.code != "Ok" {
        bail!("osrm returned code {}", parsed.code);
    }
    let route = parsed
        .routes
        .into_iter()
        .next()
        .context("osrm returned no routes")?;
    Ok(RouteSummary {
        distance_m: route.distance,
        duration_s: route.duration,
    })
}
