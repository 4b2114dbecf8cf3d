use serde::{Deserialize, Serialize};

use crate::routes::dto::RouteInfo;

/// A WGS84 coordinate pair, the unit every map-facing API speaks in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two coordinates.
pub fn haversine_m(a: LatLng, b: LatLng) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// The route whose closest waypoint is nearest to a reference point.
#[derive(Debug, Clone, Copy)]
pub struct Nearest<'a> {
    pub route: &'a RouteInfo,
    pub waypoint: LatLng,
    pub distance_m: f64,
}

/// Scans every waypoint of every route and returns the overall closest
/// one. Routes without waypoints never win; `None` if nothing has any.
pub fn nearest_route<'a>(routes: &'a [RouteInfo], from: LatLng) -> Option<Nearest<'a>> {
    let mut best: Option<Nearest<'a>> = None;
    for route in routes {
        for &waypoint in &route.waypoints {
            let distance_m = haversine_m(from, waypoint);
            if best.as_ref().map_or(true, |b| distance_m < b.distance_m) {
                best = Some(Nearest {
                    route,
                    waypoint,
                    distance_m,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: i32, name: &str, waypoints: Vec<LatLng>) -> RouteInfo {
        RouteInfo {
            id,
            driver_id: None,
            name: name.into(),
            color: None,
            waypoints,
        }
    }

    #[test]
    fn haversine_of_identical_points_is_zero() {
        let p = LatLng {
            lat: 14.8433,
            lng: 120.8114,
        };
        assert_eq!(haversine_m(p, p), 0.0);
    }

    #[test]
    fn haversine_matches_known_equatorial_distance() {
        // 0.01 degrees of longitude on the equator is ~1111.95 m.
        let a = LatLng { lat: 0.0, lng: 0.0 };
        let b = LatLng {
            lat: 0.0,
            lng: 0.01,
        };
        let d = haversine_m(a, b);
        assert!((d - 1111.95).abs() < 1.0, "got {d}");
    }

    #[test]
    fn nearest_route_picks_the_closest_waypoint_overall() {
        let here = LatLng {
            lat: 14.8400,
            lng: 120.8100,
        };
        let far = route(
            1,
            "Malolos - Hagonoy",
            vec![LatLng {
                lat: 14.9000,
                lng: 120.9000,
            }],
        );
        let near = route(
            2,
            "Malolos Crossing",
            vec![
                LatLng {
                    lat: 14.9000,
                    lng: 120.9000,
                },
                LatLng {
                    lat: 14.8401,
                    lng: 120.8101,
                },
            ],
        );
        let routes = vec![far, near];

        let best = nearest_route(&routes, here).expect("some waypoint");
        assert_eq!(best.route.id, 2);
        assert!(best.distance_m < 50.0, "got {}", best.distance_m);
    }

    #[test]
    fn routes_without_waypoints_are_skipped() {
        let here = LatLng { lat: 0.0, lng: 0.0 };
        let empty = route(1, "Empty", vec![]);
        assert!(nearest_route(std::slice::from_ref(&empty), here).is_none());

        let with_points = route(
            2,
            "Real",
            vec![LatLng {
                lat: 1.0,
                lng: 1.0,
            }],
        );
        let routes = vec![empty, with_points];
        let best = nearest_route(&routes, here).expect("falls through to the real route");
        assert_eq!(best.route.id, 2);
    }
}
