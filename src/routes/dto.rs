use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// A published jeepney route. `waypoints` traces the path in travel
/// order; empty is legal for routes still being drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub id: i32,
    pub driver_id: Option<i32>,
    pub name: String,
    pub color: Option<String>,
    pub waypoints: Vec<LatLng>,
}

/// Query string for the route list.
#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub name: Option<String>,
}
