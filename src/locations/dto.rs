use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Request body for a position report. Fields stay optional so a
/// missing one maps to the flat 400; any `timestamp` the app sends is
/// ignored, the database stamps the row.
#[derive(Debug, Deserialize)]
pub struct LocationUpdate {
    #[serde(rename = "driverId")]
    pub driver_id: Option<i32>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Row returned by the upsert, echoed back to the reporting driver.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LocationRow {
    pub driver_id: i32,
    pub lat: f64,
    pub lng: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Response to a position report.
#[derive(Debug, Serialize)]
pub struct LocationAck {
    pub message: &'static str,
    pub location: LocationRow,
}

/// One entry of the public feed, keyed by driver id in
/// `LocationsResponse`. `updatedAt` is epoch milliseconds so client
/// staleness checks stay plain integer math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_route: Option<String>,
}

/// Public location feed.
#[derive(Debug, Serialize, Deserialize)]
pub struct LocationsResponse {
    pub locations: HashMap<i32, LocationEntry>,
}
