use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// The four phases a jeepney announces over a trip. Wire strings match
/// the labels the driver app shows, spaces included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverStatus {
    Docking,
    Loading,
    #[serde(rename = "On Route")]
    OnRoute,
    End,
}

impl FromStr for DriverStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Docking" => Ok(DriverStatus::Docking),
            "Loading" => Ok(DriverStatus::Loading),
            "On Route" => Ok(DriverStatus::OnRoute),
            "End" => Ok(DriverStatus::End),
            _ => Err(ApiError::InvalidStatus),
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DriverStatus::Docking => "Docking",
            DriverStatus::Loading => "Loading",
            DriverStatus::OnRoute => "On Route",
            DriverStatus::End => "End",
        })
    }
}

/// Request body for a status report. Any `timestamp` the client sends
/// is ignored; the board stamps entries itself.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(rename = "driverId")]
    pub driver_id: Option<i32>,
    pub status: Option<String>,
}

/// One board entry: the reported phase and the server-side arrival
/// time in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: DriverStatus,
    pub timestamp: i64,
}

/// Response to a status report.
#[derive(Debug, Serialize)]
pub struct StatusAck {
    pub message: &'static str,
    pub status: StatusEntry,
}
