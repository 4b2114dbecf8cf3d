//! Terminal companion for the Lakbay server: simulate a driver's
//! in-cab tracker, watch the live map feed, or inspect routes.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use lakbay::auth::role::Role;
use lakbay::client::api::ApiClient;
use lakbay::client::markers::{EvictReason, MarkerSink};
use lakbay::client::osrm;
use lakbay::client::tracker::{DriveConfig, DriveLoop};
use lakbay::client::watcher::Watcher;
use lakbay::client::{DEFAULT_MARKER_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SEND_INTERVAL_MS};
use lakbay::geo::{self, LatLng};
use lakbay::locations::dto::LocationEntry;
use lakbay::status::dto::StatusEntry;

#[derive(Parser)]
#[command(name = "lakbay-tracker", about = "Lakbay ride tracking client")]
struct Cli {
    /// Base URL of the Lakbay server.
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in as a driver and replay a waypoint file as live positions.
    Drive {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// JSON file holding an array of {"lat": .., "lng": ..} points.
        #[arg(long)]
        waypoints: PathBuf,
        /// Milliseconds between position sends.
        #[arg(long, default_value_t = DEFAULT_SEND_INTERVAL_MS)]
        interval_ms: u64,
        /// Random wobble applied to each sent point, meters.
        #[arg(long, default_value_t = 15.0)]
        jitter_m: f64,
    },
    /// Poll the public feed and print marker changes as they happen.
    Watch {
        /// Milliseconds between polls.
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
        interval_ms: u64,
        /// Drop a marker when its feed entry is older than this.
        #[arg(long, default_value_t = DEFAULT_MARKER_TIMEOUT_MS)]
        timeout_ms: i64,
    },
    /// List routes, optionally ranked against a point.
    Routes {
        /// Only show routes with this exact name.
        #[arg(long)]
        name: Option<String>,
        /// A "lat,lng" point to find the nearest route to.
        #[arg(long, value_parser = parse_latlng)]
        near: Option<LatLng>,
        /// Also ask OSRM for road distance and travel time to the
        /// nearest waypoint. Needs --near.
        #[arg(long)]
        eta: bool,
        #[arg(long, default_value = osrm::DEFAULT_OSRM_URL)]
        osrm_url: String,
    },
}

fn parse_latlng(raw: &str) -> Result<LatLng, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got {raw:?}"))?;
    let lat = lat
        .trim()
        .parse()
        .map_err(|e| format!("bad latitude: {e}"))?;
    let lng = lng
        .trim()
        .parse()
        .map_err(|e| format!("bad longitude: {e}"))?;
    Ok(LatLng { lat, lng })
}

/// Prints one line per marker transition, the terminal stand-in for
/// moving pins on a map.
struct ConsoleSink;

impl ConsoleSink {
    fn label(entry: &LocationEntry, status: Option<&StatusEntry>) -> String {
        let mut parts = Vec::new();
        if let Some(name) = &entry.name {
            parts.push(name.clone());
        }
        if let Some(status) = status {
            parts.push(status.status.to_string());
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

impl MarkerSink for ConsoleSink {
    fn marker_added(&mut self, driver_id: i32, entry: &LocationEntry, status: Option<&StatusEntry>) {
        println!(
            "+ driver {driver_id} at {:.5},{:.5}{}",
            entry.lat,
            entry.lng,
            Self::label(entry, status)
        );
    }

    fn marker_moved(&mut self, driver_id: i32, entry: &LocationEntry, status: Option<&StatusEntry>) {
        println!(
            "~ driver {driver_id} at {:.5},{:.5}{}",
            entry.lat,
            entry.lng,
            Self::label(entry, status)
        );
    }

    fn marker_removed(&mut self, driver_id: i32, reason: EvictReason) {
        let why = match reason {
            EvictReason::Missing => "left the feed",
            EvictReason::Stale => "went stale",
        };
        println!("- driver {driver_id} ({why})");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "lakbay=info".to_string());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let api = ApiClient::new(cli.server);

    match cli.command {
        Command::Drive {
            email,
            password,
            waypoints,
            interval_ms,
            jitter_m,
        } => {
            let login = api.login(Role::Driver, &email, &password).await?;
            let driver_id = login
                .driver_id
                .context("login response had no driverId")?;
            let raw = std::fs::read(&waypoints)
                .with_context(|| format!("read {}", waypoints.display()))?;
            let points: Vec<LatLng> = serde_json::from_slice(&raw)
                .with_context(|| format!("parse {}", waypoints.display()))?;
            let config = DriveConfig {
                send_interval: Duration::from_millis(interval_ms),
                jitter_m,
                ..DriveConfig::default()
            };
            DriveLoop::new(api, login.token, driver_id, points, config)
                .run()
                .await
        }
        Command::Watch {
            interval_ms,
            timeout_ms,
        } => {
            let mut sink = ConsoleSink;
            Watcher::new(api, Duration::from_millis(interval_ms), timeout_ms)
                .run(&mut sink)
                .await
        }
        Command::Routes {
            name,
            near,
            eta,
            osrm_url,
        } => {
            let routes = api.fetch_routes(name.as_deref()).await?;
            for route in &routes {
                println!(
                    "#{} {} [{}] {} points",
                    route.id,
                    route.name,
                    route.color.as_deref().unwrap_or("-"),
                    route.waypoints.len()
                );
            }
            if let Some(from) = near {
                match geo::nearest_route(&routes, from) {
                    Some(nearest) => {
                        println!(
                            "nearest: {} ({:.0} m to its closest waypoint)",
                            nearest.route.name, nearest.distance_m
                        );
                        if eta {
                            let http = reqwest::Client::new();
                            let summary =
                                osrm::route_summary(&http, &osrm_url, from, nearest.waypoint)
                                    .await?;
                            println!(
                                "by road: {:.2} km, about {} min",
                                summary.distance_km(),
                                summary.eta_minutes()
                            );
                        }
                    }
                    None => println!("no route has waypoints yet"),
                }
            } else if eta {
                println!("--eta needs --near");
            }
            Ok(())
        }
    }
}
