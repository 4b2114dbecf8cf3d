use std::collections::{hash_map::Entry, HashMap};

use crate::locations::dto::LocationEntry;
use crate::status::dto::StatusEntry;

/// Why a marker left the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictReason {
    /// The feed no longer lists the driver.
    Missing,
    /// The feed still lists the driver but the entry is older than the
    /// timeout.
    Stale,
}

/// Receives marker transitions. The terminal watcher prints them; a
/// map view would move pins.
pub trait MarkerSink {
    fn marker_added(&mut self, driver_id: i32, entry: &LocationEntry, status: Option<&StatusEntry>);
    fn marker_moved(&mut self, driver_id: i32, entry: &LocationEntry, status: Option<&StatusEntry>);
    fn marker_removed(&mut self, driver_id: i32, reason: EvictReason);
}

/// Tracks which drivers currently have a marker and folds one poll
/// result at a time into add/move/remove events.
pub struct MarkerBoard {
    /// Marker set, keyed by driver, holding the last applied feed stamp.
    markers: HashMap<i32, i64>,
    timeout_ms: i64,
}

impl MarkerBoard {
    pub fn new(timeout_ms: i64) -> Self {
        Self {
            markers: HashMap::new(),
            timeout_ms,
        }
    }

    /// Apply one poll: first evict markers whose feed entry vanished or
    /// went stale, then add or move a marker for every fresh entry.
    /// Entries already stale on arrival never get a marker.
    pub fn apply(
        &mut self,
        now_ms: i64,
        locations: &HashMap<i32, LocationEntry>,
        statuses: &HashMap<i32, StatusEntry>,
        sink: &mut dyn MarkerSink,
    ) {
        let timeout_ms = self.timeout_ms;

        self.markers.retain(|id, _| match locations.get(id) {
            None => {
                sink.marker_removed(*id, EvictReason::Missing);
                false
            }
            Some(entry) if now_ms - entry.updated_at > timeout_ms => {
                sink.marker_removed(*id, EvictReason::Stale);
                false
            }
            Some(_) => true,
        });

        for (id, entry) in locations {
            if now_ms - entry.updated_at > timeout_ms {
                continue;
            }
            let status = statuses.get(id);
            match self.markers.entry(*id) {
                Entry::Occupied(mut slot) => {
                    slot.insert(entry.updated_at);
                    sink.marker_moved(*id, entry, status);
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry.updated_at);
                    sink.marker_added(*id, entry, status);
                }
            }
        }
    }

    pub fn contains(&self, driver_id: i32) -> bool {
        self.markers.contains_key(&driver_id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
