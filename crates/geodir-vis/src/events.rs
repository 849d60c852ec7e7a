//! Marker events and the in-memory marker board.

use std::collections::BTreeMap;

use geodir_layout::LatLon;
use geodir_search::RecordId;
use serde::{Deserialize, Serialize};

use crate::controller::MarkerSink;

/// State of a marker on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerState {
    pub record: RecordId,
    pub coord: LatLon,
}

/// Changes to the set of drawn markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarkerEvent {
    /// A marker was drawn or moved
    MarkerShown {
        record: RecordId,
        coord: LatLon,
        frame: u64,
    },

    /// A marker was removed
    MarkerHidden { record: RecordId, frame: u64 },
}

impl MarkerEvent {
    /// Get the frame number for this event.
    pub fn frame(&self) -> u64 {
        match self {
            MarkerEvent::MarkerShown { frame, .. } => *frame,
            MarkerEvent::MarkerHidden { frame, .. } => *frame,
        }
    }

    pub fn record(&self) -> RecordId {
        match self {
            MarkerEvent::MarkerShown { record, .. } => *record,
            MarkerEvent::MarkerHidden { record, .. } => *record,
        }
    }
}

/// The drawn markers at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub frame: u64,
    pub markers: Vec<MarkerState>,
    pub marker_count: usize,
}

impl MapSnapshot {
    /// Rebuild marker state by replaying events in order.
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a MarkerEvent>,
    {
        let mut markers = BTreeMap::new();
        let mut frame = 0;

        for event in events {
            frame = event.frame();
            match event {
                MarkerEvent::MarkerShown { record, coord, .. } => {
                    markers.insert(*record, *coord);
                }
                MarkerEvent::MarkerHidden { record, .. } => {
                    markers.remove(record);
                }
            }
        }

        Self::from_markers(frame, &markers)
    }

    fn from_markers(frame: u64, markers: &BTreeMap<RecordId, LatLon>) -> Self {
        let markers: Vec<_> = markers
            .iter()
            .map(|(&record, &coord)| MarkerState { record, coord })
            .collect();
        Self {
            frame,
            marker_count: markers.len(),
            markers,
        }
    }
}

/// Marker sink that keeps the drawn markers in memory.
///
/// Each committed placement pass is one frame. The events of the most
/// recent frame are kept for streaming to clients.
#[derive(Debug, Default)]
pub struct MarkerBoard {
    markers: BTreeMap<RecordId, LatLon>,
    pending: Vec<MarkerEvent>,
    last_frame: Vec<MarkerEvent>,
    frame: u64,
}

impl MarkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Drawn position of a record's marker.
    pub fn marker(&self, id: RecordId) -> Option<LatLon> {
        self.markers.get(&id).copied()
    }

    /// Events of the most recently committed frame.
    pub fn last_frame_events(&self) -> &[MarkerEvent] {
        &self.last_frame
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot::from_markers(self.frame, &self.markers)
    }
}

impl MarkerSink for MarkerBoard {
    fn show_marker(&mut self, id: RecordId, coord: LatLon) {
        self.markers.insert(id, coord);
        self.pending.push(MarkerEvent::MarkerShown {
            record: id,
            coord,
            frame: self.frame + 1,
        });
    }

    fn hide_marker(&mut self, id: RecordId) {
        if self.markers.remove(&id).is_some() {
            self.pending.push(MarkerEvent::MarkerHidden {
                record: id,
                frame: self.frame + 1,
            });
        }
    }

    fn commit(&mut self) {
        self.frame += 1;
        self.last_frame = std::mem::take(&mut self.pending);
    }
}
