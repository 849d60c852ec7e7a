//! Geodir Marker Layout
//!
//! Coincident-point decluttering for map markers.
//!
//! # Grouping
//!
//! Visible records are partitioned by a coordinate key built by rounding
//! latitude and longitude independently to 5 decimal places (about one
//! meter). Points inside the same key are drawn on top of each other unless
//! they are spread out.
//!
//! # Ring Jitter
//!
//! Members of a group are fanned out around the group's base coordinate in
//! concentric rings:
//!
//! - Ring 0: 6 slots
//! - Ring 1: 12 slots
//! - Ring k: 6(k+1) slots
//!
//! Offsets are computed in screen space and mapped back to geographic
//! coordinates through a [`Projection`], so the visual separation stays
//! constant in pixels at every zoom level.

mod coord;
mod group;
mod jitter;
mod projection;
mod ring;

pub use coord::{CoordError, CoordinateKey, LatLon, ScreenPoint, COORD_KEY_SCALE};
pub use group::{group_coincident, CoincidenceGroup, CoincidenceGroups};
pub use jitter::{base_amplitude, place_group, ring_offsets, Placement, MAX_JITTER_PX};
pub use projection::{Projection, WebMercator, MAX_MERCATOR_LAT, TILE_SIZE};
pub use ring::{ring_capacity, slots_through_ring, RingSlot, RingSlots, BASE_RING_CAPACITY};
