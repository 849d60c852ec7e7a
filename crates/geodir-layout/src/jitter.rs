//! Ring jitter placement.
//!
//! Spreads the members of a coincidence group over concentric rings so that
//! markers at identical coordinates stay individually clickable. Offsets are
//! computed in screen pixels and converted back to geographic coordinates
//! with the map's projection at the current zoom.

use crate::coord::{LatLon, ScreenPoint};
use crate::projection::Projection;
use crate::ring::{RingSlot, RingSlots};

/// Upper bound of the base jitter amplitude, in pixels.
pub const MAX_JITTER_PX: f64 = 18.0;

/// Base pixel amplitude for a zoom level.
///
/// `clamp(0, 18, (14 + zoom) * 2 + 4)`. A non-finite zoom yields 0.
#[inline]
pub fn base_amplitude(zoom: f64) -> f64 {
    ((14.0 + zoom) * 2.0 + 4.0).max(0.0).min(MAX_JITTER_PX)
}

/// Where one group member is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    /// Ring slot, `None` when the member is not displaced
    pub slot: Option<RingSlot>,
    /// Screen-space offset from the base coordinate
    pub offset: ScreenPoint,
    /// Resulting geographic coordinate
    pub coord: LatLon,
}

impl Placement {
    /// A placement exactly at `coord`.
    pub fn fixed(coord: LatLon) -> Self {
        Self {
            slot: None,
            offset: ScreenPoint::ZERO,
            coord,
        }
    }

    /// Whether the marker is drawn away from its base coordinate.
    pub fn is_displaced(&self) -> bool {
        self.slot.is_some()
    }
}

/// Pixel offsets for a group of `group_size` members, index-aligned.
///
/// Member `i` takes [`RingSlot::of`]`(i)` at radius
/// `base_amplitude(zoom) * (ring + 1)`. Singletons and a zero amplitude give
/// zero offsets.
pub fn ring_offsets(group_size: usize, zoom: f64) -> Vec<ScreenPoint> {
    slot_offsets(group_size, zoom)
        .map(|(_, offset)| offset)
        .collect()
}

/// Place every member of a group around `base`, index-aligned.
///
/// Each pixel offset is applied to the projected base point and the result
/// unprojected at the same zoom. Undisplaced members keep `base` exactly.
pub fn place_group<P>(projection: &P, base: LatLon, group_size: usize, zoom: f64) -> Vec<Placement>
where
    P: Projection + ?Sized,
{
    if !spreads(group_size, zoom) {
        return vec![Placement::fixed(base); group_size];
    }

    let origin = projection.project(base, zoom);
    slot_offsets(group_size, zoom)
        .map(|(slot, offset)| Placement {
            slot,
            offset,
            coord: projection.unproject(origin + offset, zoom),
        })
        .collect()
}

fn spreads(group_size: usize, zoom: f64) -> bool {
    group_size > 1 && base_amplitude(zoom) > 0.0
}

fn slot_offsets(
    group_size: usize,
    zoom: f64,
) -> impl Iterator<Item = (Option<RingSlot>, ScreenPoint)> {
    let spread = spreads(group_size, zoom);
    let base_px = base_amplitude(zoom);

    RingSlots::take_slots(group_size).map(move |slot| {
        if spread {
            let radius = base_px * slot.radius_factor();
            (Some(slot), ScreenPoint::polar(radius, slot.angle()))
        } else {
            (None, ScreenPoint::ZERO)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::WebMercator;

    #[test]
    fn amplitude_is_clamped() {
        assert_eq!(base_amplitude(6.0), 18.0);
        assert_eq!(base_amplitude(-5.0), 18.0);
        assert_eq!(base_amplitude(-8.0), 16.0);
        assert_eq!(base_amplitude(-10.0), 12.0);
        assert_eq!(base_amplitude(-16.0), 0.0);
        assert_eq!(base_amplitude(-40.0), 0.0);
        assert_eq!(base_amplitude(f64::NAN), 0.0);
    }

    #[test]
    fn singleton_is_not_displaced() {
        let projection = WebMercator::default();
        let base = LatLon::new(46.71109, 1.7191036);

        for zoom in [0.0, 6.0, 18.0] {
            let placed = place_group(&projection, base, 1, zoom);
            assert_eq!(placed, vec![Placement::fixed(base)]);
            assert_eq!(ring_offsets(1, zoom), vec![ScreenPoint::ZERO]);
        }
    }

    #[test]
    fn zero_amplitude_keeps_group_in_place() {
        let projection = WebMercator::default();
        let base = LatLon::new(45.0, 5.0);
        let placed = place_group(&projection, base, 4, -20.0);

        assert_eq!(placed.len(), 4);
        assert!(placed.iter().all(|p| p.coord == base && !p.is_displaced()));
    }

    #[test]
    fn empty_group() {
        let projection = WebMercator::default();
        assert!(place_group(&projection, LatLon::default(), 0, 6.0).is_empty());
        assert!(ring_offsets(0, 6.0).is_empty());
    }

    #[test]
    fn first_ring_radius_and_angles() {
        let offsets = ring_offsets(6, 8.0);
        for (i, offset) in offsets.iter().enumerate() {
            assert!((offset.length() - 18.0).abs() < 1e-9);
            let expected = std::f64::consts::TAU * i as f64 / 6.0;
            let angle = offset.y.atan2(offset.x).rem_euclid(std::f64::consts::TAU);
            assert!((angle - expected).abs() < 1e-9, "member {}", i);
        }
    }

    #[test]
    fn nineteenth_member_starts_ring_two_at_angle_zero() {
        let zoom = 10.0;
        let offsets = ring_offsets(19, zoom);
        let last = offsets[18];
        assert!((last.x - 3.0 * base_amplitude(zoom)).abs() < 1e-9);
        assert!(last.y.abs() < 1e-9);

        let projection = WebMercator::default();
        let placed = place_group(&projection, LatLon::new(48.85661, 2.35222), 19, zoom);
        assert_eq!(
            placed[18].slot,
            Some(RingSlot {
                ring: 2,
                position: 0,
                capacity: 18
            })
        );
    }

    #[test]
    fn placement_matches_projected_offset() {
        let projection = WebMercator::default();
        let base = LatLon::new(43.6047, 1.4442);
        let zoom = 13.0;
        let placed = place_group(&projection, base, 30, zoom);

        let origin = projection.project(base, zoom);
        for placement in &placed {
            let drawn = projection.project(placement.coord, zoom);
            let expected = origin + placement.offset;
            assert!(drawn.distance(&expected) < 1e-6);
        }
    }

    #[test]
    fn geographic_spread_shrinks_when_zooming_in() {
        let projection = WebMercator::default();
        let base = LatLon::new(50.0, 4.0);
        let near = place_group(&projection, base, 2, 14.0);
        let far = place_group(&projection, base, 2, 7.0);

        let spread = |p: &[Placement]| (p[1].coord.lon - p[0].coord.lon).abs();
        assert!(spread(&near) < spread(&far));
    }

    #[test]
    fn placement_is_deterministic() {
        let projection = WebMercator::default();
        let base = LatLon::new(47.2184, -1.5536);
        assert_eq!(
            place_group(&projection, base, 50, 9.0),
            place_group(&projection, base, 50, 9.0)
        );
    }
}
