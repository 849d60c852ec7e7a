//! Concentric ring slots for coincident markers.
//!
//! Members of a coincidence group are assigned slots in rings around the
//! group's base coordinate. Unlike a hex spiral there is no center slot:
//! the first member already sits on ring 0.
//!
//! - Ring 0: indices 0-5 (6 slots)
//! - Ring 1: indices 6-17 (12 slots)
//! - Ring 2: indices 18-35 (18 slots)
//! - Ring k: 6(k+1) slots, starting at index 3k(k+1)

use std::f64::consts::TAU;

/// Slots in the innermost ring; each further ring adds this many.
pub const BASE_RING_CAPACITY: usize = 6;

/// Number of slots in ring `ring`.
#[inline]
pub const fn ring_capacity(ring: usize) -> usize {
    BASE_RING_CAPACITY * (ring + 1)
}

/// Total slots in rings `0..=ring`.
///
/// Formula: 3(k+1)(k+2)
#[inline]
pub const fn slots_through_ring(ring: usize) -> usize {
    3 * (ring + 1) * (ring + 2)
}

/// The slot a group member occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingSlot {
    /// Ring number, 0 innermost
    pub ring: usize,
    /// Position within the ring, 0 at angle zero
    pub position: usize,
    /// Slots in this ring
    pub capacity: usize,
}

impl RingSlot {
    /// Slot for the member at `index` within its group.
    ///
    /// Walks the running total of ring capacities until the ring holding
    /// `index` is found.
    pub fn of(index: usize) -> Self {
        let mut ring = 0;
        let mut used = 0;
        let mut capacity = ring_capacity(0);

        while index >= used + capacity {
            used += capacity;
            ring += 1;
            capacity = ring_capacity(ring);
        }

        Self {
            ring,
            position: index - used,
            capacity,
        }
    }

    /// Member index this slot corresponds to.
    pub fn index(&self) -> usize {
        let before = if self.ring == 0 {
            0
        } else {
            slots_through_ring(self.ring - 1)
        };
        before + self.position
    }

    /// Angle of this slot in radians, evenly spaced around the ring.
    #[inline]
    pub fn angle(&self) -> f64 {
        TAU * self.position as f64 / self.capacity as f64
    }

    /// Radius multiplier: ring k sits at k+1 times the base amplitude.
    #[inline]
    pub fn radius_factor(&self) -> f64 {
        (self.ring + 1) as f64
    }

    /// The slot after this one.
    fn next(&self) -> Self {
        if self.position + 1 < self.capacity {
            Self {
                position: self.position + 1,
                ..*self
            }
        } else {
            let ring = self.ring + 1;
            Self {
                ring,
                position: 0,
                capacity: ring_capacity(ring),
            }
        }
    }
}

/// Iterator over ring slots in member order.
pub struct RingSlots {
    current: RingSlot,
    remaining: usize,
}

impl RingSlots {
    /// Slots for a group of `count` members.
    pub fn take_slots(count: usize) -> Self {
        Self {
            current: RingSlot::of(0),
            remaining: count,
        }
    }
}

impl Iterator for RingSlots {
    type Item = RingSlot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.current;
        self.current = slot.next();
        self.remaining -= 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RingSlots {}
