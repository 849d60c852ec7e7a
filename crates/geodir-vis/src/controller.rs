//! Visibility controller.
//!
//! Owns the filter state and the visible-id list for one map view and
//! drives the marker sink from two triggers:
//!
//! - **Filter change** (query, category toggle, reset): refilter every
//!   record, then recompute placements.
//! - **Zoom change**: recompute placements only; the visible set is
//!   unchanged.
//!
//! Placement recompute groups the visible records by rounded coordinate,
//! spreads each group over jitter rings at the current zoom, shows every
//! visible marker at its placed coordinate and hides markers that dropped
//! out of the visible set.

use std::collections::{HashMap, HashSet};

use geodir_layout::{group_coincident, place_group, LatLon, Placement, Projection};
use geodir_search::{filter, Category, FilterState, RecordId, RecordStore, ToggleMode};

/// Receiver of marker updates (the map renderer).
pub trait MarkerSink {
    /// Draw or move a record's marker.
    fn show_marker(&mut self, id: RecordId, coord: LatLon);

    /// Remove a record's marker from the map.
    fn hide_marker(&mut self, id: RecordId);

    /// Called once after every placement pass.
    fn commit(&mut self) {}
}

/// Counters from one placement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutSummary {
    /// Markers shown
    pub visible: usize,
    /// Distinct coordinate keys
    pub groups: usize,
    /// Markers drawn away from their base coordinate
    pub displaced: usize,
    /// Markers removed since the previous pass
    pub hidden: usize,
}

/// Filter and placement state for one map view.
pub struct VisibilityController<P, S> {
    store: RecordStore,
    filter: FilterState,
    visible: Vec<RecordId>,
    placements: HashMap<RecordId, Placement>,
    shown: Vec<RecordId>,
    zoom: f64,
    projection: P,
    sink: S,
}

impl<P: Projection, S: MarkerSink> VisibilityController<P, S> {
    /// Create a controller with every category active and no query, and
    /// run the first filter pass.
    pub fn new(store: RecordStore, projection: P, sink: S, zoom: f64) -> Self {
        let filter = FilterState::new(store.categories().to_vec());
        let mut controller = Self {
            store,
            filter,
            visible: Vec::new(),
            placements: HashMap::new(),
            shown: Vec::new(),
            zoom,
            projection,
            sink,
        };
        controller.apply_filters();
        controller
    }

    /// The search text changed. Returns whether the visible set was recomputed.
    pub fn on_query_change(&mut self, raw: &str) -> bool {
        if !self.filter.set_query(raw) {
            return false;
        }
        self.apply_filters();
        true
    }

    /// A category was toggled. Returns whether the visible set was recomputed.
    ///
    /// A toggle that would leave no active category restores all of them.
    pub fn on_category_toggle(&mut self, category: &Category, mode: ToggleMode) -> bool {
        if !self.filter.all_categories().contains(category) {
            tracing::warn!("Ignoring toggle of unknown category {:?}", category.as_str());
            return false;
        }
        if !self.filter.toggle(category, mode) {
            return false;
        }
        self.apply_filters();
        true
    }

    /// Back to all categories and an empty query.
    pub fn reset_filters(&mut self) {
        self.filter.reset();
        self.apply_filters();
    }

    /// The map zoom changed.
    pub fn on_zoom_change(&mut self, zoom: f64) -> LayoutSummary {
        self.zoom = zoom;
        self.recompute_placements()
    }

    /// Recompute the visible set from scratch, then placements.
    pub fn apply_filters(&mut self) -> LayoutSummary {
        self.visible = filter(&self.store, &self.filter);
        tracing::debug!(
            "Filter pass: {} of {} records visible ({} tokens, {} categories active)",
            self.visible.len(),
            self.store.len(),
            self.filter.tokens().len(),
            self.filter.active_categories().len()
        );
        self.recompute_placements()
    }

    /// Regroup and re-place the current visible set at the current zoom.
    pub fn recompute_placements(&mut self) -> LayoutSummary {
        let store = &self.store;
        let groups = group_coincident(
            self.visible
                .iter()
                .filter_map(|&id| store.get(id).map(|record| (id, record.coord()))),
        );

        let mut placements = HashMap::with_capacity(self.visible.len());
        let mut order = Vec::with_capacity(self.visible.len());
        for group in &groups {
            let placed = place_group(&self.projection, group.base(), group.len(), self.zoom);
            for (&id, placement) in group.members().iter().zip(placed) {
                placements.insert(id, placement);
                order.push(id);
            }
        }

        let current: HashSet<RecordId> = order.iter().copied().collect();
        let mut hidden = 0;
        for &id in &self.shown {
            if !current.contains(&id) {
                self.sink.hide_marker(id);
                hidden += 1;
            }
        }
        for &id in &order {
            self.sink.show_marker(id, placements[&id].coord);
        }
        self.sink.commit();

        let summary = LayoutSummary {
            visible: order.len(),
            groups: groups.len(),
            displaced: placements.values().filter(|p| p.is_displaced()).count(),
            hidden,
        };
        tracing::debug!(
            "Placement pass at zoom {}: {} markers in {} groups, {} displaced, {} hidden",
            self.zoom,
            summary.visible,
            summary.groups,
            summary.displaced,
            summary.hidden
        );

        self.placements = placements;
        self.shown = order;
        summary
    }
}

impl<P, S> VisibilityController<P, S> {
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Visible record ids in store order.
    pub fn visible(&self) -> &[RecordId] {
        &self.visible
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current placement of a visible record.
    pub fn placement(&self, id: RecordId) -> Option<&Placement> {
        self.placements.get(&id)
    }

    /// Placements of all visible records, in store order.
    pub fn placements(&self) -> impl Iterator<Item = (RecordId, &Placement)> + '_ {
        self.visible
            .iter()
            .filter_map(|&id| self.placements.get(&id).map(|p| (id, p)))
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
