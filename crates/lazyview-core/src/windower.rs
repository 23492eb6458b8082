#![forbid(unsafe_code)]

//! Recompute tracking for a scrolling window.
//!
//! [`Windower`] holds the externally supplied scroll state and geometry and
//! refreshes its [`VisibleRange`] whenever one of them changes. Recomputation
//! is synchronous: the phase moves `Idle -> Recomputing -> Idle` inside a
//! single call, so callers only ever observe [`WindowerPhase::Idle`].
//!
//! The windower never sees the items themselves, only their count.

use crate::error::GeometryError;
use crate::window::{VisibleRange, WindowGeometry, clamp_scroll_offset};

/// Recompute state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowerPhase {
    /// Range is current.
    #[default]
    Idle,
    /// Range is being recomputed.
    Recomputing,
}

/// Scroll + geometry state with a cached visible range.
#[derive(Debug, Clone)]
pub struct Windower {
    geometry: WindowGeometry,
    scroll_offset: f64,
    item_count: usize,
    range: VisibleRange,
    phase: WindowerPhase,
    recomputes: u64,
}

impl Windower {
    /// Create a windower at scroll offset 0.
    #[must_use]
    pub fn new(geometry: WindowGeometry, item_count: usize) -> Self {
        let mut windower = Self {
            geometry,
            scroll_offset: 0.0,
            item_count,
            range: VisibleRange::EMPTY,
            phase: WindowerPhase::Idle,
            recomputes: 0,
        };
        windower.recompute();
        windower
    }

    /// Current geometry.
    #[must_use]
    pub fn geometry(&self) -> &WindowGeometry {
        &self.geometry
    }

    /// Current scroll offset.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Number of items being windowed.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Range from the last recompute.
    #[must_use]
    pub fn range(&self) -> &VisibleRange {
        &self.range
    }

    /// Current phase (always `Idle` between calls).
    #[must_use]
    pub fn phase(&self) -> WindowerPhase {
        self.phase
    }

    /// How many times the range has been recomputed.
    #[must_use]
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// Largest scroll offset that still fills the container.
    #[must_use]
    pub fn max_scroll_offset(&self) -> f64 {
        self.geometry.max_scroll_offset(self.item_count)
    }

    /// Index under the top edge, ignoring overscan.
    #[must_use]
    pub fn first_visible_index(&self) -> usize {
        self.geometry
            .first_visible_index(self.scroll_offset, self.item_count)
    }

    /// Whether the container shows the last item.
    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        self.scroll_offset >= self.max_scroll_offset()
    }

    /// Apply a raw scroll position (negative and NaN clamp to 0).
    ///
    /// Returns the new range if the offset changed.
    pub fn set_scroll_offset(&mut self, scroll_offset: f64) -> Option<VisibleRange> {
        let scroll_offset = clamp_scroll_offset(scroll_offset);
        if scroll_offset == self.scroll_offset {
            return None;
        }
        self.scroll_offset = scroll_offset;
        Some(self.recompute())
    }

    /// Scroll by a delta, clamped to `[0, max_scroll_offset]`.
    pub fn scroll_by(&mut self, delta: f64) -> Option<VisibleRange> {
        if !delta.is_finite() {
            return None;
        }
        let target = (self.scroll_offset + delta).clamp(0.0, self.max_scroll_offset());
        self.set_scroll_offset(target)
    }

    /// Scroll so item `idx` sits at the top edge, clamped to the content.
    pub fn scroll_to_index(&mut self, idx: usize) -> Option<VisibleRange> {
        let target = self
            .geometry
            .offset_of(idx)
            .min(self.max_scroll_offset());
        self.set_scroll_offset(target)
    }

    /// Scroll to the first item.
    pub fn scroll_to_top(&mut self) -> Option<VisibleRange> {
        self.set_scroll_offset(0.0)
    }

    /// Scroll so the last item is at the bottom edge.
    pub fn scroll_to_bottom(&mut self) -> Option<VisibleRange> {
        self.set_scroll_offset(self.max_scroll_offset())
    }

    /// Change the item count (collection replaced or grown).
    pub fn set_item_count(&mut self, item_count: usize) -> Option<VisibleRange> {
        if item_count == self.item_count {
            return None;
        }
        self.item_count = item_count;
        Some(self.recompute())
    }

    /// Replace the whole geometry.
    pub fn set_geometry(&mut self, geometry: WindowGeometry) -> Option<VisibleRange> {
        if geometry == self.geometry {
            return None;
        }
        self.geometry = geometry;
        Some(self.recompute())
    }

    /// Change the item height.
    pub fn set_item_height(
        &mut self,
        item_height: f64,
    ) -> Result<Option<VisibleRange>, GeometryError> {
        let geometry = self.geometry.with_item_height(item_height)?;
        Ok(self.set_geometry(geometry))
    }

    /// Change the container height (e.g. on resize).
    pub fn set_container_height(
        &mut self,
        container_height: f64,
    ) -> Result<Option<VisibleRange>, GeometryError> {
        let geometry = self.geometry.with_container_height(container_height)?;
        Ok(self.set_geometry(geometry))
    }

    /// Change the overscan count.
    pub fn set_overscan(&mut self, overscan: usize) -> Option<VisibleRange> {
        let geometry = self.geometry.with_overscan(overscan);
        self.set_geometry(geometry)
    }

    fn recompute(&mut self) -> VisibleRange {
        self.phase = WindowerPhase::Recomputing;
        let range = self
            .geometry
            .visible_range(self.scroll_offset, self.item_count);
        self.range = range;
        self.recomputes += 1;
        self.phase = WindowerPhase::Idle;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            scroll = self.scroll_offset,
            items = self.item_count,
            start = range.start,
            end = range.end,
            "window recomputed"
        );

        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windower(count: usize) -> Windower {
        Windower::new(WindowGeometry::new(100.0, 400.0, 5).unwrap(), count)
    }

    #[test]
    fn new_computes_initial_range() {
        let w = windower(1000);
        assert_eq!(w.range().indices(), 0..9);
        assert_eq!(w.recompute_count(), 1);
        assert_eq!(w.phase(), WindowerPhase::Idle);
    }

    #[test]
    fn scroll_change_recomputes() {
        let mut w = windower(1000);
        let range = w.set_scroll_offset(5000.0).unwrap();
        assert_eq!(range.indices(), 45..59);
        assert_eq!(w.range(), &range);
        assert_eq!(w.phase(), WindowerPhase::Idle);
    }

    #[test]
    fn unchanged_inputs_do_not_recompute() {
        let mut w = windower(1000);
        w.set_scroll_offset(300.0);
        let before = w.recompute_count();
        assert!(w.set_scroll_offset(300.0).is_none());
        assert!(w.set_item_count(1000).is_none());
        assert!(w.set_overscan(5).is_none());
        assert!(w.set_container_height(400.0).unwrap().is_none());
        assert_eq!(w.recompute_count(), before);
    }

    #[test]
    fn geometry_changes_recompute() {
        let mut w = windower(1000);
        let range = w.set_overscan(0).unwrap();
        assert_eq!(range.indices(), 0..4);

        let range = w.set_container_height(800.0).unwrap().unwrap();
        assert_eq!(range.indices(), 0..8);

        let range = w.set_item_height(200.0).unwrap().unwrap();
        assert_eq!(range.indices(), 0..4);
        assert_eq!(range.total_height, 200_000.0);

        let range = w.set_item_count(2).unwrap();
        assert_eq!(range.indices(), 0..2);
    }

    #[test]
    fn invalid_geometry_leaves_state_untouched() {
        let mut w = windower(1000);
        let before = *w.geometry();
        assert!(w.set_item_height(0.0).is_err());
        assert!(w.set_container_height(f64::NAN).is_err());
        assert_eq!(*w.geometry(), before);
    }

    #[test]
    fn negative_scroll_clamps() {
        let mut w = windower(1000);
        w.set_scroll_offset(500.0);
        let range = w.set_scroll_offset(-20.0).unwrap();
        assert_eq!(w.scroll_offset(), 0.0);
        assert_eq!(range.start, 0);
    }

    #[test]
    fn scroll_by_clamps_to_content() {
        let mut w = windower(10);
        w.scroll_by(10_000.0);
        assert_eq!(w.scroll_offset(), 600.0);
        assert!(w.is_at_bottom());
        w.scroll_by(-10_000.0);
        assert_eq!(w.scroll_offset(), 0.0);
        assert!(w.scroll_by(f64::NAN).is_none());
    }

    #[test]
    fn scroll_to_index_and_edges() {
        let mut w = windower(1000);
        w.scroll_to_index(50);
        assert_eq!(w.scroll_offset(), 5000.0);
        assert_eq!(w.first_visible_index(), 50);

        w.scroll_to_index(999);
        assert_eq!(w.scroll_offset(), w.max_scroll_offset());

        w.scroll_to_top();
        assert_eq!(w.scroll_offset(), 0.0);
        w.scroll_to_bottom();
        assert!(w.is_at_bottom());
        assert_eq!(w.range().end, 1000);
    }

    #[test]
    fn shrinking_list_keeps_range_in_bounds() {
        let mut w = windower(1000);
        w.set_scroll_offset(50_000.0);
        let range = w.set_item_count(20).unwrap();
        assert!(range.start <= range.end);
        assert_eq!(range.end, 20);
    }
}
