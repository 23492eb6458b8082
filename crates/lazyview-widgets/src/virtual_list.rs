#![forbid(unsafe_code)]

//! Virtualized list rendering through a caller-supplied callback.
//!
//! [`VirtualList`] borrows the caller's items and materializes only the rows
//! in the current [`VisibleRange`]. The render callback is invoked once per
//! materialized index with the item and its absolute index; everything
//! outside the range is never touched.
//!
//! # Example
//!
//! ```
//! use lazyview_core::WindowGeometry;
//! use lazyview_widgets::virtual_list::{VirtualList, VirtualListState};
//!
//! let tracks: Vec<String> = (0..1000).map(|i| format!("Track {i}")).collect();
//! let geometry = WindowGeometry::new(100.0, 400.0, 5).unwrap();
//! let list = VirtualList::new(&tracks, geometry);
//!
//! let mut state = VirtualListState::new();
//! state.set_scroll_offset(5000.0);
//! let window = list.render(&mut state, |title, idx| format!("{idx}: {title}"));
//!
//! assert_eq!(window.rows.first().map(|r| r.index), Some(45));
//! assert_eq!(window.rows.len(), 14);
//! ```

use std::hash::Hash;

use lazyview_core::{GeometryError, VisibleRange, WindowDefaults, WindowGeometry};

/// An item with an identity that is stable across scrolling.
pub trait ListItem {
    /// Identifier type.
    type Id: Clone + Eq + Hash + std::fmt::Debug;

    /// Stable identifier for this item.
    fn id(&self) -> Self::Id;
}

/// One materialized row.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedRow<R> {
    /// Absolute index in the collection.
    pub index: usize,
    /// Top edge relative to the start of the content.
    pub top: f64,
    /// Row height.
    pub height: f64,
    /// Callback output for this row.
    pub output: R,
}

/// The materialized slice of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedWindow<R> {
    /// Range the rows were produced from.
    pub range: VisibleRange,
    /// Rows in index order.
    pub rows: Vec<PositionedRow<R>>,
}

impl<R> RenderedWindow<R> {
    /// Height of the scroll spacer.
    #[must_use]
    pub fn total_height(&self) -> f64 {
        self.range.total_height
    }

    /// Translation applied to the first row.
    #[must_use]
    pub fn offset_y(&self) -> f64 {
        self.range.offset_y
    }
}

/// State for a [`VirtualList`]: scroll position, selection and follow mode.
#[derive(Debug, Clone, Default)]
pub struct VirtualListState {
    /// Currently selected index.
    pub selected: Option<usize>,
    scroll_offset: f64,
    follow_mode: bool,
}

impl VirtualListState {
    /// Create a new state at the top of the list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with follow mode enabled.
    #[must_use]
    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow_mode = follow;
        self
    }

    /// Current scroll offset.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Set the scroll offset from a scroll event (negative and NaN clamp to 0).
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = lazyview_core::clamp_scroll_offset(offset);
    }

    /// Whether follow mode is enabled.
    #[must_use]
    pub fn follow_mode(&self) -> bool {
        self.follow_mode
    }

    /// Scroll by delta (positive = down), clamped to the content.
    pub fn scroll(&mut self, delta: f64, geometry: &WindowGeometry, total_items: usize) {
        if total_items == 0 || !delta.is_finite() {
            return;
        }
        let max = geometry.max_scroll_offset(total_items);
        self.scroll_offset = (self.scroll_offset + delta).clamp(0.0, max);
        if delta != 0.0 {
            self.follow_mode = false;
        }
    }

    /// Scroll so `idx` is at the top edge.
    pub fn scroll_to_index(&mut self, idx: usize, geometry: &WindowGeometry, total_items: usize) {
        let max = geometry.max_scroll_offset(total_items);
        self.scroll_offset = geometry.offset_of(idx).min(max);
        self.follow_mode = false;
    }

    /// Scroll to top.
    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0.0;
        self.follow_mode = false;
    }

    /// Scroll to bottom.
    pub fn scroll_to_bottom(&mut self, geometry: &WindowGeometry, total_items: usize) {
        self.scroll_offset = geometry.max_scroll_offset(total_items);
    }

    /// Page up (scroll by one container height).
    pub fn page_up(&mut self, geometry: &WindowGeometry, total_items: usize) {
        self.scroll(-geometry.container_height(), geometry, total_items);
    }

    /// Page down (scroll by one container height).
    pub fn page_down(&mut self, geometry: &WindowGeometry, total_items: usize) {
        self.scroll(geometry.container_height(), geometry, total_items);
    }

    /// Check if at bottom.
    #[must_use]
    pub fn is_at_bottom(&self, geometry: &WindowGeometry, total_items: usize) -> bool {
        self.scroll_offset >= geometry.max_scroll_offset(total_items)
    }

    /// Enable/disable follow mode.
    pub fn set_follow(&mut self, follow: bool, geometry: &WindowGeometry, total_items: usize) {
        self.follow_mode = follow;
        if follow {
            self.scroll_to_bottom(geometry, total_items);
        }
    }

    /// Select an item.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    /// Select previous item.
    pub fn select_previous(&mut self, total_items: usize) {
        if total_items == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i > 0 => i - 1,
            Some(_) => 0,
            None => 0,
        });
    }

    /// Select next item.
    pub fn select_next(&mut self, total_items: usize) {
        if total_items == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i < total_items - 1 => i + 1,
            Some(i) => i,
            None => 0,
        });
    }

    /// Clamp selection to the list and scroll the minimum needed to show it fully.
    pub fn ensure_selection_visible(&mut self, geometry: &WindowGeometry, total_items: usize) {
        let Some(selected) = self.selected else {
            return;
        };
        if total_items == 0 {
            self.selected = None;
            return;
        }
        let selected = selected.min(total_items - 1);
        self.selected = Some(selected);

        let top = geometry.offset_of(selected);
        let bottom = top + geometry.item_height();
        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset + geometry.container_height() {
            self.scroll_offset = (bottom - geometry.container_height()).max(0.0);
        }
    }

    /// Snapshot the user-facing state.
    #[must_use]
    pub fn save_state(&self) -> VirtualListPersistState {
        VirtualListPersistState {
            selected: self.selected,
            scroll_offset: self.scroll_offset,
            follow_mode: self.follow_mode,
        }
    }

    /// Restore a snapshot.
    pub fn restore_state(&mut self, state: VirtualListPersistState) {
        self.selected = state.selected;
        self.scroll_offset = lazyview_core::clamp_scroll_offset(state.scroll_offset);
        self.follow_mode = state.follow_mode;
    }
}

/// Persistable state for a [`VirtualListState`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct VirtualListPersistState {
    /// Selected item index.
    pub selected: Option<usize>,
    /// Scroll offset in pixels.
    pub scroll_offset: f64,
    /// Whether follow mode is enabled.
    pub follow_mode: bool,
}

/// A virtualized list over borrowed items.
#[derive(Debug)]
pub struct VirtualList<'a, T> {
    items: &'a [T],
    geometry: WindowGeometry,
}

impl<'a, T> VirtualList<'a, T> {
    /// Create a list with explicit geometry.
    #[must_use]
    pub fn new(items: &'a [T], geometry: WindowGeometry) -> Self {
        Self { items, geometry }
    }

    /// Create a list from default geometry.
    pub fn with_defaults(items: &'a [T], defaults: &WindowDefaults) -> Result<Self, GeometryError> {
        Ok(Self::new(items, defaults.geometry()?))
    }

    /// Set the overscan.
    #[must_use]
    pub fn overscan(mut self, overscan: usize) -> Self {
        self.geometry = self.geometry.with_overscan(overscan);
        self
    }

    /// Geometry in use.
    #[must_use]
    pub fn geometry(&self) -> &WindowGeometry {
        &self.geometry
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Materialized range for `state`.
    #[must_use]
    pub fn range(&self, state: &VirtualListState) -> VisibleRange {
        self.geometry
            .visible_range(state.scroll_offset, self.items.len())
    }

    /// Materialized items with their absolute indices.
    pub fn visible_items(
        &self,
        state: &VirtualListState,
    ) -> impl Iterator<Item = (usize, &'a T)> + use<'a, T> {
        let range = self.range(state);
        let items = self.items;
        items[range.indices()]
            .iter()
            .enumerate()
            .map(move |(offset, item)| (range.start + offset, item))
    }

    /// Render the materialized rows through `render_item`.
    ///
    /// Keeps the selection (if any) fully visible and follows the tail in
    /// follow mode before computing the range.
    pub fn render<R, F>(
        &self,
        state: &mut VirtualListState,
        mut render_item: F,
    ) -> RenderedWindow<R>
    where
        F: FnMut(&'a T, usize) -> R,
    {
        let total_items = self.items.len();
        if state.follow_mode {
            state.scroll_to_bottom(&self.geometry, total_items);
        }
        state.ensure_selection_visible(&self.geometry, total_items);

        let range = self.range(state);

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "virtual_list_render",
            items = total_items,
            start = range.start,
            end = range.end,
        )
        .entered();

        let items = self.items;
        let height = self.geometry.item_height();
        let rows = range
            .rows(height)
            .map(|(index, top)| PositionedRow {
                index,
                top,
                height,
                output: render_item(&items[index], index),
            })
            .collect();

        RenderedWindow { range, rows }
    }
}

impl ListItem for String {
    type Id = String;

    fn id(&self) -> String {
        self.clone()
    }
}

impl ListItem for u64 {
    type Id = u64;

    fn id(&self) -> u64 {
        *self
    }
}
