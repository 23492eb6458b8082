#![forbid(unsafe_code)]

//! Fixed-height viewport windowing.
//!
//! Maps a scroll offset and container geometry onto the contiguous index
//! range that must be materialized, padded by an overscan margin so fast
//! scrolling does not expose unrendered rows.
//!
//! # Invariants
//!
//! 1. `0 <= start <= end <= item_count` for every input, including scroll
//!    offsets past the end of the content.
//! 2. **Soundness**: every index whose span `[i*h, (i+1)*h)` overlaps
//!    `[scroll, scroll + container)` lies in `start..end`.
//! 3. **Bounded**: `end - start <= ceil(container / h) + 2*overscan + 1`,
//!    independent of `item_count`.
//! 4. `total_height = item_count * h` and `offset_y = start * h`.
//! 5. Pure: the same inputs always produce the same range.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `item_height <= 0` or non-finite | [`GeometryError::NonPositiveItemHeight`] |
//! | `container_height < 0` or non-finite | [`GeometryError::InvalidContainerHeight`] |
//! | Negative or NaN scroll offset | Clamped to 0 |
//! | Scroll past content end | `start` clamped to `end` |
//! | `item_count == 0` | Empty range, zero total height |

use std::ops::Range;

use crate::error::GeometryError;

/// Validated geometry for a uniformly sized list.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowGeometry {
    item_height: f64,
    container_height: f64,
    overscan: usize,
}

impl WindowGeometry {
    /// Build a geometry, rejecting heights that cannot be windowed.
    pub fn new(
        item_height: f64,
        container_height: f64,
        overscan: usize,
    ) -> Result<Self, GeometryError> {
        check_item_height(item_height)?;
        check_container_height(container_height)?;
        Ok(Self {
            item_height,
            container_height,
            overscan,
        })
    }

    /// Uniform height of every item.
    #[must_use]
    pub fn item_height(&self) -> f64 {
        self.item_height
    }

    /// Height of the scroll container.
    #[must_use]
    pub fn container_height(&self) -> f64 {
        self.container_height
    }

    /// Extra items materialized above and below the visible rows.
    #[must_use]
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Replace the item height.
    pub fn with_item_height(mut self, item_height: f64) -> Result<Self, GeometryError> {
        check_item_height(item_height)?;
        self.item_height = item_height;
        Ok(self)
    }

    /// Replace the container height.
    pub fn with_container_height(mut self, container_height: f64) -> Result<Self, GeometryError> {
        check_container_height(container_height)?;
        self.container_height = container_height;
        Ok(self)
    }

    /// Replace the overscan count.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Total scrollable height for `item_count` items.
    #[must_use]
    pub fn total_height(&self, item_count: usize) -> f64 {
        item_count as f64 * self.item_height
    }

    /// Largest scroll offset that still fills the container.
    #[must_use]
    pub fn max_scroll_offset(&self, item_count: usize) -> f64 {
        (self.total_height(item_count) - self.container_height).max(0.0)
    }

    /// Scroll offset that puts item `idx` at the top edge.
    #[must_use]
    pub fn offset_of(&self, idx: usize) -> f64 {
        idx as f64 * self.item_height
    }

    /// Index of the item under the top edge, ignoring overscan.
    ///
    /// Returns 0 for an empty list.
    #[must_use]
    pub fn first_visible_index(&self, scroll_offset: f64, item_count: usize) -> usize {
        if item_count == 0 {
            return 0;
        }
        let scroll = clamp_scroll_offset(scroll_offset);
        self.first_overlapping(scroll).min(item_count - 1)
    }

    // The quotient can round across a row boundary, so both edges are
    // nudged until they agree with the row edges as computed in f64.
    fn first_overlapping(&self, scroll: f64) -> usize {
        let h = self.item_height;
        let mut first = to_index((scroll / h).floor());
        while first > 0 && (first - 1) as f64 * h + h > scroll {
            first -= 1;
        }
        first
    }

    fn past_last_overlapping(&self, bottom: f64) -> usize {
        let h = self.item_height;
        let mut past_last = to_index((bottom / h).ceil());
        while past_last < usize::MAX && (past_last as f64) * h < bottom {
            past_last += 1;
        }
        past_last
    }

    /// Compute the materialized range for a scroll position.
    #[must_use]
    pub fn visible_range(&self, scroll_offset: f64, item_count: usize) -> VisibleRange {
        let scroll = clamp_scroll_offset(scroll_offset);
        let first = self.first_overlapping(scroll);
        let past_last = self.past_last_overlapping(scroll + self.container_height);

        let end = past_last.saturating_add(self.overscan).min(item_count);
        // Past the content end `first` can exceed `end`; keep the slice in bounds.
        let start = first.saturating_sub(self.overscan).min(end);

        VisibleRange {
            start,
            end,
            total_height: self.total_height(item_count),
            offset_y: self.offset_of(start),
        }
    }
}

/// The index window to materialize plus its positioning offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    /// First materialized index (inclusive).
    pub start: usize,
    /// Last materialized index (exclusive).
    pub end: usize,
    /// Height of the full content, for sizing the scroll spacer.
    pub total_height: f64,
    /// Translation applied to the first materialized row.
    pub offset_y: f64,
}

impl VisibleRange {
    /// An empty window over an empty list.
    pub const EMPTY: Self = Self {
        start: 0,
        end: 0,
        total_height: 0.0,
        offset_y: 0.0,
    };

    /// Materialized indices as a range.
    #[must_use]
    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of materialized items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether nothing is materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `idx` is materialized.
    #[must_use]
    pub fn contains(&self, idx: usize) -> bool {
        self.indices().contains(&idx)
    }

    /// `(absolute_index, top_offset)` for each materialized row.
    pub fn rows(&self, item_height: f64) -> impl Iterator<Item = (usize, f64)> + use<> {
        self.indices().map(move |idx| (idx, idx as f64 * item_height))
    }
}

/// Compute the materialized range from raw parameters.
///
/// Convenience over [`WindowGeometry::visible_range`] for one-shot callers.
///
/// ```
/// use lazyview_core::window::compute_visible_range;
///
/// let range = compute_visible_range(5000.0, 100.0, 400.0, 1000, 5).unwrap();
/// assert_eq!(range.indices(), 45..59);
/// assert_eq!(range.offset_y, 4500.0);
/// ```
pub fn compute_visible_range(
    scroll_offset: f64,
    item_height: f64,
    container_height: f64,
    item_count: usize,
    overscan: usize,
) -> Result<VisibleRange, GeometryError> {
    let geometry = WindowGeometry::new(item_height, container_height, overscan)?;
    Ok(geometry.visible_range(scroll_offset, item_count))
}

/// Map a raw scroll position into the accepted domain (negative and NaN become 0).
#[inline]
#[must_use]
pub fn clamp_scroll_offset(scroll_offset: f64) -> f64 {
    if scroll_offset.is_nan() || scroll_offset < 0.0 {
        0.0
    } else {
        scroll_offset
    }
}

// Float-to-int `as` saturates: +inf maps to usize::MAX, negatives and NaN to 0.
#[inline]
fn to_index(value: f64) -> usize {
    value as usize
}

fn check_item_height(item_height: f64) -> Result<(), GeometryError> {
    if item_height.is_finite() && item_height > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::NonPositiveItemHeight(item_height))
    }
}

fn check_container_height(container_height: f64) -> Result<(), GeometryError> {
    if container_height.is_finite() && container_height >= 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidContainerHeight(container_height))
    }
}
