//! Property-based invariant tests for viewport windowing.
//!
//! These must hold for **any** valid geometry and scroll position:
//!
//! 1. Bounds: `start <= end <= item_count`.
//! 2. Soundness: every geometrically visible index is materialized, including
//!    fractional heights where the division rounds across a row boundary.
//! 3. Scalability: range length is bounded independently of item count.
//! 4. Determinism: identical inputs give identical ranges.
//! 5. Derived fields: `total_height` and `offset_y` match their formulas.
//! 6. Windower agrees with the pure function after any edit sequence.

use lazyview_core::{VisibleRange, WindowGeometry, Windower, compute_visible_range};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

// Integer-valued heights keep the overlap oracle exact.
fn geometry_strategy() -> impl Strategy<Value = WindowGeometry> {
    (1u32..=200, 0u32..=2000, 0usize..=20).prop_map(|(h, c, o)| {
        WindowGeometry::new(f64::from(h), f64::from(c), o).expect("valid geometry")
    })
}

// Fractional heights with the scroll offset placed a few ULPs below a row
// boundary, where `scroll / h` is most likely to round across it.
fn fractional_boundary_strategy() -> impl Strategy<Value = (WindowGeometry, usize, f64)> {
    (1.0f64..200.0, 0.0f64..2000.0, 1usize..=5000, 0u64..4).prop_map(|(h, c, row, ulps)| {
        let geometry = WindowGeometry::new(h, c, 0).expect("valid geometry");
        let boundary = row as f64 * h;
        let scroll = f64::from_bits(boundary.to_bits() - ulps);
        (geometry, row, scroll)
    })
}

fn overlaps(idx: usize, h: f64, scroll: f64, container: f64) -> bool {
    let top = idx as f64 * h;
    let bottom = top + h;
    top < scroll + container && bottom > scroll
}

// ═════════════════════════════════════════════════════════════════════════
// 1-5. Pure function invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn range_is_within_bounds(
        geometry in geometry_strategy(),
        item_count in 0usize..=5000,
        scroll in 0u32..=2_000_000,
    ) {
        let range = geometry.visible_range(f64::from(scroll), item_count);
        prop_assert!(range.start <= range.end);
        prop_assert!(range.end <= item_count);
    }

    #[test]
    fn every_visible_index_is_materialized(
        geometry in geometry_strategy(),
        item_count in 0usize..=2000,
        scroll_fraction in 0.0f64..=1.0,
    ) {
        let h = geometry.item_height();
        let total = geometry.total_height(item_count);
        let scroll = (total * scroll_fraction).floor();
        let range = geometry.visible_range(scroll, item_count);

        let first = ((scroll / h).floor() as usize).saturating_sub(1);
        let last = (((scroll + geometry.container_height()) / h).ceil() as usize + 1).min(item_count);
        for idx in first.min(item_count)..last {
            if overlaps(idx, h, scroll, geometry.container_height()) {
                prop_assert!(
                    range.contains(idx),
                    "index {} visible at scroll {} but range is {:?}",
                    idx, scroll, range.indices()
                );
            }
        }
    }

    #[test]
    fn zero_overscan_keeps_rows_at_fractional_boundaries(
        (geometry, row, scroll) in fractional_boundary_strategy(),
    ) {
        let h = geometry.item_height();
        let c = geometry.container_height();
        let item_count = row + 200;
        let range = geometry.visible_range(scroll, item_count);
        let lo = row.saturating_sub(2);
        let hi = (((scroll + c) / h).ceil() as usize + 2).min(item_count);
        for idx in lo..hi {
            if overlaps(idx, h, scroll, c) {
                prop_assert!(
                    range.contains(idx),
                    "index {} visible at scroll {} (h {}) but range is {:?}",
                    idx, scroll, h, range.indices()
                );
            }
        }
    }

    #[test]
    fn range_length_is_bounded(
        geometry in geometry_strategy(),
        item_count in 0usize..=1_000_000,
        scroll in 0u32..=u32::MAX,
    ) {
        let range = geometry.visible_range(f64::from(scroll), item_count);
        let bound = (geometry.container_height() / geometry.item_height()).ceil() as usize
            + 2 * geometry.overscan()
            + 1;
        prop_assert!(range.len() <= bound, "len {} > bound {}", range.len(), bound);
    }

    #[test]
    fn identical_inputs_identical_output(
        geometry in geometry_strategy(),
        item_count in 0usize..=10_000,
        scroll in 0u32..=1_000_000,
    ) {
        let scroll = f64::from(scroll);
        let a = compute_visible_range(
            scroll,
            geometry.item_height(),
            geometry.container_height(),
            item_count,
            geometry.overscan(),
        ).unwrap();
        let b = geometry.visible_range(scroll, item_count);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn derived_fields_follow_formulas(
        geometry in geometry_strategy(),
        item_count in 0usize..=10_000,
        scroll in 0u32..=1_000_000,
    ) {
        let range = geometry.visible_range(f64::from(scroll), item_count);
        prop_assert_eq!(range.total_height, item_count as f64 * geometry.item_height());
        prop_assert_eq!(range.offset_y, range.start as f64 * geometry.item_height());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Windower agrees with the pure function
// ═════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum Edit {
    Scroll(u32),
    ScrollBy(i32),
    Count(usize),
    Overscan(usize),
    Container(u32),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0u32..=100_000).prop_map(Edit::Scroll),
        (-5000i32..=5000).prop_map(Edit::ScrollBy),
        (0usize..=2000).prop_map(Edit::Count),
        (0usize..=10).prop_map(Edit::Overscan),
        (0u32..=1500).prop_map(Edit::Container),
    ]
}

proptest! {
    #[test]
    fn windower_matches_pure_function(
        geometry in geometry_strategy(),
        item_count in 0usize..=2000,
        edits in proptest::collection::vec(edit_strategy(), 0..32),
    ) {
        let mut windower = Windower::new(geometry, item_count);
        for edit in edits {
            match edit {
                Edit::Scroll(s) => { windower.set_scroll_offset(f64::from(s)); }
                Edit::ScrollBy(d) => { windower.scroll_by(f64::from(d)); }
                Edit::Count(c) => { windower.set_item_count(c); }
                Edit::Overscan(o) => { windower.set_overscan(o); }
                Edit::Container(c) => { windower.set_container_height(f64::from(c)).unwrap(); }
            }
            let expected: VisibleRange = windower
                .geometry()
                .visible_range(windower.scroll_offset(), windower.item_count());
            prop_assert_eq!(*windower.range(), expected);
            prop_assert!(windower.scroll_offset() >= 0.0);
        }
    }
}
