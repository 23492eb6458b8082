#![forbid(unsafe_code)]

//! Widgets: the per-row consumers of a windowed list.
//!
//! - [`virtual_list`]: renders only the materialized slice of a borrowed
//!   collection through a caller callback, and tracks scroll/selection state.
//! - [`lazy_region`]: defers a row's expensive resource until the row is
//!   visible, then loads it exactly once with a deterministic fallback.
//!
//! The two are independent; a row rendered by a [`VirtualList`] typically
//! owns a [`LazyRegion`] for its artwork.

pub mod lazy_region;
pub mod virtual_list;

pub use lazy_region::{
    LazyRegion, LoadPolicy, LoadRequest, Presentation, ResourceSource, SettleOutcome,
    VisibilityState,
};
pub use virtual_list::{
    ListItem, PositionedRow, RenderedWindow, VirtualList, VirtualListPersistState,
    VirtualListState,
};
