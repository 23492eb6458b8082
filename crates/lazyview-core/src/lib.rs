#![forbid(unsafe_code)]

//! Core: viewport windowing for virtualized lists.
//!
//! # Role in lazyview
//! `lazyview-core` is the pure-math layer. Given a uniform item height, a
//! container height, an overscan margin and a scroll offset, it decides which
//! contiguous slice of a (possibly huge) ordered collection must be
//! materialized and where that slice sits inside the scroll spacer.
//!
//! # Primary responsibilities
//! - **[`WindowGeometry`]**: validated geometry plus `visible_range`.
//! - **[`compute_visible_range`]**: one-shot form over raw parameters.
//! - **[`Windower`]**: scroll/geometry state that recomputes on change.
//! - **[`WindowDefaults`]**: default geometry with `LAZYVIEW_*` overrides.
//! - **[`VisibilitySensor`]**: the capability lazy loaders observe through.
//!
//! # How it fits in the system
//! `lazyview-widgets` renders the computed slice through a caller callback and
//! owns per-row lazy loaders; `lazyview-runtime` drives both from scroll and
//! visibility events. This crate has no knowledge of items, rendering or
//! resources.

pub mod config;
pub mod error;
pub mod visibility;
pub mod window;
pub mod windower;

pub use config::WindowDefaults;
pub use error::GeometryError;
pub use visibility::{IntersectionEntry, LazyOptions, RegionId, VisibilitySensor};
pub use window::{VisibleRange, WindowGeometry, clamp_scroll_offset, compute_visible_range};
pub use windower::{Windower, WindowerPhase};
