#![forbid(unsafe_code)]

//! Runtime: the event loop side of lazyview.
//!
//! # Role in lazyview
//! `lazyview-runtime` turns raw host input (scroll offsets, container
//! resizes, fetch outcomes, timer ticks) into window recomputations, region
//! mounts and unmounts, visibility notifications, and fetch requests.
//!
//! # Primary responsibilities
//! - **[`LazyListSession`]**: the per-list loop tying the pieces together.
//! - **[`GeometricSensor`]**: a visibility sensor computed from row geometry.
//! - **[`ScrollThrottle`] / [`Debouncer`]**: frame-rate scroll limiting and
//!   resize debouncing with injectable time.
//! - **[`FetchQueue`]**: FIFO fetch admission with an optional cap.
//! - **[`SessionConfig`]**: defaults with `LAZYVIEW_*` overrides.
//! - **`logging`**: a `tracing-subscriber` setup for hosts without one.

pub mod admission;
pub mod config;
#[cfg(feature = "logging")]
pub mod logging;
pub mod sensor;
pub mod session;
pub mod throttle;

pub use admission::{FetchQueue, FetchStats};
pub use config::SessionConfig;
pub use sensor::{GeometricSensor, RegionBounds, Viewport};
pub use session::{LazyItem, LazyListSession, SettleReport};
pub use throttle::{Debouncer, ScrollAction, ScrollThrottle};
