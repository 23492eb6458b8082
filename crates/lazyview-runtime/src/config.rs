#![forbid(unsafe_code)]

//! Session configuration.
//!
//! Everything has a default; `from_env` layers `LAZYVIEW_*` overrides on top
//! and silently keeps the default for values that fail validation.

use lazyview_core::{
    WindowDefaults,
    config::{env_flag, env_parse},
    visibility::LazyOptions,
};
use web_time::Duration;

use crate::throttle::{DEFAULT_FRAME_INTERVAL, DEFAULT_RESIZE_DEBOUNCE};

/// Scroll throttle interval in milliseconds.
pub const ENV_FRAME_INTERVAL_MS: &str = "LAZYVIEW_FRAME_INTERVAL_MS";
/// Resize debounce in milliseconds.
pub const ENV_RESIZE_DEBOUNCE_MS: &str = "LAZYVIEW_RESIZE_DEBOUNCE_MS";
/// In-flight fetch cap. Unset or `0` means unbounded.
pub const ENV_MAX_IN_FLIGHT: &str = "LAZYVIEW_MAX_IN_FLIGHT";
/// Start every region loading on attach instead of on first intersection.
pub const ENV_EAGER: &str = "LAZYVIEW_EAGER";

/// Configuration for a [`LazyListSession`](crate::LazyListSession).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Window geometry defaults.
    pub window: WindowDefaults,
    /// Observation options handed to every region.
    pub lazy: LazyOptions,
    /// Minimum time between applied scroll offsets.
    pub frame_interval: Duration,
    /// Quiet period before a container resize applies.
    pub resize_debounce: Duration,
    /// Cap on concurrent fetches. `None` is unbounded.
    pub max_in_flight: Option<usize>,
    /// Override item policies and load everything on attach.
    pub force_eager: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window: WindowDefaults::default(),
            lazy: LazyOptions::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            resize_debounce: DEFAULT_RESIZE_DEBOUNCE,
            max_in_flight: None,
            force_eager: false,
        }
    }
}

impl SessionConfig {
    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read overrides through a custom environment lookup.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            window: WindowDefaults::from_env_with(&get_env),
            lazy: LazyOptions::from_env_with(&get_env),
            frame_interval: env_parse::<u64, _>(&get_env, ENV_FRAME_INTERVAL_MS)
                .map(Duration::from_millis)
                .unwrap_or(defaults.frame_interval),
            resize_debounce: env_parse::<u64, _>(&get_env, ENV_RESIZE_DEBOUNCE_MS)
                .map(Duration::from_millis)
                .unwrap_or(defaults.resize_debounce),
            max_in_flight: env_parse::<usize, _>(&get_env, ENV_MAX_IN_FLIGHT)
                .filter(|cap| *cap > 0)
                .or(defaults.max_in_flight),
            force_eager: get_env(ENV_EAGER)
                .map(|v| env_flag(&v))
                .unwrap_or(defaults.force_eager),
        }
    }

    /// Set the window defaults.
    #[must_use]
    pub fn with_window(mut self, window: WindowDefaults) -> Self {
        self.window = window;
        self
    }

    /// Set the observation options.
    #[must_use]
    pub fn with_lazy_options(mut self, lazy: LazyOptions) -> Self {
        self.lazy = lazy;
        self
    }

    /// Set the scroll frame interval.
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the resize debounce.
    #[must_use]
    pub fn with_resize_debounce(mut self, debounce: Duration) -> Self {
        self.resize_debounce = debounce;
        self
    }

    /// Cap concurrent fetches.
    #[must_use]
    pub fn with_max_in_flight(mut self, cap: Option<usize>) -> Self {
        self.max_in_flight = cap;
        self
    }

    /// Load every region on attach.
    #[must_use]
    pub fn with_force_eager(mut self, eager: bool) -> Self {
        self.force_eager = eager;
        self
    }
}
