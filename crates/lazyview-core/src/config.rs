#![forbid(unsafe_code)]

//! Environment-driven defaults for list geometry.
//!
//! There is no configuration file. Hosts that want to tune windowing without
//! recompiling set `LAZYVIEW_*` variables; everything else is plain builder
//! configuration. Lookups go through an injectable `get_env` closure so tests
//! never touch the process environment.
//!
//! Malformed or out-of-range values are ignored and the default is kept.

use std::str::FromStr;

use crate::error::GeometryError;
use crate::window::WindowGeometry;

/// Uniform item height, in pixels.
pub const ENV_ITEM_HEIGHT: &str = "LAZYVIEW_ITEM_HEIGHT";
/// Scroll container height, in pixels.
pub const ENV_CONTAINER_HEIGHT: &str = "LAZYVIEW_CONTAINER_HEIGHT";
/// Items rendered beyond each edge of the viewport.
pub const ENV_OVERSCAN: &str = "LAZYVIEW_OVERSCAN";

/// Default item height.
pub const DEFAULT_ITEM_HEIGHT: f64 = 100.0;
/// Default container height.
pub const DEFAULT_CONTAINER_HEIGHT: f64 = 400.0;
/// Default overscan.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Default geometry for lists that do not specify their own.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowDefaults {
    /// Uniform item height.
    pub item_height: f64,
    /// Scroll container height.
    pub container_height: f64,
    /// Overscan count.
    pub overscan: usize,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            item_height: DEFAULT_ITEM_HEIGHT,
            container_height: DEFAULT_CONTAINER_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

impl WindowDefaults {
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
            item_height: env_parse::<f64, _>(&get_env, ENV_ITEM_HEIGHT)
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(defaults.item_height),
            container_height: env_parse::<f64, _>(&get_env, ENV_CONTAINER_HEIGHT)
                .filter(|h| h.is_finite() && *h >= 0.0)
                .unwrap_or(defaults.container_height),
            overscan: env_parse(&get_env, ENV_OVERSCAN).unwrap_or(defaults.overscan),
        }
    }

    /// Set the item height.
    #[must_use]
    pub fn with_item_height(mut self, item_height: f64) -> Self {
        self.item_height = item_height;
        self
    }

    /// Set the container height.
    #[must_use]
    pub fn with_container_height(mut self, container_height: f64) -> Self {
        self.container_height = container_height;
        self
    }

    /// Set the overscan.
    #[must_use]
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Validate into a [`WindowGeometry`].
    pub fn geometry(&self) -> Result<WindowGeometry, GeometryError> {
        WindowGeometry::new(self.item_height, self.container_height, self.overscan)
    }
}

/// Parse a variable through `get_env`, returning `None` when unset or malformed.
pub fn env_parse<T, F>(get_env: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = get_env(key)?;
    let trimmed = raw.trim();
    match trimmed.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(key, value = trimmed, "ignoring malformed environment value");
            None
        }
    }
}

/// Interpret common truthy spellings (`1`, `true`, `yes`, `on`).
#[inline]
#[must_use]
pub fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let d = WindowDefaults::from_env_with(|_| None);
        assert_eq!(d, WindowDefaults::default());
        assert_eq!(d.item_height, 100.0);
        assert_eq!(d.container_height, 400.0);
        assert_eq!(d.overscan, 5);
    }

    #[test]
    fn env_overrides() {
        let d = WindowDefaults::from_env_with(lookup(&[
            (ENV_ITEM_HEIGHT, "72"),
            (ENV_CONTAINER_HEIGHT, " 640.5 "),
            (ENV_OVERSCAN, "2"),
        ]));
        assert_eq!(d.item_height, 72.0);
        assert_eq!(d.container_height, 640.5);
        assert_eq!(d.overscan, 2);
    }

    #[test]
    fn malformed_and_invalid_values_keep_defaults() {
        let d = WindowDefaults::from_env_with(lookup(&[
            (ENV_ITEM_HEIGHT, "0"),
            (ENV_CONTAINER_HEIGHT, "tall"),
            (ENV_OVERSCAN, "-1"),
        ]));
        assert_eq!(d, WindowDefaults::default());
    }

    #[test]
    fn geometry_validates() {
        assert!(WindowDefaults::default().geometry().is_ok());
        assert!(
            WindowDefaults::default()
                .with_item_height(-1.0)
                .geometry()
                .is_err()
        );
    }

    #[test]
    fn flag_spellings() {
        assert!(env_flag("1"));
        assert!(env_flag(" TRUE "));
        assert!(env_flag("on"));
        assert!(!env_flag("0"));
        assert!(!env_flag("nope"));
    }
}
