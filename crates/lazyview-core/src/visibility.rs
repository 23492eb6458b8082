#![forbid(unsafe_code)]

//! Visibility sensing contract.
//!
//! A visibility sensor reports whether a region overlaps the scroll viewport.
//! Browsers provide one natively; other hosts can compute it from geometry.
//! Consumers depend only on [`VisibilitySensor`], never on how a sensor
//! decides intersection.

use crate::config::env_parse;

/// Pre-trigger distance outside the viewport, in pixels.
pub const ENV_ROOT_MARGIN: &str = "LAZYVIEW_ROOT_MARGIN";
/// Fraction of a region that must intersect.
pub const ENV_THRESHOLD: &str = "LAZYVIEW_THRESHOLD";

/// Default root margin.
pub const DEFAULT_ROOT_MARGIN: f64 = 20.0;
/// Default intersection threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Opaque handle for an observed region.
///
/// Handles are never reused within a session, so a result tagged with a
/// handle whose region is gone can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionId(pub u64);

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// Observation options for one region.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LazyOptions {
    /// Distance the viewport is grown by on each edge before testing overlap.
    pub root_margin: f64,
    /// Minimum visible fraction of the region, in `[0, 1]`. Zero means any overlap.
    pub threshold: f64,
}

impl Default for LazyOptions {
    fn default() -> Self {
        Self {
            root_margin: DEFAULT_ROOT_MARGIN,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl LazyOptions {
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
            root_margin: env_parse::<f64, _>(&get_env, ENV_ROOT_MARGIN)
                .filter(|m| m.is_finite())
                .unwrap_or(defaults.root_margin),
            threshold: env_parse::<f64, _>(&get_env, ENV_THRESHOLD)
                .filter(|t| (0.0..=1.0).contains(t))
                .unwrap_or(defaults.threshold),
        }
    }

    /// Set the root margin.
    #[must_use]
    pub fn with_root_margin(mut self, root_margin: f64) -> Self {
        self.root_margin = root_margin;
        self
    }

    /// Set the threshold, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = if threshold.is_nan() {
            0.0
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }
}

/// One visibility notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// Region the notification is for.
    pub region: RegionId,
    /// Whether the region meets its threshold.
    pub is_intersecting: bool,
    /// Visible fraction of the region, in `[0, 1]`.
    pub ratio: f64,
}

/// Capability to observe regions for viewport intersection.
///
/// Notifications are delivered out of band (the host's event loop pulls or
/// receives [`IntersectionEntry`] values and routes them to the owner of the
/// region). After `detach` a sensor must not report the region again.
pub trait VisibilitySensor {
    /// Start observing `region`.
    fn attach(&mut self, region: RegionId, options: &LazyOptions);

    /// Stop observing `region`. Detaching an unknown region is a no-op.
    fn detach(&mut self, region: RegionId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observer_defaults() {
        let options = LazyOptions::default();
        assert_eq!(options.root_margin, 20.0);
        assert_eq!(options.threshold, 0.1);
    }

    #[test]
    fn env_overrides_and_rejects_out_of_range() {
        let options = LazyOptions::from_env_with(|key| match key {
            ENV_ROOT_MARGIN => Some("200".into()),
            ENV_THRESHOLD => Some("1.5".into()),
            _ => None,
        });
        assert_eq!(options.root_margin, 200.0);
        assert_eq!(options.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn threshold_builder_clamps() {
        assert_eq!(LazyOptions::default().with_threshold(2.0).threshold, 1.0);
        assert_eq!(LazyOptions::default().with_threshold(-1.0).threshold, 0.0);
        assert_eq!(LazyOptions::default().with_threshold(f64::NAN).threshold, 0.0);
    }

    #[test]
    fn region_id_display() {
        assert_eq!(RegionId(7).to_string(), "region#7");
    }
}
