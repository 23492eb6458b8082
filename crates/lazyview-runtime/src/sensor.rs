#![forbid(unsafe_code)]

//! Geometry-based visibility sensor.
//!
//! For hosts without a platform intersection observer (native windows,
//! terminals, headless tests), [`GeometricSensor`] computes intersections
//! from region spans along the scroll axis. It follows observer semantics:
//! every region gets one initial notification on its first observation, and
//! afterwards only changes of `is_intersecting` are reported.
//!
//! # Intersection rule
//!
//! The viewport is grown by `root_margin` on both edges. A region's ratio is
//! the fraction of its height inside the grown viewport. It intersects when
//! the overlap is non-empty and `ratio >= threshold`. A zero-height region
//! intersects when its position lies inside the grown viewport.

use lazyview_core::visibility::{IntersectionEntry, LazyOptions, RegionId, VisibilitySensor};
use rustc_hash::FxHashMap;

/// Vertical span of a region in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
    /// Top edge.
    pub top: f64,
    /// Height (zero allowed).
    pub height: f64,
}

impl RegionBounds {
    /// Create bounds.
    #[must_use]
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Visible span of the scroll container in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Scroll offset.
    pub top: f64,
    /// Container height.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }
}

/// Compute `(is_intersecting, ratio)` for one region.
#[must_use]
pub fn intersection(bounds: RegionBounds, viewport: Viewport, options: &LazyOptions) -> (bool, f64) {
    let root_top = viewport.top - options.root_margin;
    let root_bottom = viewport.top + viewport.height + options.root_margin;
    if root_bottom < root_top {
        return (false, 0.0);
    }

    if bounds.height <= 0.0 {
        let inside = bounds.top >= root_top && bounds.top <= root_bottom;
        return (inside, if inside { 1.0 } else { 0.0 });
    }

    let overlap = bounds.bottom().min(root_bottom) - bounds.top.max(root_top);
    if overlap <= 0.0 {
        return (false, 0.0);
    }
    let ratio = (overlap / bounds.height).clamp(0.0, 1.0);
    (ratio >= options.threshold, ratio)
}

#[derive(Debug, Clone)]
struct Observed {
    options: LazyOptions,
    bounds: Option<RegionBounds>,
    last: Option<bool>,
}

/// A [`VisibilitySensor`] that derives intersections from region bounds.
#[derive(Debug, Default)]
pub struct GeometricSensor {
    regions: FxHashMap<RegionId, Observed>,
}

impl GeometricSensor {
    /// Create an empty sensor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of observed regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether nothing is observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Whether `region` is observed.
    #[must_use]
    pub fn is_observing(&self, region: RegionId) -> bool {
        self.regions.contains_key(&region)
    }

    /// Record where `region` sits. Returns `false` if it is not observed.
    pub fn set_bounds(&mut self, region: RegionId, bounds: RegionBounds) -> bool {
        match self.regions.get_mut(&region) {
            Some(observed) => {
                observed.bounds = Some(bounds);
                true
            }
            None => false,
        }
    }

    /// Test every positioned region against `viewport`.
    ///
    /// Returns the initial notification for newly positioned regions and a
    /// notification for every region whose intersection flipped, ordered by
    /// region handle. Regions without bounds are skipped.
    pub fn observe(&mut self, viewport: Viewport) -> Vec<IntersectionEntry> {
        let mut entries: Vec<IntersectionEntry> = self
            .regions
            .iter_mut()
            .filter_map(|(&region, observed)| {
                let bounds = observed.bounds?;
                let (is_intersecting, ratio) = intersection(bounds, viewport, &observed.options);
                if observed.last == Some(is_intersecting) {
                    return None;
                }
                observed.last = Some(is_intersecting);
                Some(IntersectionEntry {
                    region,
                    is_intersecting,
                    ratio,
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry.region);
        entries
    }
}

impl VisibilitySensor for GeometricSensor {
    fn attach(&mut self, region: RegionId, options: &LazyOptions) {
        self.regions.insert(
            region,
            Observed {
                options: *options,
                bounds: None,
                last: None,
            },
        );
    }

    fn detach(&mut self, region: RegionId) {
        self.regions.remove(&region);
    }
}
