#![forbid(unsafe_code)]

//! Lazily loaded media regions.
//!
//! A [`LazyRegion`] stands in for an expensive resource (typically a cover
//! image) that should not be fetched while its row is off screen. It watches
//! its own visibility through a [`VisibilitySensor`] and issues exactly one
//! [`LoadRequest`] the first time it intersects the viewport.
//!
//! # State machine
//!
//! ```text
//! Unobserved ──attach──▶ ObservedNotIntersecting ◀──┐
//!     │                          │ intersecting       │ not intersecting
//!     │ intersecting             ▼                    │
//!     └──────────────▶ ObservedIntersecting ──────────┘ (before loading only)
//!                                │ (immediately)
//!                                ▼
//!                         ResourceLoading ──settle(ok)──▶ ResourceLoaded
//!                                └─────────settle(err)──▶ ResourceFailed
//! ```
//!
//! # Invariants
//!
//! 1. **At-most-once acquisition**: `ResourceLoading` is entered at most once
//!    per region, whatever sequence of intersection events arrives.
//! 2. **Exactly one terminal state**: a settle only applies while loading, so
//!    a region ends in `ResourceLoaded` or `ResourceFailed`, never both.
//! 3. **No abort**: leaving the viewport never cancels an acquisition.
//! 4. **Safe teardown**: after [`LazyRegion::detach`] the sensor handle is
//!    released and every later event or settle is ignored.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Resource fails to load | `ResourceFailed`, fallback locator shown |
//! | Settle for another region | Ignored ([`SettleOutcome::Stale`]) |
//! | Settle after detach | Ignored ([`SettleOutcome::Stale`]) |
//! | Duplicate settle | Ignored ([`SettleOutcome::Stale`]) |

use lazyview_core::visibility::{LazyOptions, RegionId, VisibilitySensor};

/// Fallback shown when a resource fails and no fallback was configured.
pub const DEFAULT_FALLBACK: &str = "/placeholder.jpg";

/// Lifecycle of a region's resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityState {
    /// Mounted, no sensor attached yet.
    #[default]
    Unobserved,
    /// Observed and outside the (margin-expanded) viewport.
    ObservedNotIntersecting,
    /// Observed and intersecting; transient, immediately followed by loading.
    ObservedIntersecting,
    /// Acquisition requested and not yet settled.
    ResourceLoading,
    /// Resource acquired.
    ResourceLoaded,
    /// Resource failed; the fallback is shown.
    ResourceFailed,
}

impl VisibilityState {
    /// Whether acquisition has been requested (loading or settled).
    #[must_use]
    pub fn has_started_loading(self) -> bool {
        matches!(
            self,
            Self::ResourceLoading | Self::ResourceLoaded | Self::ResourceFailed
        )
    }

    /// Whether the resource has settled either way.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ResourceLoaded | Self::ResourceFailed)
    }
}

/// When to start acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Wait for the first intersecting observation.
    #[default]
    Lazy,
    /// Start as soon as the sensor attaches (above-the-fold / priority items).
    Eager,
}

/// Where a region's resource comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSource {
    locator: String,
    fallback: String,
}

impl ResourceSource {
    /// Source with the default fallback.
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }

    /// Set the fallback shown on failure.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Primary locator.
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Fallback locator.
    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

/// An acquisition request issued by a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Region that must receive the outcome.
    pub region: RegionId,
    /// Resource to acquire.
    pub locator: String,
}

/// What a region currently displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation<'a> {
    /// Not yet intersected: nothing is rendered.
    Nothing,
    /// Loading: the shimmer placeholder.
    Placeholder,
    /// Loaded: the real resource.
    Resource(&'a str),
    /// Failed: the fallback resource.
    Fallback(&'a str),
}

/// Result of delivering a settle to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The region moved to this terminal state.
    Applied(VisibilityState),
    /// The settle did not apply and was discarded.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Mounted,
    Observing,
    Detached,
}

/// A region that defers acquiring its resource until it becomes visible.
#[derive(Debug, Clone)]
pub struct LazyRegion {
    id: RegionId,
    source: ResourceSource,
    policy: LoadPolicy,
    options: LazyOptions,
    state: VisibilityState,
    lifecycle: Lifecycle,
}

impl LazyRegion {
    /// Create a mounted, unobserved region.
    #[must_use]
    pub fn new(id: RegionId, source: ResourceSource) -> Self {
        Self {
            id,
            source,
            policy: LoadPolicy::default(),
            options: LazyOptions::default(),
            state: VisibilityState::Unobserved,
            lifecycle: Lifecycle::Mounted,
        }
    }

    /// Create a region whose resource already settled in an earlier mount.
    ///
    /// The region starts terminal and never issues a request.
    #[must_use]
    pub fn settled(id: RegionId, source: ResourceSource, success: bool) -> Self {
        let mut region = Self::new(id, source);
        region.state = if success {
            VisibilityState::ResourceLoaded
        } else {
            VisibilityState::ResourceFailed
        };
        region
    }

    /// Set the load policy.
    #[must_use]
    pub fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the observation options.
    #[must_use]
    pub fn with_options(mut self, options: LazyOptions) -> Self {
        self.options = options;
        self
    }

    /// Region handle.
    #[must_use]
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Resource source.
    #[must_use]
    pub fn source(&self) -> &ResourceSource {
        &self.source
    }

    /// Load policy.
    #[must_use]
    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Observation options.
    #[must_use]
    pub fn options(&self) -> &LazyOptions {
        &self.options
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> VisibilityState {
        self.state
    }

    /// Whether a sensor is currently observing this region.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.lifecycle == Lifecycle::Observing
    }

    /// Whether the region has been torn down.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.lifecycle == Lifecycle::Detached
    }

    /// Whether the placeholder is gone (loaded or failed).
    #[must_use]
    pub fn is_loaded_for_layout(&self) -> bool {
        self.state.is_terminal()
    }

    /// What to render for this region right now.
    #[must_use]
    pub fn presentation(&self) -> Presentation<'_> {
        match self.state {
            VisibilityState::Unobserved
            | VisibilityState::ObservedNotIntersecting
            | VisibilityState::ObservedIntersecting => Presentation::Nothing,
            VisibilityState::ResourceLoading => Presentation::Placeholder,
            VisibilityState::ResourceLoaded => Presentation::Resource(self.source.locator()),
            VisibilityState::ResourceFailed => Presentation::Fallback(self.source.fallback()),
        }
    }

    /// Begin observing through `sensor`.
    ///
    /// Returns a request only for [`LoadPolicy::Eager`] regions that have not
    /// started loading. Attaching twice, or after detach, does nothing.
    pub fn attach<S>(&mut self, sensor: &mut S) -> Option<LoadRequest>
    where
        S: VisibilitySensor + ?Sized,
    {
        if self.lifecycle != Lifecycle::Mounted {
            return None;
        }
        sensor.attach(self.id, &self.options);
        self.lifecycle = Lifecycle::Observing;
        if self.state == VisibilityState::Unobserved {
            self.state = VisibilityState::ObservedNotIntersecting;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(region = %self.id, policy = ?self.policy, "lazy region attached");

        match self.policy {
            LoadPolicy::Eager => self.begin_loading(),
            LoadPolicy::Lazy => None,
        }
    }

    /// Feed a visibility notification.
    ///
    /// Returns the acquisition request on the first intersecting
    /// observation; every other call returns `None`.
    pub fn on_intersection_change(&mut self, is_intersecting: bool) -> Option<LoadRequest> {
        if self.lifecycle == Lifecycle::Detached {
            return None;
        }
        match (is_intersecting, self.state) {
            (
                true,
                VisibilityState::Unobserved
                | VisibilityState::ObservedNotIntersecting
                | VisibilityState::ObservedIntersecting,
            ) => {
                self.state = VisibilityState::ObservedIntersecting;
                self.begin_loading()
            }
            (
                false,
                VisibilityState::Unobserved
                | VisibilityState::ObservedNotIntersecting
                | VisibilityState::ObservedIntersecting,
            ) => {
                self.state = VisibilityState::ObservedNotIntersecting;
                None
            }
            // Loading or settled: leaving the viewport does not abort.
            _ => None,
        }
    }

    /// Deliver the outcome of this region's acquisition.
    pub fn on_resource_settled(&mut self, success: bool) -> SettleOutcome {
        if self.lifecycle == Lifecycle::Detached
            || self.state != VisibilityState::ResourceLoading
        {
            #[cfg(feature = "tracing")]
            tracing::trace!(region = %self.id, state = ?self.state, "discarding settle");
            return SettleOutcome::Stale;
        }
        self.state = if success {
            VisibilityState::ResourceLoaded
        } else {
            VisibilityState::ResourceFailed
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(region = %self.id, success, "lazy region settled");

        SettleOutcome::Applied(self.state)
    }

    /// Deliver an outcome tagged with the request that produced it.
    ///
    /// Outcomes for a different region are discarded.
    pub fn settle(&mut self, request: &LoadRequest, success: bool) -> SettleOutcome {
        if request.region != self.id {
            return SettleOutcome::Stale;
        }
        self.on_resource_settled(success)
    }

    /// Tear down: release the sensor handle and ignore everything afterwards.
    pub fn detach<S>(&mut self, sensor: &mut S)
    where
        S: VisibilitySensor + ?Sized,
    {
        if self.lifecycle == Lifecycle::Observing {
            sensor.detach(self.id);
        }
        self.lifecycle = Lifecycle::Detached;

        #[cfg(feature = "tracing")]
        tracing::trace!(region = %self.id, state = ?self.state, "lazy region detached");
    }

    fn begin_loading(&mut self) -> Option<LoadRequest> {
        if self.state.has_started_loading() {
            return None;
        }
        self.state = VisibilityState::ResourceLoading;
        Some(LoadRequest {
            region: self.id,
            locator: self.source.locator().to_string(),
        })
    }
}
