#![forbid(unsafe_code)]

//! Scroll-driven lazy list session.
//!
//! A [`LazyListSession`] owns the moving parts behind one scrollable list of
//! media rows:
//!
//! - a [`Windower`] deciding which rows are materialized,
//! - one [`LazyRegion`] per materialized row that has a resource,
//! - a [`GeometricSensor`] reporting which regions intersect the viewport,
//! - a [`FetchQueue`] admitting load requests to the host.
//!
//! The host owns the items and the network. It forwards scroll offsets,
//! resizes, and timer ticks; the session answers with the [`LoadRequest`]s
//! that should be fetched now. Outcomes come back through
//! [`settle`](LazyListSession::settle).
//!
//! # Remounting
//!
//! Rows leave and re-enter the window while scrolling. A region is never
//! re-attached: unmounting detaches it, and remounting builds a new region
//! with a fresh handle. Outcomes that arrive for an unmounted region are not
//! applied to any region, but the session remembers them so a remounted row
//! shows its artwork (or fallback) without fetching again. A remounted row
//! whose own request has not been dispatched yet is settled from the
//! remembered outcome too.
//!
//! # Example
//!
//! ```
//! use lazyview_runtime::{LazyItem, LazyListSession, SessionConfig};
//! use lazyview_widgets::{ListItem, ResourceSource};
//!
//! struct Track(u64);
//!
//! impl ListItem for Track {
//!     type Id = u64;
//!     fn id(&self) -> u64 { self.0 }
//! }
//!
//! impl LazyItem for Track {
//!     fn resource(&self) -> Option<ResourceSource> {
//!         Some(ResourceSource::new(format!("/covers/{}.jpg", self.0)))
//!     }
//! }
//!
//! let tracks: Vec<Track> = (0..1000).map(Track).collect();
//! let mut session = LazyListSession::new(SessionConfig::default()).unwrap();
//! let requests = session.sync(&tracks);
//!
//! // Four rows are on screen; the root margin pulls in the fifth.
//! assert_eq!(requests.len(), 5);
//! assert_eq!(session.range().indices(), 0..9);
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use lazyview_core::visibility::RegionId;
use lazyview_core::{GeometryError, VisibleRange, Windower};
use lazyview_widgets::{
    LazyRegion, ListItem, LoadPolicy, LoadRequest, Presentation, RenderedWindow, ResourceSource,
    SettleOutcome, VirtualList, VirtualListState,
};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};
use web_time::{Duration, Instant};

use crate::admission::{FetchQueue, FetchStats};
use crate::config::SessionConfig;
use crate::sensor::{GeometricSensor, RegionBounds, Viewport};
use crate::throttle::{Debouncer, ScrollAction, ScrollThrottle};

/// A list item that may carry a lazily loaded resource.
pub trait LazyItem: ListItem {
    /// Resource shown in this item's row, if any.
    fn resource(&self) -> Option<ResourceSource>;

    /// When the resource should start loading.
    fn load_policy(&self) -> LoadPolicy {
        LoadPolicy::Lazy
    }
}

/// Result of delivering a fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleReport {
    /// What happened to the owning region.
    pub outcome: SettleOutcome,
    /// Requests admitted because a slot was released.
    pub dispatched: Vec<LoadRequest>,
}

#[derive(Debug)]
struct MountedRow {
    index: usize,
    region: Option<LazyRegion>,
}

/// One scrollable list of lazily loaded rows.
#[derive(Debug)]
pub struct LazyListSession<K> {
    config: SessionConfig,
    windower: Windower,
    sensor: GeometricSensor,
    throttle: ScrollThrottle,
    resize: Debouncer<f64>,
    queue: FetchQueue,
    mounted: FxHashMap<K, MountedRow>,
    by_region: FxHashMap<RegionId, K>,
    in_flight: FxHashMap<RegionId, K>,
    settled: FxHashMap<K, bool>,
    next_region: u64,
}

impl<K> LazyListSession<K>
where
    K: Clone + Eq + Hash + Debug,
{
    /// Create a session. Fails if the configured geometry is invalid.
    pub fn new(config: SessionConfig) -> Result<Self, GeometryError> {
        let geometry = config.window.geometry()?;
        info!(
            item_height = geometry.item_height(),
            container_height = geometry.container_height(),
            overscan = geometry.overscan(),
            max_in_flight = ?config.max_in_flight,
            "lazy list session created"
        );
        Ok(Self {
            windower: Windower::new(geometry, 0),
            sensor: GeometricSensor::new(),
            throttle: ScrollThrottle::new(config.frame_interval),
            resize: Debouncer::new(config.resize_debounce, geometry.container_height()),
            queue: FetchQueue::new(config.max_in_flight),
            mounted: FxHashMap::default(),
            by_region: FxHashMap::default(),
            in_flight: FxHashMap::default(),
            settled: FxHashMap::default(),
            next_region: 0,
            config,
        })
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Window state.
    #[must_use]
    pub fn windower(&self) -> &Windower {
        &self.windower
    }

    /// Current visible range.
    #[must_use]
    pub fn range(&self) -> VisibleRange {
        *self.windower.range()
    }

    /// Applied scroll offset.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.windower.scroll_offset()
    }

    /// Number of materialized rows.
    #[must_use]
    pub fn mounted_len(&self) -> usize {
        self.mounted.len()
    }

    /// Whether the row for `key` is materialized.
    #[must_use]
    pub fn is_mounted(&self, key: &K) -> bool {
        self.mounted.contains_key(key)
    }

    /// Region of a materialized row.
    #[must_use]
    pub fn region(&self, key: &K) -> Option<&LazyRegion> {
        self.mounted.get(key).and_then(|row| row.region.as_ref())
    }

    /// What a materialized row should show for its resource.
    #[must_use]
    pub fn presentation(&self, key: &K) -> Option<Presentation<'_>> {
        self.region(key).map(LazyRegion::presentation)
    }

    /// Remembered outcome for `key`, if its resource ever settled.
    #[must_use]
    pub fn settled_outcome(&self, key: &K) -> Option<bool> {
        self.settled.get(key).copied()
    }

    /// Number of dispatched, unsettled fetches.
    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.queue.in_flight_len()
    }

    /// Number of fetches waiting for a slot.
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queue.queued_len()
    }

    /// Admission statistics.
    #[must_use]
    pub fn fetch_stats(&self) -> FetchStats {
        self.queue.stats()
    }

    /// Reconcile against `items` (initial load or collection change).
    pub fn sync<T>(&mut self, items: &[T]) -> Vec<LoadRequest>
    where
        T: LazyItem<Id = K>,
    {
        self.reconcile(items)
    }

    /// Feed a scroll offset using the wall clock.
    pub fn scroll<T>(&mut self, items: &[T], offset: f64) -> Vec<LoadRequest>
    where
        T: LazyItem<Id = K>,
    {
        self.scroll_at(items, offset, Instant::now())
    }

    /// Feed a scroll offset observed at `now`.
    ///
    /// Offsets arriving faster than the frame interval are held back; call
    /// [`tick_at`](Self::tick_at) to flush the latest one.
    pub fn scroll_at<T>(&mut self, items: &[T], offset: f64, now: Instant) -> Vec<LoadRequest>
    where
        T: LazyItem<Id = K>,
    {
        match self.throttle.handle_scroll_at(offset, now) {
            ScrollAction::Apply(offset) => self.apply_scroll(items, offset),
            ScrollAction::None => Vec::new(),
        }
    }

    /// Jump so item `idx` sits at the top, bypassing the throttle.
    pub fn scroll_to_index<T>(&mut self, items: &[T], idx: usize) -> Vec<LoadRequest>
    where
        T: LazyItem<Id = K>,
    {
        self.windower.set_item_count(items.len());
        self.windower.scroll_to_index(idx);
        self.throttle.note_applied(self.windower.scroll_offset());
        self.reconcile(items)
    }

    /// Record a container resize using the wall clock.
    pub fn resize(&mut self, container_height: f64) -> Result<(), GeometryError> {
        self.resize_at(container_height, Instant::now())
    }

    /// Record a container resize observed at `now`. Applies after the
    /// debounce on a later tick.
    pub fn resize_at(&mut self, container_height: f64, now: Instant) -> Result<(), GeometryError> {
        self.windower
            .geometry()
            .with_container_height(container_height)?;
        self.resize.push_at(container_height, now);
        Ok(())
    }

    /// Flush pending scroll and resize input using the wall clock.
    pub fn tick<T>(&mut self, items: &[T]) -> Vec<LoadRequest>
    where
        T: LazyItem<Id = K>,
    {
        self.tick_at(items, Instant::now())
    }

    /// Flush pending scroll and resize input that is due at `now`.
    pub fn tick_at<T>(&mut self, items: &[T], now: Instant) -> Vec<LoadRequest>
    where
        T: LazyItem<Id = K>,
    {
        let mut changed = false;
        if let ScrollAction::Apply(offset) = self.throttle.tick_at(now) {
            changed |= self.windower.set_scroll_offset(offset).is_some();
        }
        if let Some(height) = self.resize.tick_at(now) {
            match self.windower.set_container_height(height) {
                Ok(range) => {
                    debug!(container_height = height, "container resize applied");
                    changed |= range.is_some();
                }
                Err(err) => warn!(%err, "dropping container resize"),
            }
        }
        if changed {
            self.reconcile(items)
        } else {
            Vec::new()
        }
    }

    /// Time until the next tick has work to do.
    #[must_use]
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        match (
            self.throttle.time_until_flush(now),
            self.resize.time_until_apply(now),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Deliver the outcome of a dispatched request.
    ///
    /// The outcome is applied if the requesting region is still mounted and
    /// loading; otherwise it is reported stale. Either way the fetch slot is
    /// released and waiting requests may be admitted.
    pub fn settle(&mut self, request: &LoadRequest, success: bool) -> SettleReport {
        self.queue.complete(request.region);
        let outcome = match self.in_flight.remove(&request.region) {
            Some(key) => {
                self.settled.insert(key.clone(), success);
                let applied = self
                    .mounted
                    .get_mut(&key)
                    .and_then(|row| row.region.as_mut())
                    .map(|region| region.settle(request, success));
                match applied {
                    Some(outcome @ SettleOutcome::Applied(_)) => {
                        debug!(region = %request.region, success, "resource settled");
                        outcome
                    }
                    _ => {
                        debug!(
                            region = %request.region,
                            key = ?key,
                            success,
                            "late outcome for a replaced region"
                        );
                        SettleOutcome::Stale
                    }
                }
            }
            None => {
                warn!(region = %request.region, "outcome for unknown request");
                SettleOutcome::Stale
            }
        };

        let mut dispatched = Vec::new();
        loop {
            let ready = self.queue.drain_ready();
            if ready.is_empty() {
                break;
            }
            for request in ready {
                if self.serve_from_cache(&request) {
                    self.queue.complete(request.region);
                } else {
                    self.dispatch(request, &mut dispatched);
                }
            }
        }
        SettleReport {
            outcome,
            dispatched,
        }
    }

    /// Materialize the current window through `render_row`.
    ///
    /// The callback receives each item, its index, and its region (if the
    /// row is mounted with a resource).
    pub fn render<'a, T, R, F>(&self, items: &'a [T], mut render_row: F) -> RenderedWindow<R>
    where
        T: LazyItem<Id = K>,
        F: FnMut(&'a T, usize, Option<&LazyRegion>) -> R,
    {
        let list = VirtualList::new(items, *self.windower.geometry());
        let mut state = VirtualListState::new();
        state.set_scroll_offset(self.windower.scroll_offset());
        list.render(&mut state, |item, idx| {
            render_row(item, idx, self.region(&item.id()))
        })
    }

    /// Detach every region and drop queued fetches.
    ///
    /// Outcomes of in-flight fetches are still accepted by
    /// [`settle`](Self::settle) and remembered.
    pub fn teardown(&mut self) {
        let keys: Vec<K> = self.mounted.keys().cloned().collect();
        for key in keys {
            self.unmount(&key);
        }
        info!(in_flight = self.queue.in_flight_len(), "lazy list session torn down");
    }

    fn apply_scroll<T>(&mut self, items: &[T], offset: f64) -> Vec<LoadRequest>
    where
        T: LazyItem<Id = K>,
    {
        let resized = self.windower.set_item_count(items.len()).is_some();
        let moved = self.windower.set_scroll_offset(offset).is_some();
        if resized || moved {
            self.reconcile(items)
        } else {
            Vec::new()
        }
    }

    fn reconcile<T>(&mut self, items: &[T]) -> Vec<LoadRequest>
    where
        T: LazyItem<Id = K>,
    {
        self.windower.set_item_count(items.len());
        let range = *self.windower.range();
        let geometry = *self.windower.geometry();

        // Later duplicates of an id win.
        let wanted: FxHashMap<K, usize> =
            range.indices().map(|idx| (items[idx].id(), idx)).collect();
        let stale: Vec<K> = self
            .mounted
            .keys()
            .filter(|key| !wanted.contains_key(*key))
            .cloned()
            .collect();
        for key in &stale {
            self.unmount(key);
        }

        let mut requests = Vec::new();
        for idx in range.indices() {
            let item = &items[idx];
            let key = item.id();
            if wanted.get(&key) != Some(&idx) {
                continue;
            }
            let bounds = RegionBounds::new(geometry.offset_of(idx), geometry.item_height());
            if let Some(row) = self.mounted.get_mut(&key) {
                row.index = idx;
                if let Some(region) = &row.region {
                    self.sensor.set_bounds(region.id(), bounds);
                }
                continue;
            }
            if let Some(request) = self.mount(item, key, idx, bounds) {
                self.admit(request, &mut requests);
            }
        }

        let viewport = Viewport::new(self.windower.scroll_offset(), geometry.container_height());
        for entry in self.sensor.observe(viewport) {
            let Some(key) = self.by_region.get(&entry.region) else {
                continue;
            };
            let Some(region) = self
                .mounted
                .get_mut(key)
                .and_then(|row| row.region.as_mut())
            else {
                continue;
            };
            if let Some(request) = region.on_intersection_change(entry.is_intersecting) {
                self.admit(request, &mut requests);
            }
        }

        debug!(
            start = range.start,
            end = range.end,
            mounted = self.mounted.len(),
            unmounted = stale.len(),
            requested = requests.len(),
            "window reconciled"
        );
        requests
    }

    fn mount<T>(&mut self, item: &T, key: K, index: usize, bounds: RegionBounds) -> Option<LoadRequest>
    where
        T: LazyItem<Id = K>,
    {
        let Some(source) = item.resource() else {
            self.mounted.insert(key, MountedRow { index, region: None });
            return None;
        };

        let id = RegionId(self.next_region);
        self.next_region += 1;
        let policy = if self.config.force_eager {
            LoadPolicy::Eager
        } else {
            item.load_policy()
        };
        let mut region = match self.settled.get(&key) {
            Some(&success) => LazyRegion::settled(id, source, success),
            None => LazyRegion::new(id, source),
        }
        .with_policy(policy)
        .with_options(self.config.lazy);

        let request = if region.state().is_terminal() {
            None
        } else {
            let request = region.attach(&mut self.sensor);
            self.sensor.set_bounds(id, bounds);
            request
        };

        debug!(region = %id, index, key = ?key, state = ?region.state(), "row mounted");
        self.by_region.insert(id, key.clone());
        self.mounted.insert(
            key,
            MountedRow {
                index,
                region: Some(region),
            },
        );
        request
    }

    fn unmount(&mut self, key: &K) {
        let Some(row) = self.mounted.remove(key) else {
            return;
        };
        let Some(mut region) = row.region else {
            return;
        };
        let id = region.id();
        region.detach(&mut self.sensor);
        self.by_region.remove(&id);
        if self.queue.cancel_queued(id) {
            debug!(region = %id, "queued fetch dropped on unmount");
        }
        debug!(region = %id, index = row.index, state = ?region.state(), "row unmounted");
    }

    fn admit(&mut self, request: LoadRequest, out: &mut Vec<LoadRequest>) {
        if self.serve_from_cache(&request) {
            return;
        }
        let region = request.region;
        match self.queue.submit(request) {
            Some(request) => self.dispatch(request, out),
            None => debug!(region = %region, queued = self.queue.queued_len(), "fetch deferred"),
        }
    }

    /// Settle `request` from a remembered outcome of the same row.
    fn serve_from_cache(&mut self, request: &LoadRequest) -> bool {
        let Some(key) = self.by_region.get(&request.region) else {
            return false;
        };
        let Some(&success) = self.settled.get(key) else {
            return false;
        };
        if let Some(region) = self.mounted.get_mut(key).and_then(|row| row.region.as_mut()) {
            region.settle(request, success);
        }
        debug!(region = %request.region, success, "served from settled cache");
        true
    }

    fn dispatch(&mut self, request: LoadRequest, out: &mut Vec<LoadRequest>) {
        if let Some(key) = self.by_region.get(&request.region) {
            self.in_flight.insert(request.region, key.clone());
        }
        debug!(region = %request.region, locator = %request.locator, "fetch dispatched");
        out.push(request);
    }
}
