#![forbid(unsafe_code)]

//! Fetch admission.
//!
//! [`FetchQueue`] decides when a [`LoadRequest`] is handed to the host for
//! fetching. Without a cap every request dispatches immediately. With a cap,
//! surplus requests wait in FIFO order and are admitted as earlier fetches
//! settle. A queued request whose region is unmounted is dropped before it
//! ever reaches the network.

use std::collections::VecDeque;

use lazyview_core::visibility::RegionId;
use lazyview_widgets::LoadRequest;
use rustc_hash::FxHashSet;

/// Admission statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Requests handed to the host.
    pub dispatched: u64,
    /// Requests that settled.
    pub completed: u64,
    /// Queued requests dropped before dispatch.
    pub cancelled: u64,
}

/// FIFO admission with an optional in-flight cap.
#[derive(Debug, Default)]
pub struct FetchQueue {
    max_in_flight: Option<usize>,
    in_flight: FxHashSet<RegionId>,
    queued: VecDeque<LoadRequest>,
    stats: FetchStats,
}

impl FetchQueue {
    /// Create a queue. `None` means unbounded; a cap of zero is treated as one.
    #[must_use]
    pub fn new(max_in_flight: Option<usize>) -> Self {
        Self {
            max_in_flight: max_in_flight.map(|cap| cap.max(1)),
            ..Self::default()
        }
    }

    /// In-flight cap.
    #[must_use]
    pub fn max_in_flight(&self) -> Option<usize> {
        self.max_in_flight
    }

    /// Number of dispatched, unsettled requests.
    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Number of waiting requests.
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Whether `region` has a dispatched request.
    #[must_use]
    pub fn is_in_flight(&self, region: RegionId) -> bool {
        self.in_flight.contains(&region)
    }

    /// Admission statistics.
    #[must_use]
    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    fn has_capacity(&self) -> bool {
        self.max_in_flight
            .is_none_or(|cap| self.in_flight.len() < cap)
    }

    /// Offer a request. Returns it back if it may dispatch now.
    pub fn submit(&mut self, request: LoadRequest) -> Option<LoadRequest> {
        if self.in_flight.contains(&request.region)
            || self.queued.iter().any(|q| q.region == request.region)
        {
            return None;
        }
        if self.has_capacity() {
            self.in_flight.insert(request.region);
            self.stats.dispatched += 1;
            Some(request)
        } else {
            self.queued.push_back(request);
            None
        }
    }

    /// Release the slot held by `region`. Returns whether it was in flight.
    pub fn complete(&mut self, region: RegionId) -> bool {
        let released = self.in_flight.remove(&region);
        if released {
            self.stats.completed += 1;
        }
        released
    }

    /// Drop a queued request for `region`. In-flight fetches are unaffected.
    pub fn cancel_queued(&mut self, region: RegionId) -> bool {
        let before = self.queued.len();
        self.queued.retain(|q| q.region != region);
        let cancelled = before != self.queued.len();
        if cancelled {
            self.stats.cancelled += 1;
        }
        cancelled
    }

    /// Admit waiting requests while capacity allows.
    pub fn drain_ready(&mut self) -> Vec<LoadRequest> {
        let mut ready = Vec::new();
        while self.has_capacity() {
            let Some(request) = self.queued.pop_front() else {
                break;
            };
            self.in_flight.insert(request.region);
            self.stats.dispatched += 1;
            ready.push(request);
        }
        ready
    }
}
