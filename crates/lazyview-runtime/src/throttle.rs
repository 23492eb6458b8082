#![forbid(unsafe_code)]

//! Rate limiting for high-frequency input.
//!
//! Scroll events can arrive far faster than frames are drawn. [`ScrollThrottle`]
//! lets at most one offset through per frame interval and always delivers the
//! latest offset once the interval has passed, so the final resting position
//! is never lost. [`Debouncer`] waits for a quiet period before applying a
//! value, which suits container resizes.
//!
//! Both take an explicit `now` in their `*_at` methods so tests can drive
//! time deterministically.

use web_time::{Duration, Instant};

/// Default frame interval (about 60 frames per second).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Default resize debounce.
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Result of feeding a scroll offset to the throttle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollAction {
    /// Nothing to apply yet.
    None,
    /// Apply this offset now.
    Apply(f64),
}

/// Frame-rate limiter for scroll offsets (trailing edge included).
#[derive(Debug)]
pub struct ScrollThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<f64>,
    last_applied: Option<f64>,
}

impl Default for ScrollThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl ScrollThrottle {
    /// Create a throttle emitting at most once per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
            last_applied: None,
        }
    }

    /// Frame interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether an offset is waiting for the next frame.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Feed an offset using the wall clock.
    pub fn handle_scroll(&mut self, offset: f64) -> ScrollAction {
        self.handle_scroll_at(offset, Instant::now())
    }

    /// Feed an offset observed at `now`.
    pub fn handle_scroll_at(&mut self, offset: f64, now: Instant) -> ScrollAction {
        if self.pending.is_none() && self.last_applied == Some(offset) {
            return ScrollAction::None;
        }
        let due = self
            .last_emit
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            return self.emit(offset, now);
        }
        self.pending = Some(offset);
        ScrollAction::None
    }

    /// Flush the trailing offset using the wall clock.
    pub fn tick(&mut self) -> ScrollAction {
        self.tick_at(Instant::now())
    }

    /// Flush the trailing offset if its frame has come.
    pub fn tick_at(&mut self, now: Instant) -> ScrollAction {
        let Some(offset) = self.pending else {
            return ScrollAction::None;
        };
        let due = self
            .last_emit
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if due {
            return self.emit(offset, now);
        }
        ScrollAction::None
    }

    /// Record an offset applied outside the throttle, such as a jump.
    ///
    /// Drops any trailing offset so a later tick cannot undo the jump.
    pub fn note_applied(&mut self, offset: f64) {
        self.pending = None;
        self.last_applied = Some(offset);
    }

    /// Time left before a pending offset may be flushed.
    #[must_use]
    pub fn time_until_flush(&self, now: Instant) -> Option<Duration> {
        self.pending?;
        let Some(last) = self.last_emit else {
            return Some(Duration::ZERO);
        };
        let elapsed = now.saturating_duration_since(last);
        Some(self.interval.saturating_sub(elapsed))
    }

    fn emit(&mut self, offset: f64, now: Instant) -> ScrollAction {
        self.pending = None;
        self.last_emit = Some(now);
        self.last_applied = Some(offset);
        ScrollAction::Apply(offset)
    }
}

/// Applies a value only after it has stopped changing for `delay`.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    last_change: Option<Instant>,
    pending: Option<T>,
    current: T,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Create a debouncer holding `initial`.
    #[must_use]
    pub fn new(delay: Duration, initial: T) -> Self {
        Self {
            delay,
            last_change: None,
            pending: None,
            current: initial,
        }
    }

    /// Last applied value.
    #[must_use]
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Whether a value is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a new value using the wall clock.
    pub fn push(&mut self, value: T) {
        self.push_at(value, Instant::now());
    }

    /// Record a new value observed at `now`. Restarts the quiet period.
    ///
    /// Returns `false` when the value equals the applied one and nothing is
    /// pending.
    pub fn push_at(&mut self, value: T, now: Instant) -> bool {
        if self.pending.is_none() && value == self.current {
            return false;
        }
        self.pending = Some(value);
        self.last_change = Some(now);
        true
    }

    /// Apply the pending value using the wall clock.
    pub fn tick(&mut self) -> Option<T> {
        self.tick_at(Instant::now())
    }

    /// Apply the pending value if the quiet period has elapsed.
    pub fn tick_at(&mut self, now: Instant) -> Option<T> {
        let last = self.last_change?;
        if self.pending.is_none() || now.saturating_duration_since(last) < self.delay {
            return None;
        }
        let value = self.pending.take()?;
        self.last_change = None;
        self.current = value.clone();
        Some(value)
    }

    /// Time left before the pending value applies.
    #[must_use]
    pub fn time_until_apply(&self, now: Instant) -> Option<Duration> {
        self.pending.as_ref()?;
        let last = self.last_change?;
        let elapsed = now.saturating_duration_since(last);
        Some(self.delay.saturating_sub(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_scroll_applies_immediately() {
        let mut throttle = ScrollThrottle::default();
        let now = Instant::now();
        assert_eq!(throttle.handle_scroll_at(120.0, now), ScrollAction::Apply(120.0));
    }

    #[test]
    fn jump_clears_trailing_offset_and_rearms_same_offset() {
        let mut throttle = ScrollThrottle::new(Duration::from_millis(16));
        let now = Instant::now();
        assert_eq!(throttle.handle_scroll_at(500.0, now), ScrollAction::Apply(500.0));
        assert_eq!(
            throttle.handle_scroll_at(900.0, now + Duration::from_millis(4)),
            ScrollAction::None
        );

        throttle.note_applied(0.0);
        assert!(!throttle.has_pending());
        assert_eq!(
            throttle.tick_at(now + Duration::from_millis(40)),
            ScrollAction::None
        );
        assert_eq!(
            throttle.handle_scroll_at(500.0, now + Duration::from_millis(60)),
            ScrollAction::Apply(500.0)
        );
    }

    #[test]
    fn burst_within_frame_keeps_latest() {
        let mut throttle = ScrollThrottle::new(Duration::from_millis(16));
        let now = Instant::now();
        assert_eq!(throttle.handle_scroll_at(10.0, now), ScrollAction::Apply(10.0));
        for (i, offset) in [20.0, 30.0, 40.0].into_iter().enumerate() {
            let at = now + Duration::from_millis(2 * (i as u64 + 1));
            assert_eq!(throttle.handle_scroll_at(offset, at), ScrollAction::None);
        }
        assert!(throttle.has_pending());
        assert_eq!(
            throttle.tick_at(now + Duration::from_millis(10)),
            ScrollAction::None
        );
        assert_eq!(
            throttle.tick_at(now + Duration::from_millis(16)),
            ScrollAction::Apply(40.0)
        );
        assert!(!throttle.has_pending());
    }

    #[test]
    fn repeated_offset_is_ignored() {
        let mut throttle = ScrollThrottle::default();
        let now = Instant::now();
        throttle.handle_scroll_at(50.0, now);
        assert_eq!(
            throttle.handle_scroll_at(50.0, now + Duration::from_secs(1)),
            ScrollAction::None
        );
    }

    #[test]
    fn scroll_after_interval_applies_directly() {
        let mut throttle = ScrollThrottle::new(Duration::from_millis(16));
        let now = Instant::now();
        throttle.handle_scroll_at(0.0, now);
        assert_eq!(
            throttle.handle_scroll_at(300.0, now + Duration::from_millis(20)),
            ScrollAction::Apply(300.0)
        );
    }

    #[test]
    fn time_until_flush_counts_down() {
        let mut throttle = ScrollThrottle::new(Duration::from_millis(16));
        let now = Instant::now();
        assert_eq!(throttle.time_until_flush(now), None);
        throttle.handle_scroll_at(0.0, now);
        throttle.handle_scroll_at(5.0, now + Duration::from_millis(4));
        assert_eq!(
            throttle.time_until_flush(now + Duration::from_millis(6)),
            Some(Duration::from_millis(10))
        );
    }

    #[test]
    fn debouncer_applies_after_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100), 400.0);
        let now = Instant::now();
        assert!(debouncer.push_at(500.0, now));
        assert_eq!(debouncer.tick_at(now + Duration::from_millis(50)), None);
        assert_eq!(debouncer.tick_at(now + Duration::from_millis(120)), Some(500.0));
        assert_eq!(*debouncer.current(), 500.0);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn debouncer_restarts_on_new_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100), 400.0);
        let now = Instant::now();
        debouncer.push_at(500.0, now);
        debouncer.push_at(600.0, now + Duration::from_millis(80));
        assert_eq!(debouncer.tick_at(now + Duration::from_millis(120)), None);
        assert_eq!(
            debouncer.time_until_apply(now + Duration::from_millis(120)),
            Some(Duration::from_millis(60))
        );
        assert_eq!(debouncer.tick_at(now + Duration::from_millis(180)), Some(600.0));
    }

    #[test]
    fn debouncer_ignores_unchanged_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100), 400.0);
        assert!(!debouncer.push_at(400.0, Instant::now()));
        assert!(!debouncer.is_pending());
    }
}
