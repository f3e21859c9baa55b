//! Reconnect backoff policy.

/// Default first retry delay, in seconds.
pub const DEFAULT_INITIAL_BACKOFF_SECS: u32 = 1;

/// Default ceiling for the retry delay, in seconds.
pub const DEFAULT_MAX_BACKOFF_SECS: u32 = 64;

/// Doubling backoff counter owned by a single subscription.
///
/// The doubling happens when a retry is *scheduled*: [`Backoff::schedule`]
/// hands out the current delay and grows the counter for the next failure.
/// A successful open calls [`Backoff::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    current: u32,
    initial: u32,
    max: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_BACKOFF_SECS, DEFAULT_MAX_BACKOFF_SECS)
    }
}

impl Backoff {
    /// Create a backoff starting at `initial` and capped at `max` seconds.
    ///
    /// `initial` is clamped to at least 1 and `max` to at least `initial`.
    pub fn new(initial: u32, max: u32) -> Self {
        let initial = initial.max(1);
        Self {
            current: initial,
            initial,
            max: max.max(initial),
        }
    }

    /// Delay that the next scheduled retry will wait.
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Upper bound of the delay.
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Take the delay for the retry being scheduled and double the counter.
    pub fn schedule(&mut self) -> u32 {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// Forgive prior failures after a successful open.
    pub const fn reset(&mut self) {
        self.current = self.initial;
    }
}
