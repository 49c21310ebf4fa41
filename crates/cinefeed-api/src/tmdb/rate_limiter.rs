//! TMDB API request spacing.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Default minimum interval between requests (~40 req/s).
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(25);

/// Slot-reserving rate limiter for TMDB API.
///
/// TMDB enforces roughly 40 requests per second. Spotlight resolution fires
/// several detail requests at once, so each caller reserves the next free
/// send slot under the lock and sleeps outside it.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbRateLimiter {
    /// Minimum interval between requests.
    min_interval: Duration,
    /// Earliest instant the next request may be sent.
    next_slot: Option<Instant>,
}

impl TmdbRateLimiter {
    /// Creates a new rate limiter with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: None,
        }
    }

    /// Creates a new rate limiter with the default interval (25ms).
    pub(crate) const fn default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// Reserves the next send slot at or after `now`.
    ///
    /// Returns how long the caller has to wait before sending.
    pub(crate) fn reserve(&mut self, now: Instant) -> Duration {
        let slot = match self.next_slot {
            Some(next) if next > now => next,
            _ => now,
        };
        self.next_slot = Some(slot.checked_add(self.min_interval).unwrap_or(slot));
        slot.saturating_duration_since(now)
    }
}

/// Waits for this caller's turn on a shared limiter.
pub(crate) async fn wait_turn(limiter: &Mutex<TmdbRateLimiter>) {
    let delay = limiter.lock().await.reserve(Instant::now());
    if !delay.is_zero() {
        tracing::trace!(delay_ms = delay.as_millis(), "TMDB request delayed by rate limiter");
        tokio::time::sleep(delay).await;
    }
}
