//! # Global runtime configuration.
//!
//! Provides [`Config`], the centralized settings for the supervisor runtime.
//!
//! ## Field semantics
//! - `threshold`: how long a process must live for its death to count as a
//!   normal exit rather than an instant crash;
//! - `min_restart_delay` / `max_restart_delay`: bounds of the exponential
//!   restart backoff;
//! - `kill_time`: how long a TERM'd process gets before it is KILL'd;
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by the Bus).

use std::time::Duration;

use crate::policies::RestartBackoff;

/// Global configuration for the supervisor runtime.
#[derive(Clone, Debug)]
pub struct Config {
    /// How long a process has to live before its death is considered a
    /// normal exit instead of an instant crash.
    ///
    /// An exit after less than `threshold` of runtime schedules a delayed,
    /// backoff-governed restart; an exit at or after `threshold` restarts
    /// immediately and resets the backoff.
    pub threshold: Duration,

    /// The minimum (and initial) delay before restarting a crashed process.
    pub min_restart_delay: Duration,

    /// The maximum delay before restarting a crashed process.
    ///
    /// The doubling backoff is capped here.
    pub max_restart_delay: Duration,

    /// How long a process being stopped has to get its affairs in order
    /// after TERM before it is killed with an unmaskable signal.
    pub kill_time: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// skip older items. Minimum value is 1 (enforced by the Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the restart backoff policy derived from this configuration.
    #[inline]
    pub fn backoff(&self) -> RestartBackoff {
        RestartBackoff {
            min: self.min_restart_delay,
            max: self.max_restart_delay,
            threshold: self.threshold,
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `threshold = 1s`
    /// - `min_restart_delay = 1s`
    /// - `max_restart_delay = 3600s` (1h)
    /// - `kill_time = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(1),
            min_restart_delay: Duration::from_secs(1),
            max_restart_delay: Duration::from_secs(3600),
            kill_time: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}
