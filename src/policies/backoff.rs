//! # Restart backoff with crash-loop dampening.
//!
//! [`RestartBackoff`] decides, after a process exit, when the process should
//! be restarted and what the backoff delay becomes for future exits. It is
//! parameterized by:
//! - [`RestartBackoff::min`] the initial (and floor) restart delay;
//! - [`RestartBackoff::max`] the delay cap;
//! - [`RestartBackoff::threshold`] the minimum healthy run time.
//!
//! ## The law
//! The supervisor carries one current `delay` per process, initialized to
//! `min`. On exit:
//!
//! ```text
//! ran_for <  threshold  (instant death / crash):
//!     restart after `delay`, then delay = min(delay * 2, max)
//!
//! ran_for >= threshold  (healthy run):
//!     restart immediately, delay = min
//! ```
//!
//! The doubling applies to *future* restarts, not the one just scheduled
//! (delay-then-double): with `min = 1s` three instant deaths in a row are
//! restarted after 1s, 2s, 4s, and the stored delay becomes 8s. Any run
//! reaching `threshold` resets the sequence.
//!
//! The decision is a pure function, which keeps the timing-sensitive part of
//! the supervisor trivially unit-testable.

use std::time::Duration;

/// Crash-loop restart backoff: delay-then-double with reset on success.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestartBackoff {
    /// Initial and minimum restart delay.
    pub min: Duration,
    /// Maximum restart delay (the doubling is capped here).
    pub max: Duration,
    /// Minimum run time for an exit to count as healthy.
    pub threshold: Duration,
}

/// Outcome of one exit: when to restart, and the backoff carried forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestartDecision {
    /// Delay before the restart of the process that just exited.
    pub restart_in: Duration,
    /// The backoff delay to store for the next exit.
    pub next_delay: Duration,
}

impl Default for RestartBackoff {
    /// Returns the policy with `min = 1s`, `max = 3600s`, `threshold = 1s`.
    fn default() -> Self {
        Self {
            min: Duration::from_secs(1),
            max: Duration::from_secs(3600),
            threshold: Duration::from_secs(1),
        }
    }
}

impl RestartBackoff {
    /// Decides the restart schedule after an exit.
    ///
    /// `current` is the delay stored for this process (starts at `min`);
    /// `ran_for` is how long the process lived before exiting.
    pub fn decide(&self, current: Duration, ran_for: Duration) -> RestartDecision {
        if ran_for < self.threshold {
            // Died too fast: back off. The just-scheduled restart uses the
            // delay recorded before doubling.
            RestartDecision {
                restart_in: current,
                next_delay: (current * 2).min(self.max),
            }
        } else {
            RestartDecision {
                restart_in: Duration::ZERO,
                next_delay: self.min,
            }
        }
    }
}
