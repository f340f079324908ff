//! Restart policies.
//!
//! The only policy in this crate is [`RestartBackoff`]: the crash-loop
//! dampener that decides when a dead process comes back.

mod backoff;

pub use backoff::{RestartBackoff, RestartDecision};
