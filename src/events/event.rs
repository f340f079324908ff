//! # Runtime events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Registry events**: processes added to / removed from the supervisor;
//! - **Lifecycle events**: spawn, exit, restart scheduling, stop escalation;
//! - **Output events**: captured lines from a child's stdout/stderr.
//!
//! The [`Event`] struct carries the metadata for each kind: timestamp, a
//! globally monotonic sequence number, process name, exit reason, restart
//! delay, pid, and output line.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore exact order when events are consumed
//! out of band.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Supervisor state ===
    /// The supervisor became active and is starting registered processes.
    SupervisorStarted,

    /// The supervisor became inactive; restarts are cancelled and live
    /// processes are being stopped.
    SupervisorStopped,

    // === Registry events ===
    /// A process specification was registered.
    ///
    /// Sets: `process`.
    ProcessAdded,

    /// A process was unregistered; its timers are cancelled and its runtime
    /// state discarded.
    ///
    /// Sets: `process`.
    ProcessRemoved,

    // === Lifecycle events ===
    /// A child process was spawned.
    ///
    /// Sets: `process`, `pid` (when known).
    ProcessStarted,

    /// A child process exited (by any cause).
    ///
    /// Sets: `process`, `reason`.
    ProcessExited,

    /// The OS refused to spawn the child; treated as an instant exit.
    ///
    /// Sets: `process`, `reason` (the spawn error).
    SpawnFailed,

    /// A restart was scheduled after an exit.
    ///
    /// Sets: `process`, `delay_ms` (zero for an immediate restart).
    RestartScheduled,

    /// TERM was delivered and the kill escalation timer armed.
    ///
    /// Sets: `process`; `reason` when signal delivery failed for a cause
    /// other than the process having already exited.
    StopRequested,

    /// The process ignored TERM for the full kill time and was KILL'd.
    ///
    /// Sets: `process`.
    KillEscalated,

    // === Output events ===
    /// One complete output line captured from the child.
    ///
    /// Sets: `process`, `line`.
    ProcessOutput,
}

/// A single runtime event with its metadata.
///
/// Constructed with [`Event::now`] and enriched through the `with_*`
/// builders; unset fields stay `None`.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Wall-clock timestamp of publication.
    pub at: SystemTime,
    /// Globally monotonic sequence number.
    pub seq: u64,
    /// The process this event concerns, if any.
    pub process: Option<Arc<str>>,
    /// Human-readable reason (exit status, spawn error, ...).
    pub reason: Option<Arc<str>>,
    /// Captured output line (for [`EventKind::ProcessOutput`]).
    pub line: Option<Arc<str>>,
    /// Restart delay in milliseconds (for [`EventKind::RestartScheduled`]).
    pub delay_ms: Option<u64>,
    /// OS process id, when known.
    pub pid: Option<u32>,
}

impl Event {
    /// Creates an event stamped with the current time and the next sequence
    /// number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            at: SystemTime::now(),
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            process: None,
            reason: None,
            line: None,
            delay_ms: None,
            pid: None,
        }
    }

    /// Attaches a process name.
    #[inline]
    pub fn with_process(mut self, process: impl Into<Arc<str>>) -> Self {
        self.process = Some(process.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a captured output line.
    #[inline]
    pub fn with_line(mut self, line: impl Into<Arc<str>>) -> Self {
        self.line = Some(line.into());
        self
    }

    /// Attaches a restart delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches an OS process id.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }
}
