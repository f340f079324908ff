//! # The spawn seam: launching children and reporting their exits.
//!
//! The supervisor never touches the OS directly; it goes through the
//! [`Spawner`] trait, which makes the whole state machine testable with a
//! scripted fake.
//!
//! ## Contract
//! ```text
//! Spawner::spawn(spec, logger, notifier)
//!   Ok(handle):
//!     - the spawner owns the child from here on;
//!     - both standard streams are fed into `logger`, which is flushed once
//!       the streams end;
//!     - `notifier` is consumed exactly once when the child terminates, by
//!       any cause;
//!     - `handle.signal(..)` stays valid and reports AlreadyExited once the
//!       process is gone.
//!   Err(_):
//!     - nothing was spawned and `notifier` has NOT been used; the
//!       supervisor synthesizes the instant-exit notice itself.
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{SignalError, SpawnError};
use crate::process::{LineLogger, ProcessSpec};

#[cfg(unix)]
mod os;

#[cfg(unix)]
pub use os::OsSpawner;

/// Signals the supervisor delivers to children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Graceful termination request (SIGTERM).
    Term,
    /// Unmaskable kill (SIGKILL), the stop escalation.
    Kill,
}

/// Why a child process terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// Clean or unclean exit with a status code.
    Exited {
        /// The process exit code.
        code: i32,
    },
    /// Terminated by a signal.
    Signaled {
        /// The raw signal number.
        signal: i32,
    },
    /// The OS refused to spawn the process in the first place.
    SpawnFailed,
    /// The exit status could not be determined.
    Unknown,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Exited { code } => write!(f, "exit code {code}"),
            ExitReason::Signaled { signal } => write!(f, "signal {signal}"),
            ExitReason::SpawnFailed => write!(f, "spawn failed"),
            ExitReason::Unknown => write!(f, "unknown"),
        }
    }
}

/// Exit notification delivered into the supervisor loop.
#[derive(Debug)]
pub struct ExitNotice {
    /// Name of the process that terminated.
    pub name: Arc<str>,
    /// Why it terminated.
    pub reason: ExitReason,
}

/// One-shot reporter for a child's termination.
///
/// Handed to the [`Spawner`] alongside the spec; consuming [`notify`]
/// guarantees at most one exit notice per spawn.
///
/// [`notify`]: ExitNotifier::notify
#[derive(Debug)]
pub struct ExitNotifier {
    name: Arc<str>,
    tx: mpsc::UnboundedSender<ExitNotice>,
}

impl ExitNotifier {
    pub(crate) fn new(name: Arc<str>, tx: mpsc::UnboundedSender<ExitNotice>) -> Self {
        Self { name, tx }
    }

    /// The process this notifier reports for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports the termination. Consumes the notifier: exactly once.
    pub fn notify(self, reason: ExitReason) {
        // The supervisor may already be gone during teardown; that is fine.
        let _ = self.tx.send(ExitNotice {
            name: self.name,
            reason,
        });
    }
}

/// Runtime representation of one spawned OS process.
pub trait ProcessHandle: Send + Sync + fmt::Debug {
    /// The OS process id, when known.
    fn pid(&self) -> Option<u32>;

    /// Delivers a signal to the process.
    ///
    /// Returns [`SignalError::AlreadyExited`] when the process is no longer
    /// running; this is an expected, non-fatal race.
    fn signal(&self, sig: Signal) -> Result<(), SignalError>;
}

/// The OS process-spawning collaborator.
///
/// Injected into the supervisor at construction, which enables deterministic
/// testing with fake spawners and the paused tokio clock.
pub trait Spawner: Send + Sync + 'static {
    /// Launches a child process per `spec`.
    ///
    /// See the module docs for the ownership contract around `logger` and
    /// `notifier`.
    fn spawn(
        &self,
        spec: &ProcessSpec,
        logger: LineLogger,
        notifier: ExitNotifier,
    ) -> Result<Box<dyn ProcessHandle>, SpawnError>;
}
