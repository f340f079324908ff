//! Error types used by the procvisor runtime.
//!
//! This module defines three error enums:
//!
//! - [`SupervisorError`] — caller-facing errors from supervisor operations.
//! - [`SpawnError`] — a child process could not be launched.
//! - [`SignalError`] — signal delivery to a child process failed.
//!
//! Process-level failures (crashes, spawn failures, signal races) are never
//! surfaced through these types on the asynchronous exit path; they are
//! absorbed into the restart/backoff cycle and observable only through
//! events. Only registry misuse (duplicate or unknown names) and a
//! shut-down supervisor loop raise errors to the caller.

use thiserror::Error;

/// # Errors returned by supervisor operations.
///
/// These are caller errors: they are returned synchronously from
/// [`SupervisorHandle`](crate::SupervisorHandle) calls and never recovered
/// internally.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// A process with this name is already registered.
    #[error("process {name:?} is already registered; remove it first")]
    DuplicateName {
        /// The offending process name.
        name: String,
    },

    /// No process with this name is registered.
    #[error("unrecognized process name: {name:?}")]
    UnknownName {
        /// The offending process name.
        name: String,
    },

    /// The supervisor loop has shut down and no longer accepts commands.
    #[error("supervisor is no longer running")]
    Closed,
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use procvisor::SupervisorError;
    ///
    /// let err = SupervisorError::DuplicateName { name: "web".into() };
    /// assert_eq!(err.as_label(), "duplicate_name");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::DuplicateName { .. } => "duplicate_name",
            SupervisorError::UnknownName { .. } => "unknown_name",
            SupervisorError::Closed => "supervisor_closed",
        }
    }
}

/// # Errors from launching a child process.
///
/// Returned by [`Spawner::spawn`](crate::Spawner::spawn) when the OS refuses
/// to start the child (missing executable, permission denied, ...). The
/// supervisor treats a spawn failure as an instant exit: it follows the same
/// backoff path as a crash and is never returned to the caller of
/// `add_process`/`start_process`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The OS spawn primitive failed before the child started.
    #[error("failed to launch {command:?}: {source}")]
    Launch {
        /// The executable that could not be launched.
        command: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

/// # Errors from delivering a signal to a child process.
///
/// [`SignalError::AlreadyExited`] is an expected race: the process died
/// between the signal being sent and the exit being observed. Callers inside
/// the supervisor swallow it everywhere.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignalError {
    /// The process has already exited; nothing to signal. Benign.
    #[error("process has already exited")]
    AlreadyExited,

    /// The OS rejected the signal for another reason.
    #[error("signal delivery failed: errno {errno}")]
    Os {
        /// Raw OS errno.
        errno: i32,
    },
}
