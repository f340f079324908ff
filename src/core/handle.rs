//! # Command front-end for the supervisor loop.
//!
//! [`SupervisorHandle`] is the only way external callers interact with a
//! running [`Supervisor`](crate::Supervisor): every operation becomes a
//! [`Command`] message delivered into the single-threaded loop, and the
//! caller awaits the loop's acknowledgement. This keeps all per-process
//! state transitions strictly sequential; no caller ever mutates process or
//! timer state directly.

use tokio::sync::{mpsc, oneshot};

use crate::error::SupervisorError;
use crate::process::ProcessSpec;

/// Messages accepted by the supervisor loop.
pub(crate) enum Command {
    /// Register a process; start it if the supervisor is active.
    Add {
        name: String,
        spec: ProcessSpec,
        reply: oneshot::Sender<Result<(), SupervisorError>>,
    },
    /// Stop (best-effort) and unregister a process.
    Remove {
        name: String,
        reply: oneshot::Sender<Result<(), SupervisorError>>,
    },
    /// Mark the supervisor active and start everything registered.
    Activate { reply: oneshot::Sender<()> },
    /// Mark the supervisor inactive, cancel restarts, stop live processes.
    Deactivate { reply: oneshot::Sender<()> },
    /// Spawn one process now (no-op if already live or inactive).
    StartProcess {
        name: String,
        reply: oneshot::Sender<Result<(), SupervisorError>>,
    },
    /// TERM one process and arm the kill escalation.
    StopProcess {
        name: String,
        reply: oneshot::Sender<Result<(), SupervisorError>>,
    },
    /// TERM every registered process; the exit-driven restart path brings
    /// them back.
    RestartAll { reply: oneshot::Sender<()> },
    /// Deactivate and end the loop.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Cloneable handle to a running supervisor.
///
/// All methods are fallible with [`SupervisorError::Closed`] once the loop
/// has shut down.
#[derive(Clone)]
pub struct SupervisorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SupervisorHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    /// Registers a new process and starts it immediately if the supervisor
    /// is active.
    ///
    /// Fails with [`SupervisorError::DuplicateName`] if `name` is already
    /// registered.
    pub async fn add_process(
        &self,
        name: impl Into<String>,
        spec: ProcessSpec,
    ) -> Result<(), SupervisorError> {
        let name = name.into();
        self.request(|reply| Command::Add { name, spec, reply })
            .await?
    }

    /// Stops the named process (best-effort, without waiting for the exit)
    /// and removes it, cancelling any pending timers.
    ///
    /// Fails with [`SupervisorError::UnknownName`] if not registered.
    pub async fn remove_process(&self, name: impl Into<String>) -> Result<(), SupervisorError> {
        let name = name.into();
        self.request(|reply| Command::Remove { name, reply }).await?
    }

    /// Activates the supervisor: every registered process that is not
    /// already live is started.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        self.request(|reply| Command::Activate { reply }).await
    }

    /// Deactivates the supervisor: pending restarts are cancelled first (so
    /// nothing respawns after shutdown begins), then every live process is
    /// stopped.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        self.request(|reply| Command::Deactivate { reply }).await
    }

    /// Starts one process now.
    ///
    /// No-op if a live instance already exists (guards against the race
    /// between a restart timer and an explicit call) or if the supervisor is
    /// inactive. Fails with [`SupervisorError::UnknownName`] if not
    /// registered.
    pub async fn start_process(&self, name: impl Into<String>) -> Result<(), SupervisorError> {
        let name = name.into();
        self.request(|reply| Command::StartProcess { name, reply })
            .await?
    }

    /// Requests a graceful stop of one process: TERM now, KILL after the
    /// configured kill time if it has not exited by then.
    ///
    /// No-op if the process is not live. Fails with
    /// [`SupervisorError::UnknownName`] if not registered.
    pub async fn stop_process(&self, name: impl Into<String>) -> Result<(), SupervisorError> {
        let name = name.into();
        self.request(|reply| Command::StopProcess { name, reply })
            .await?
    }

    /// Stops every registered process; each one is relaunched through the
    /// normal exit-driven restart path.
    pub async fn restart_all(&self) -> Result<(), SupervisorError> {
        self.request(|reply| Command::RestartAll { reply }).await
    }

    /// Deactivates the supervisor and ends its loop. Dropping every handle
    /// has the same effect.
    pub async fn shutdown(&self) -> Result<(), SupervisorError> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SupervisorError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(build(tx))
            .map_err(|_| SupervisorError::Closed)?;
        rx.await.map_err(|_| SupervisorError::Closed)
    }
}
