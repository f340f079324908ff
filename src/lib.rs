//! # procvisor
//!
//! **Procvisor** is a library for supervising OS processes: it keeps a set
//! of named child processes running, restarts them when they die (with
//! exponential backoff against crash loops), captures their output line by
//! line, and escalates graceful stops to forced kills.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//!     │  ProcessSpec  │   │  ProcessSpec  │   │  ProcessSpec  │
//!     │ ("web", argv) │   │ ("worker",..) │   │ ("cron", ..)  │
//!     └──────┬────────┘   └──────┬────────┘   └──────┬────────┘
//!            ▼                   ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (single-threaded actor loop)                          │
//! │  - table: HashMap<name, entry>  (spec, delay, handle, timers)     │
//! │  - RestartBackoff (crash-loop dampener)                           │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬────────────────────────────────────────────────────┬──────┘
//!        │ Spawner::spawn(spec, logger, notifier)             │
//!        ▼                                                    │
//!     ┌───────────────┐   ┌───────────────┐                   │
//!     │  OS child     │   │  OS child     │    Events:        │
//!     │  stdout ──┐   │   │  stdout ──┐   │    - ProcessStarted
//!     │  stderr ──┤   │   │  stderr ──┤   │    - ProcessExited
//!     └───────────┼───┘   └───────────┼───┘    - RestartScheduled
//!                 ▼                   ▼        - KillEscalated
//!            LineLogger          LineLogger    - ProcessOutput ...
//!                 │                   │             │
//!                 ▼                   ▼             ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                   (capacity: Config::bus_capacity)                │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber listener   │
//!                       │    (in Supervisor)     │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                          ┌────────┼────────┐
//!                          ▼        ▼        ▼
//!                      LogWriter  metrics  custom...
//! ```
//!
//! ### Lifecycle
//! ```text
//! add_process ──► registered ── start() ──► spawned
//!
//! on exit:
//!   ├─ ran < threshold ──► restart after delay, delay = min(delay*2, max)
//!   └─ ran ≥ threshold ──► restart now,         delay = min
//!   (delays are cancelled by stop(), remove_process, shutdown)
//!
//! stop_process:
//!   ├─► TERM now
//!   ├─► exit within kill_time ──► done (escalation cancelled)
//!   └─► still alive after kill_time ──► KILL
//! ```
//!
//! ## Features
//! | Area               | Description                                                   | Key types / traits                  |
//! |--------------------|---------------------------------------------------------------|-------------------------------------|
//! | **Supervision**    | Keep named processes alive; restart, stop, remove them.       | [`Supervisor`], [`SupervisorHandle`]|
//! | **Backoff**        | Exponential restart delays, reset after a healthy run.        | [`RestartBackoff`]                  |
//! | **Output capture** | Child stdout/stderr split into tagged lines.                  | [`LineLogger`]                      |
//! | **Events**         | Observe every lifecycle transition and output line.           | [`Event`], [`Bus`], [`Subscriber`]  |
//! | **Spawning**       | Pluggable process launcher (fakeable in tests).               | [`Spawner`], [`OsSpawner`]          |
//! | **Errors**         | Typed errors for registry and signal operations.              | [`SupervisorError`], [`SpawnError`] |
//! | **Configuration**  | Centralized timing knobs.                                     | [`Config`]                          |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use procvisor::{Config, LogWriter, OsSpawner, ProcessSpec, Subscriber, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscriber>> = vec![Arc::new(LogWriter)];
//!     let sup = Supervisor::new(Config::default(), Arc::new(OsSpawner), subs);
//!     let handle = sup.handle();
//!     let loop_task = tokio::spawn(sup.run());
//!
//!     handle
//!         .add_process("web", ProcessSpec::new("/usr/bin/myserver").with_args(["--port", "8080"]))
//!         .await?;
//!     handle.start().await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     handle.shutdown().await?;
//!     loop_task.await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod process;
mod spawn;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Supervisor, SupervisorHandle};
pub use error::{SignalError, SpawnError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use policies::{RestartBackoff, RestartDecision};
pub use process::{LineLogger, ProcessSpec};
pub use spawn::{ExitNotice, ExitNotifier, ExitReason, ProcessHandle, Signal, Spawner};
pub use subscribers::{LogWriter, Subscriber, SubscriberSet};

#[cfg(unix)]
pub use spawn::OsSpawner;
