//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! Captured process output is rendered exactly as `[name] <line>`; lifecycle
//! events use short bracketed tags.
//!
//! ## Output format
//! ```text
//! [web] listening on :8080
//! [started] process=web pid=4242
//! [exited] process=web reason="exit code 1"
//! [restart] process=web delay_ms=2000
//! [stopping] process=web
//! [kill] process=web
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscriber;

/// Stdout logging subscriber.
///
/// Useful for development and small deployments; implement a custom
/// [`Subscriber`] for structured logging or metrics collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn on_event(&self, e: &Event) {
        let process = e.process.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::ProcessOutput => {
                println!("[{process}] {}", e.line.as_deref().unwrap_or_default());
            }
            EventKind::SupervisorStarted => {
                println!("[supervisor-started]");
            }
            EventKind::SupervisorStopped => {
                println!("[supervisor-stopped]");
            }
            EventKind::ProcessAdded => {
                println!("[added] process={process}");
            }
            EventKind::ProcessRemoved => {
                println!("[removed] process={process}");
            }
            EventKind::ProcessStarted => match e.pid {
                Some(pid) => println!("[started] process={process} pid={pid}"),
                None => println!("[started] process={process}"),
            },
            EventKind::ProcessExited => {
                println!(
                    "[exited] process={process} reason={:?}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::SpawnFailed => {
                println!(
                    "[spawn-failed] process={process} err={:?}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::RestartScheduled => {
                println!(
                    "[restart] process={process} delay_ms={}",
                    e.delay_ms.unwrap_or_default()
                );
            }
            EventKind::StopRequested => match e.reason.as_deref() {
                Some(err) => println!("[stopping] process={process} err={err:?}"),
                None => println!("[stopping] process={process}"),
            },
            EventKind::KillEscalated => {
                println!("[kill] process={process}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
