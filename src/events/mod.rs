//! Runtime events and the bus that carries them.
//!
//! Everything observable about supervised processes flows through here:
//! lifecycle transitions, restart scheduling, stop escalation, and captured
//! output lines. The supervisor publishes; subscribers watch.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
