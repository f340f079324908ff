//! # Event subscribers for the procvisor runtime.
//!
//! Provides the [`Subscriber`] trait, the [`SubscriberSet`] fan-out, and the
//! built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► supervisor listener
//!                                              │
//!                                              ▼
//!                                        SubscriberSet
//!                                     ┌────────┼────────┐
//!                                     ▼        ▼        ▼
//!                                 LogWriter  Metrics  Custom...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use async_trait::async_trait;
//! use procvisor::{Event, EventKind, Subscriber};
//!
//! struct CrashCounter;
//!
//! #[async_trait]
//! impl Subscriber for CrashCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ProcessExited {
//!             // increment a counter...
//!         }
//!     }
//! }
//! ```

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscriber;
