//! Process specifications and output capture.
//!
//! - [`ProcessSpec`]: immutable launch parameters for a named process;
//! - [`LineLogger`]: turns a child's raw output bytes into tagged,
//!   newline-delimited [`ProcessOutput`](crate::EventKind::ProcessOutput)
//!   events.

mod logger;
mod spec;

pub use logger::LineLogger;
pub use spec::ProcessSpec;
