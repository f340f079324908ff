//! Runtime core: the supervisor actor and its command front-end.
//!
//! Internal modules:
//! - [`supervisor`]: the single-threaded process-lifecycle state machine;
//! - [`handle`]: the cloneable command handle callers talk through.

mod handle;
mod supervisor;

pub(crate) use handle::Command;
pub use handle::SupervisorHandle;
pub use supervisor::Supervisor;
