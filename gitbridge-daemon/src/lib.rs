//! Polling scheduler: scan the watched root, sleep, repeat until shutdown.

mod error;
mod runtime;

pub use error::DaemonError;
pub use runtime::{init_tracing, run, start_blocking, LogFormat};
