//! Logging abstractions
//!
//! Loggers are injected as `Arc<dyn Logger>`; nothing in the crate logs
//! through a global.

mod traits;
mod noop;
mod console;
mod memory;

pub use traits::{Logger, LogLevel, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::MemoryLogger;
