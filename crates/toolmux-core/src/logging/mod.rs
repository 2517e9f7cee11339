//! Logging abstractions
//!
//! Components take an `Arc<dyn Logger>` so the host decides where output
//! goes: the console, nowhere, or an in-memory buffer for assertions.

mod traits;
mod noop;
mod console;
mod memory;

pub use traits::{LogLevel, Logger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::{LogRecord, MemoryLogger};
