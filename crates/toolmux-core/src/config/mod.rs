//! Client configuration
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigProvider`: In-memory for testing and embedding
//! - `FileConfigProvider`: YAML file-based (user level or explicit path)
//! - `EnvSettings`: environment overlay for chat endpoint settings

mod traits;
mod server;
mod settings;
mod memory;
mod file;
mod env;

pub use traits::{ConfigProvider, ConfigError, ConfigResult};
pub use server::{HostEnvironment, ServerDescriptor, TransportKind};
pub use settings::{ChatSettings, ClientConfig, DriverSettings, DEFAULT_MAX_DEPTH};
pub use memory::MemoryConfigProvider;
pub use file::FileConfigProvider;
pub use env::EnvSettings;
