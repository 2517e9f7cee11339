//! Core types shared by the registry, dispatcher and conversation driver

mod message;
mod tool;
mod completion;
mod cancellation;

pub use message::{ChatMessage, MessageRole};
pub use tool::{ToolCall, ToolDescriptor, ToolFailure, ToolOutcome};
pub use completion::AssistantChoice;
pub use cancellation::CancellationToken;
