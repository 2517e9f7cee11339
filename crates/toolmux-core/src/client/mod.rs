//! Conversation driver and the client surface around it

mod error;
mod driver;
mod transcript;
mod chat_client;

pub use error::{ClientError, ClientResult, ConnectFailure};
pub use driver::{follow_up_turn, ConversationDriver};
pub use transcript::{Sender, Transcript, TranscriptEntry};
pub use chat_client::{ConnectReport, McpChatClient};
