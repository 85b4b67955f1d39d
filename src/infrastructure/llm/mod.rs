//! OpenAI-compatible chat completion adapter for the [`ChatClient`] port.
//!
//! [`ChatClient`]: crate::domain::ports::ChatClient

pub mod client;
pub mod retry;
pub mod types;

pub use client::OpenAiChatClient;
pub use retry::RetryPolicy;
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat};
