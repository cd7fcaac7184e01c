//! Streaming completion client for OpenAI-compatible APIs
//!
//! This crate opens streamed chat and text completions and hands back a
//! pull-based [`StreamReader`] that yields one typed chunk per call:
//! - Chat completion deltas and legacy text completion chunks
//! - Plain-text streaming bodies, one chunk per character
//! - Error objects reported inside the stream surfaced as typed errors
//!
//! # Example
//!
//! ```rust,no_run
//! use completion_ox::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::from_env()?;
//!
//!     let request = client
//!         .chat()
//!         .model("gpt-4o-mini")
//!         .user_message("Hello, world!")
//!         .build();
//!
//!     let mut stream = client.create_chat_completion_stream(&request).await?;
//!     while let Some(chunk) = stream.recv().await? {
//!         print!("{}", chunk.content().unwrap_or_default());
//!     }
//!     stream.close().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod message;
pub mod model;
pub mod request;
pub mod response;
pub mod stream;
pub mod usage;

pub use client::{Client, RequestOptions};
pub use error::CompletionError;
pub use message::{ChatMessage, FunctionCall, Role, ToolCall};
pub use model::{Endpoint, Model};
pub use request::{ChatCompletionRequest, CompletionRequest, StreamUsageOptions};
pub use response::{
    ChatCompletionStreamChoice, ChatCompletionStreamChoiceDelta, ChatCompletionStreamResponse,
    CompletionChoice, CompletionResponse, ContentFilterResults, FilterResult, FinishReason,
    PromptAnnotation,
};
pub use stream::{ChatCompletionStream, CompletionStream};
pub use usage::Usage;

// Re-export the decoder types callers interact with
pub use completion_ox_common::{ApiError, ErrorCode, Framing, StreamError, StreamReader};
