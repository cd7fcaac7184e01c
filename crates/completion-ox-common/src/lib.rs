#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Incremental decoder for streaming completion responses
//!
//! This crate turns a live, chunked HTTP body of `data: <json>` lines into
//! typed messages, one per pull, and recovers error objects that the server
//! reports inside the body instead of through the status code.

pub mod accumulator;
pub mod error;
pub mod line_source;
pub mod streaming;
pub mod unmarshal;

pub use accumulator::{BufferAccumulator, ErrorAccumulator};
pub use error::{ApiError, BoxError, ErrorCode, ErrorResponse, StreamError};
pub use line_source::{BufLineSource, LineSource, ResponseLineSource};
pub use streaming::{DEFAULT_EMPTY_MESSAGES_LIMIT, Framing, StreamReader, Streamable};
pub use unmarshal::{JsonUnmarshaler, Unmarshaler};

/// Re-export common types for convenience
pub use async_trait::async_trait;
pub use futures_util::stream::BoxStream;
