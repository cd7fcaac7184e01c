use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Boxed error returned by pluggable strategies such as [`crate::Unmarshaler`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while decoding a streaming response body
#[derive(Error, Debug)]
pub enum StreamError {
    /// Reading from the underlying transport failed
    #[error("stream transport error: {0}")]
    Transport(#[source] std::io::Error),

    /// The server reported an error inside the response body
    #[error("upstream error: {0}")]
    UpstreamReported(ApiError),

    /// Too many consecutive non-data lines were received in one call
    #[error("stream has sent too many empty messages (limit {limit})")]
    TooManyEmptyMessages { limit: usize },

    /// A `data:` frame did not decode into the expected payload
    #[error("malformed stream payload: {0}")]
    MalformedPayload(#[source] BoxError),

    /// The error accumulator refused to store more bytes
    #[error("error accumulator write failed: {0}")]
    AccumulatorWrite(#[source] std::io::Error),
}

/// Envelope of a server-reported error: `{"error": {...}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<ApiError>,
}

/// Error object reported by the API, either as an HTTP error body or in-band
#[derive(Error, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    /// Human readable message; arrays of messages are joined with `", "`
    #[serde(default, deserialize_with = "deserialize_message")]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

/// Error codes arrive as strings from OpenAI and as integers from some
/// compatible backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Number(i64),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Text(code) => f.write_str(code),
            ErrorCode::Number(code) => write!(f, "{code}"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMessage {
    Text(String),
    Parts(Vec<String>),
}

fn deserialize_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawMessage>::deserialize(deserializer)? {
        Some(RawMessage::Text(message)) => message,
        Some(RawMessage::Parts(parts)) => parts.join(", "),
        None => String::new(),
    })
}
