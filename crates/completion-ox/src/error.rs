use completion_ox_common::{ApiError, ErrorResponse, StreamError};
use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

/// Errors that can occur when opening or reading a completion stream
#[derive(Debug, Error)]
pub enum CompletionError {
    /// HTTP client errors
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// Errors while decoding an open stream
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Error object returned with a non-success status
    #[error("API error (HTTP {status}): {error}")]
    Api { status: u16, error: ApiError },

    /// Non-success status without a recognizable error body
    #[error("Unexpected response from API: {0}")]
    UnexpectedResponse(String),

    /// Missing API key
    #[error("Missing API key")]
    MissingApiKey,

    /// The model cannot be used with the requested endpoint
    #[error("Model {model} is not supported by the {endpoint} endpoint")]
    InvalidModel { model: String, endpoint: String },
}

impl CompletionError {
    /// Error object reported by the server, whether in the body of a failed
    /// response or inside an open stream
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            CompletionError::Api { error, .. }
            | CompletionError::Stream(StreamError::UpstreamReported(error)) => Some(error),
            _ => None,
        }
    }
}

impl Serialize for CompletionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CompletionError::ReqwestError(e) => {
                let mut state = serializer.serialize_struct("CompletionError", 2)?;
                state.serialize_field("type", "ReqwestError")?;
                state.serialize_field("error", &e.to_string())?;
                state.end()
            }
            CompletionError::Stream(StreamError::UpstreamReported(error)) => {
                let mut state = serializer.serialize_struct("CompletionError", 2)?;
                state.serialize_field("type", "UpstreamReported")?;
                state.serialize_field("error", error)?;
                state.end()
            }
            CompletionError::Stream(e) => {
                let mut state = serializer.serialize_struct("CompletionError", 2)?;
                state.serialize_field("type", "Stream")?;
                state.serialize_field("error", &e.to_string())?;
                state.end()
            }
            CompletionError::Api { status, error } => {
                let mut state = serializer.serialize_struct("CompletionError", 3)?;
                state.serialize_field("type", "Api")?;
                state.serialize_field("status", status)?;
                state.serialize_field("error", error)?;
                state.end()
            }
            CompletionError::UnexpectedResponse(response) => {
                let mut state = serializer.serialize_struct("CompletionError", 2)?;
                state.serialize_field("type", "UnexpectedResponse")?;
                state.serialize_field("response", response)?;
                state.end()
            }
            CompletionError::MissingApiKey => {
                let mut state = serializer.serialize_struct("CompletionError", 1)?;
                state.serialize_field("type", "MissingApiKey")?;
                state.end()
            }
            CompletionError::InvalidModel { model, endpoint } => {
                let mut state = serializer.serialize_struct("CompletionError", 3)?;
                state.serialize_field("type", "InvalidModel")?;
                state.serialize_field("model", model)?;
                state.serialize_field("endpoint", endpoint)?;
                state.end()
            }
        }
    }
}

/// Parse the body of a non-success response
pub(crate) fn parse_error_response(status: reqwest::StatusCode, bytes: &[u8]) -> CompletionError {
    match serde_json::from_slice::<ErrorResponse>(bytes) {
        Ok(ErrorResponse { error: Some(error) }) => CompletionError::Api {
            status: status.as_u16(),
            error,
        },
        _ => CompletionError::UnexpectedResponse(format!(
            "HTTP status {}: {}",
            status.as_u16(),
            String::from_utf8_lossy(bytes)
        )),
    }
}
