use serde::de::DeserializeOwned;

use crate::error::BoxError;

/// Turns raw frame bytes into a typed value.
///
/// The decoder never calls `serde_json` directly, so the JSON backend can be
/// swapped without touching the framing logic.
pub trait Unmarshaler: Send + Sync {
    fn unmarshal<D: DeserializeOwned>(&self, bytes: &[u8]) -> Result<D, BoxError>;
}

/// `serde_json` backed [`Unmarshaler`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonUnmarshaler;

impl Unmarshaler for JsonUnmarshaler {
    fn unmarshal<D: DeserializeOwned>(&self, bytes: &[u8]) -> Result<D, BoxError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
