//! Pluggable value serialization
//!
//! Values are turned into bytes before they reach the wire and decoded on
//! the way back. The codec is injected into the store at construction, so
//! swapping the wire format never touches the command logic.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{KvError, KvResult};

/// Encode/decode strategy for stored values.
pub trait ValueCodec: Send + Sync {
    /// Encode a value into the bytes written to Redis
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> KvResult<Vec<u8>>;

    /// Decode bytes read from Redis back into a value
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> KvResult<T>;
}

/// JSON wire format, the default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> KvResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| KvError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> KvResult<T> {
        serde_json::from_slice(bytes).map_err(|e| KvError::Decode(e.to_string()))
    }
}
