//! Call data and return data encoding (bincode)

use crate::error::{ErrorKind, Revert};
use serde::{de::DeserializeOwned, Serialize};

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, Revert> {
    bincode::serialize(value)
        .map_err(|e| Revert::new(ErrorKind::InvalidCallData, format!("encode failed: {}", e)))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Revert> {
    bincode::deserialize(bytes)
        .map_err(|e| Revert::new(ErrorKind::InvalidCallData, format!("decode failed: {}", e)))
}
