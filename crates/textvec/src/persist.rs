//! Bincode encoding for anything the crate makes serializable.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, VectorizeError};

/// Encode with the bincode standard config.
pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| VectorizeError::Serialization(e.to_string()))
}

/// Decode bytes written by [`to_bytes`]. Malformed input is a
/// [`VectorizeError::Serialization`].
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| VectorizeError::Serialization(e.to_string()))?;
    Ok(value)
}
