// Сериализация payload (JSON)

use crate::utils::error::{E2eeError, Result};
use serde::{de::DeserializeOwned, Serialize};

pub fn to_bytes<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(data)
        .map_err(|e| E2eeError::SerializationError(format!("Serialization failed: {}", e)))
}

pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| E2eeError::SerializationError(format!("Deserialization failed: {}", e)))
}
