// Wire format
// JSON — основной формат; MessagePack — компактный вариант для бинарных транспортов

use crate::protocol::messages::EncryptedMessage;
use crate::utils::error::{E2eeError, Result};
use rmp_serde::{Deserializer, Serializer};
use serde::{Deserialize, Serialize};

/// Сериализовать конверт в JSON
pub fn to_json(message: &EncryptedMessage) -> Result<String> {
    serde_json::to_string(message).map_err(E2eeError::from)
}

/// Десериализовать конверт из JSON
pub fn from_json(json: &str) -> Result<EncryptedMessage> {
    serde_json::from_str(json)
        .map_err(|e| E2eeError::SerializationError(format!("Invalid envelope JSON: {}", e)))
}

/// Упаковать конверт в MessagePack (с именами полей, как в JSON)
pub fn pack(message: &EncryptedMessage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    message
        .serialize(&mut Serializer::new(&mut buffer).with_struct_map())
        .map_err(|e| E2eeError::SerializationError(format!("MessagePack pack error: {}", e)))?;
    Ok(buffer)
}

/// Распаковать MessagePack в конверт
pub fn unpack(data: &[u8]) -> Result<EncryptedMessage> {
    let mut deserializer = Deserializer::new(data);
    EncryptedMessage::deserialize(&mut deserializer)
        .map_err(|e| E2eeError::SerializationError(format!("MessagePack unpack error: {}", e)))
}
