// Типы сообщений протокола
// Соответствуют JSON-формату, который передаётся через transport layer

use serde::{Deserialize, Serialize};

/// Зашифрованный конверт. Единственное, что уходит в transport layer.
///
/// Все бинарные поля закодированы в base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedMessage {
    /// AEAD ciphertext + tag
    pub encrypted_content: String,
    /// 96-bit IV
    pub iv: String,
    /// X25519 ephemeral public key (32 bytes). В деривацию ключа не входит.
    pub ephemeral_public_key: String,
    /// Ed25519 подпись над байтами ciphertext
    pub signature: String,
    pub sender_user_id: String,
    pub recipient_user_id: String,
    /// Unix millis
    pub timestamp: i64,
    /// Версия shared secret отправителя
    pub key_version: String,
}

/// Открытое содержимое, живёт только внутри encrypt/decrypt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub content: String,
    pub sender_user_id: String,
    pub recipient_user_id: String,
    /// Unix millis
    pub timestamp: i64,
    /// UUID v4
    pub message_id: String,
}
