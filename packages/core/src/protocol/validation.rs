// Валидация входящих конвертов до любой криптографии

use crate::config::Config;
use crate::protocol::messages::EncryptedMessage;
use crate::utils::b64;
use crate::utils::error::{E2eeError, Result};

/// Декодированные бинарные поля конверта
#[derive(Debug)]
pub struct DecodedEnvelope {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
    pub signature: Vec<u8>,
    pub ephemeral_public_key: Vec<u8>,
}

/// Проверить адресацию и timestamp
pub fn validate_envelope(msg: &EncryptedMessage, config: &Config, now_millis: i64) -> Result<()> {
    if msg.sender_user_id.is_empty() || msg.recipient_user_id.is_empty() {
        return Err(E2eeError::InvalidInput(
            "Envelope sender and recipient cannot be empty".to_string(),
        ));
    }

    if msg.timestamp > now_millis.saturating_add(config.max_clock_skew_ms) {
        return Err(E2eeError::InvalidInput(
            "Message timestamp is too far in the future".to_string(),
        ));
    }

    Ok(())
}

/// Декодировать бинарные поля.
///
/// Ошибки подписи → `SignatureInvalid`, ошибки ciphertext/IV → `DecryptionFailed`,
/// битый ephemeral key → `InvalidInput`.
pub fn decode_envelope(msg: &EncryptedMessage, config: &Config) -> Result<DecodedEnvelope> {
    let signature = b64::decode_exact(&msg.signature, config.signature_size)
        .map_err(|_| E2eeError::SignatureInvalid)?;

    let ciphertext = b64::decode(&msg.encrypted_content)
        .map_err(|e| E2eeError::DecryptionFailed(format!("ciphertext: {}", e)))?;
    if ciphertext.len() < config.tag_length {
        return Err(E2eeError::DecryptionFailed(
            "ciphertext shorter than authentication tag".to_string(),
        ));
    }

    let iv = b64::decode_exact(&msg.iv, config.nonce_length)
        .map_err(|e| E2eeError::DecryptionFailed(format!("iv: {}", e)))?;

    let ephemeral_public_key = b64::decode_exact(&msg.ephemeral_public_key, config.public_key_size)
        .map_err(|e| E2eeError::InvalidInput(format!("ephemeral public key: {}", e)))?;

    Ok(DecodedEnvelope {
        ciphertext,
        iv,
        signature,
        ephemeral_public_key,
    })
}
