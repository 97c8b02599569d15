// Типы ошибок операций E2EE

use crate::crypto::peer_keys::KeyPurpose;
use crate::error::CryptoError;
use thiserror::Error;

/// Ошибки, которые видит вызывающий код (transport, UI, account layer).
///
/// Все ошибки терминальны для операции: автоматических повторов нет,
/// и фолбэка на незашифрованный путь тоже нет.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum E2eeError {
    /// Платформа не предоставляет нужные примитивы. Фатально при старте.
    #[error("Cryptographic primitives unavailable: {0}")]
    CryptoUnsupported(String),

    #[error("No {purpose} key found for identity '{identity}'")]
    KeyNotFound { identity: String, purpose: KeyPurpose },

    /// Подпись проверяется до расшифровки.
    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Recipient mismatch: expected '{expected}', payload addressed to '{actual}'")]
    RecipientMismatch { expected: String, actual: String },

    #[error("Sender mismatch: envelope says '{envelope}', payload says '{payload}'")]
    SenderMismatch { envelope: String, payload: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Cryptographic operation '{0}' timed out")]
    Timeout(&'static str),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<CryptoError> for E2eeError {
    fn from(error: CryptoError) -> Self {
        match error {
            CryptoError::SignatureVerificationError(_) => E2eeError::SignatureInvalid,
            CryptoError::AeadDecryptionError(msg) => E2eeError::DecryptionFailed(msg),
            CryptoError::InvalidInputError(msg) => E2eeError::InvalidInput(msg),
            CryptoError::SelfTestError(msg) => E2eeError::CryptoUnsupported(msg),
            other => E2eeError::InternalError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for E2eeError {
    fn from(error: serde_json::Error) -> Self {
        E2eeError::SerializationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, E2eeError>;
