//! Message Codec
//!
//! Собирает и разбирает AEAD-конверт.
//!
//! ## Encrypt
//! ```text
//! payload (JSON) ──AEAD(secret, iv)──► ciphertext ──sign(sender)──► signature
//!                                       + ephemeral public key (не входит в деривацию)
//! ```
//!
//! ## Decrypt
//! ```text
//! verify(signature, ciphertext) ──► AEAD-open ──► payload ──► проверка адресации
//! ```
//!
//! Подпись проверяется ДО расшифровки. Подписывается только ciphertext:
//! метаданные конверта не аутентифицированы, поэтому адресация сверяется с
//! payload после расшифровки.

use crate::config::Config;
use crate::crypto::provider::CryptoProvider;
use crate::crypto::secret_cache::SharedSecret;
use crate::protocol::messages::{EncryptedMessage, MessagePayload};
use crate::protocol::validation::DecodedEnvelope;
use crate::utils::error::{E2eeError, Result};
use crate::utils::{b64, serialization, uuid};
use std::marker::PhantomData;
use zeroize::Zeroizing;

pub struct MessageCodec<P: CryptoProvider> {
    config: Config,
    _phantom: PhantomData<P>,
}

impl<P: CryptoProvider> Clone for MessageCodec<P> {
    fn clone(&self) -> Self {
        Self::new(self.config.clone())
    }
}

impl<P: CryptoProvider> MessageCodec<P> {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            _phantom: PhantomData,
        }
    }

    /// Зашифровать и подписать `plaintext` от `sender` для `recipient`
    pub fn seal(
        &self,
        secret: &SharedSecret,
        signing_key: &[u8],
        sender: &str,
        recipient: &str,
        plaintext: &str,
        now_millis: i64,
    ) -> Result<EncryptedMessage> {
        let payload = MessagePayload {
            content: plaintext.to_string(),
            sender_user_id: sender.to_string(),
            recipient_user_id: recipient.to_string(),
            timestamp: now_millis,
            message_id: uuid::generate_v4(),
        };
        let payload_bytes = Zeroizing::new(serialization::to_bytes(&payload)?);

        let iv = P::generate_nonce(self.config.nonce_length)?;
        let ciphertext = P::aead_encrypt(&secret.symmetric_key, &iv, &payload_bytes, None)?;
        let signature = P::sign(signing_key, &ciphertext)?;

        // Ephemeral пара генерируется на каждое сообщение и передаётся в конверте,
        // но в деривацию ключа не подмешивается. Приватная часть сразу обнуляется.
        let (ephemeral_private, ephemeral_public) = P::generate_kem_keys()?;
        drop(Zeroizing::new(ephemeral_private));

        Ok(EncryptedMessage {
            encrypted_content: b64::encode(&ciphertext),
            iv: b64::encode(&iv),
            ephemeral_public_key: b64::encode(&ephemeral_public),
            signature: b64::encode(&signature),
            sender_user_id: sender.to_string(),
            recipient_user_id: recipient.to_string(),
            timestamp: now_millis,
            key_version: secret.version.clone(),
        })
    }

    /// Проверить подпись отправителя над ciphertext
    pub fn verify(&self, envelope: &DecodedEnvelope, verifying_key: &[u8]) -> Result<()> {
        P::verify(verifying_key, &envelope.ciphertext, &envelope.signature)
            .map_err(|_| E2eeError::SignatureInvalid)
    }

    /// Расшифровать и проверить адресацию.
    ///
    /// Вызывать только после [`Self::verify`]. Частичный plaintext не
    /// возвращается ни при какой ошибке.
    pub fn open(
        &self,
        msg: &EncryptedMessage,
        envelope: &DecodedEnvelope,
        recipient: &str,
        secret: &SharedSecret,
    ) -> Result<String> {
        let plaintext = Zeroizing::new(
            P::aead_decrypt(&secret.symmetric_key, &envelope.iv, &envelope.ciphertext, None)
                .map_err(|e| E2eeError::DecryptionFailed(e.to_string()))?,
        );

        let payload: MessagePayload = serialization::from_bytes(&plaintext)
            .map_err(|e| E2eeError::DecryptionFailed(format!("malformed payload: {}", e)))?;

        if payload.recipient_user_id != recipient {
            return Err(E2eeError::RecipientMismatch {
                expected: recipient.to_string(),
                actual: payload.recipient_user_id,
            });
        }

        if payload.recipient_user_id != msg.recipient_user_id {
            return Err(E2eeError::RecipientMismatch {
                expected: msg.recipient_user_id.clone(),
                actual: payload.recipient_user_id,
            });
        }

        if payload.sender_user_id != msg.sender_user_id {
            return Err(E2eeError::SenderMismatch {
                envelope: msg.sender_user_id.clone(),
                payload: payload.sender_user_id,
            });
        }

        Ok(payload.content)
    }
}
