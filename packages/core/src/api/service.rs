//! E2EE Service - фасад над всеми компонентами
//!
//! ## Типичный сценарий
//!
//! ```text
//! 1. alice = E2eeService::new(Config::default())
//! 2. alice.generate_key_pair("alice")            → опубликовать ключ
//! 3. alice.import_public_key("bob", .., Encryption / Signing)
//! 4. msg = alice.encrypt_message("alice", "bob", "pay $10")
//! 5. msg → transport → bob
//! 6. bob.decrypt_message("bob", &msg)            → "pay $10"
//! ```
//!
//! ## Не отвечает за
//!
//! - Сетевой транспорт и распространение ключей
//! - Persistence ключей
//! - Политику повторов: все ошибки терминальны для операции
//!
//! Сервис `Send + Sync`, методы принимают `&self`; оборачивайте в `Arc`,
//! чтобы делить между задачами.

use crate::config::Config;
use crate::crypto::codec::MessageCodec;
use crate::crypto::keys::{ExportedPublicKeys, KeyPairManager};
use crate::crypto::peer_keys::{KeyPurpose, PeerKeyStore};
use crate::crypto::secret_cache::{SharedSecret, SharedSecretCache};
use crate::crypto::suites::classic::ClassicSuiteProvider;
use crate::crypto::CryptoProvider;
use crate::protocol::messages::EncryptedMessage;
use crate::protocol::validation::{decode_envelope, validate_envelope};
use crate::utils::error::{E2eeError, Result};
use crate::utils::time::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use zeroize::Zeroizing;

/// Счётчики для наблюдаемости
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct E2eeStats {
    /// Локальные identity с ключами
    pub key_pairs: usize,
    /// Импортированные публичные ключи (identity × purpose)
    pub public_keys: usize,
    /// Записи в кэше shared secret, включая просроченные до sweep
    pub shared_secrets: usize,
}

pub struct E2eeService<P: CryptoProvider = ClassicSuiteProvider> {
    config: Config,
    clock: Arc<dyn Clock>,
    key_pairs: RwLock<KeyPairManager<P>>,
    peer_keys: RwLock<PeerKeyStore<P>>,
    secrets: SharedSecretCache,
    codec: MessageCodec<P>,
}

impl<P: CryptoProvider> E2eeService<P> {
    /// Создать сервис с системными часами.
    ///
    /// Прогоняет self-test примитивов; если платформа их не поддерживает,
    /// возвращает `CryptoUnsupported`.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        P::self_test().map_err(|e| {
            tracing::error!(suite = P::suite_name(), error = %e, "Crypto self-test failed");
            E2eeError::CryptoUnsupported(e.to_string())
        })?;

        tracing::info!(
            suite = P::suite_name(),
            suite_id = P::suite_id(),
            ttl_secs = config.shared_secret_ttl.as_secs(),
            "E2EE service initialized"
        );

        Ok(Self {
            secrets: SharedSecretCache::new(config.ttl_millis(), clock.clone()),
            key_pairs: RwLock::new(KeyPairManager::new()),
            peer_keys: RwLock::new(PeerKeyStore::new(config.public_key_size)),
            codec: MessageCodec::new(config.clone()),
            config,
            clock,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ============================================================================
    // Ключи
    // ============================================================================

    /// Сгенерировать key-agreement и signing пары для identity.
    /// Возвращает base64 публичного key-agreement ключа.
    ///
    /// Для identity, у которой уже есть ключи, это равносильно ротации:
    /// секреты, выведенные из старых приватных ключей, удаляются из кэша.
    pub async fn generate_key_pair(&self, identity: &str) -> Result<String> {
        let (public_key, replaced) = {
            let mut key_pairs = self.key_pairs.write().await;
            let replaced = key_pairs.contains(identity);
            (key_pairs.generate_key_pair(identity)?, replaced)
        };

        if replaced {
            let purged = self.secrets.purge(identity);
            tracing::info!(identity, purged, "Regenerated keys over existing pairs");
        }
        Ok(public_key)
    }

    /// Ротация ключей identity: старые приватные ключи уничтожаются, все
    /// кэшированные секреты с её участием удаляются.
    pub async fn rotate_keys(&self, identity: &str) -> Result<String> {
        let (public_key, generation) = {
            let mut key_pairs = self.key_pairs.write().await;
            let public_key = key_pairs.rotate_keys(identity)?;
            (public_key, key_pairs.generation(identity))
        };
        let purged = self.secrets.purge(identity);
        tracing::info!(identity, ?generation, purged, "Rotated keys");
        Ok(public_key)
    }

    pub async fn export_public_keys(&self, identity: &str) -> Result<ExportedPublicKeys> {
        self.key_pairs.read().await.export_public_keys(identity)
    }

    /// Импортировать публичный ключ собеседника.
    ///
    /// Старые секреты для этого собеседника НЕ удаляются; если собеседник
    /// сменил ключи, вызовите [`Self::forget_peer`] перед импортом.
    pub async fn import_public_key(
        &self,
        identity: &str,
        base64_key: &str,
        purpose: KeyPurpose,
    ) -> Result<()> {
        let replaced = self
            .peer_keys
            .write()
            .await
            .import_public_key(identity, base64_key, purpose)?;

        if replaced && self.secrets.references(identity) {
            tracing::warn!(
                identity,
                "Peer key replaced while cached secrets still reference it; call forget_peer to purge"
            );
        }
        Ok(())
    }

    /// Забыть собеседника: удалить его публичные ключи и связанные секреты
    pub async fn forget_peer(&self, identity: &str) -> usize {
        let removed_keys = self.peer_keys.write().await.remove(identity);
        let purged = self.secrets.purge(identity);
        tracing::info!(identity, removed_keys, purged, "Forgot peer");
        removed_keys
    }

    // ============================================================================
    // Сообщения
    // ============================================================================

    /// Зашифровать `content` от `sender` для `recipient`
    pub async fn encrypt_message(
        &self,
        sender: &str,
        recipient: &str,
        content: &str,
    ) -> Result<EncryptedMessage> {
        if sender.is_empty() || recipient.is_empty() {
            return Err(E2eeError::InvalidInput(
                "Sender and recipient cannot be empty".to_string(),
            ));
        }

        let secret = self.shared_secret(sender, recipient).await?;
        let signing_key = self.key_pairs.read().await.signing_private_key(sender)?;

        let codec = self.codec.clone();
        let now = self.clock.now_millis();
        let (sender_owned, recipient_owned) = (sender.to_string(), recipient.to_string());
        let content = Zeroizing::new(content.to_string());

        let msg = run_crypto(self.config.crypto_timeout, "encrypt", move || {
            codec.seal(
                &secret,
                &signing_key,
                &sender_owned,
                &recipient_owned,
                &content,
                now,
            )
        })
        .await?;

        tracing::debug!(sender, recipient, key_version = %msg.key_version, "Encrypted message");
        Ok(msg)
    }

    /// Проверить и расшифровать конверт, адресованный `recipient`
    pub async fn decrypt_message(&self, recipient: &str, msg: &EncryptedMessage) -> Result<String> {
        self.decrypt_inner(recipient, msg).await.map_err(|e| {
            tracing::warn!(
                recipient,
                sender = %msg.sender_user_id,
                key_version = %msg.key_version,
                error = %e,
                "Rejected message"
            );
            e
        })
    }

    async fn decrypt_inner(&self, recipient: &str, msg: &EncryptedMessage) -> Result<String> {
        validate_envelope(msg, &self.config, self.clock.now_millis())?;

        let verifying_key = self
            .peer_public_key(&msg.sender_user_id, KeyPurpose::Signing)
            .await?;
        let envelope = decode_envelope(msg, &self.config)?;

        // Аутентичность до конфиденциальности
        let codec = self.codec.clone();
        let envelope = run_crypto(self.config.crypto_timeout, "verify", move || {
            codec.verify(&envelope, &verifying_key)?;
            Ok(envelope)
        })
        .await?;

        let secret = self.shared_secret(recipient, &msg.sender_user_id).await?;

        let codec = self.codec.clone();
        let msg_owned = msg.clone();
        let recipient_owned = recipient.to_string();
        run_crypto(self.config.crypto_timeout, "decrypt", move || {
            codec.open(&msg_owned, &envelope, &recipient_owned, &secret)
        })
        .await
    }

    // ============================================================================
    // Обслуживание
    // ============================================================================

    /// Удалить просроченные секреты. Возвращает количество удалённых.
    pub fn cleanup_expired_secrets(&self) -> usize {
        let removed = self.secrets.sweep();
        if removed > 0 {
            tracing::debug!(removed, "Swept expired shared secrets");
        }
        removed
    }

    pub async fn get_stats(&self) -> E2eeStats {
        E2eeStats {
            key_pairs: self.key_pairs.read().await.len(),
            public_keys: self.peer_keys.read().await.len(),
            shared_secrets: self.secrets.len(),
        }
    }

    /// Кэшированная запись без учёта возраста (для диагностики)
    pub fn cached_secret_version(&self, a: &str, b: &str) -> Option<String> {
        self.secrets.peek(a, b).map(|secret| secret.version)
    }

    // ============================================================================
    // Внутреннее
    // ============================================================================

    /// Секрет пары: из кэша или ECDH(свой приватный, чужой публичный) → HKDF
    async fn shared_secret(&self, self_identity: &str, peer_identity: &str) -> Result<SharedSecret> {
        self.secrets
            .get_or_create(self_identity, peer_identity, |pair_key| async move {
                let private_key = self.key_pairs.read().await.agreement_private_key(self_identity)?;
                let public_key = self
                    .peer_public_key(peer_identity, KeyPurpose::KeyAgreement)
                    .await?;

                let salt = self.config.suite_label;
                let key_length = self.config.key_length;
                let info = pair_key.to_info_bytes();

                run_crypto(self.config.crypto_timeout, "derive", move || {
                    let dh_output = Zeroizing::new(P::diffie_hellman(&private_key, &public_key)?);
                    let key = P::hkdf_derive_key(salt, &dh_output, &info, key_length)?;
                    Ok(Zeroizing::new(key))
                })
                .await
            })
            .await
    }

    /// Публичный ключ собеседника: сначала импортированные, затем локальные
    /// identity этого же сервиса.
    async fn peer_public_key(&self, identity: &str, purpose: KeyPurpose) -> Result<Vec<u8>> {
        if let Some(record) = self.peer_keys.read().await.get(identity, purpose) {
            return Ok(record.key_material.clone());
        }

        self.key_pairs
            .read()
            .await
            .public_key(identity, purpose)
            .map(|key| key.to_vec())
    }
}

/// Выполнить примитив на blocking-пуле с таймаутом.
///
/// При таймауте возвращается `Timeout`; сам blocking-поток досчитает и его
/// результат будет отброшен.
pub(crate) async fn run_crypto<T, F>(timeout: Duration, op: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(E2eeError::InternalError(format!(
            "{} task failed: {}",
            op, join_error
        ))),
        Err(_) => {
            tracing::warn!(op, timeout_ms = timeout.as_millis() as u64, "Crypto operation timed out");
            Err(E2eeError::Timeout(op))
        }
    }
}
