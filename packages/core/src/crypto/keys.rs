// Управление ключами
// Хранение и ротация ключевых пар локальных identity

use crate::crypto::peer_keys::KeyPurpose;
use crate::crypto::CryptoProvider;
use crate::utils::b64;
use crate::utils::error::{E2eeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::marker::PhantomData;
use zeroize::Zeroizing;

/// Асимметричная ключевая пара одного назначения.
///
/// Приватный ключ обнуляется при drop и не покидает [`KeyPairManager`].
pub struct KeyPair {
    pub purpose: KeyPurpose,
    pub public_key: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
}

impl KeyPair {
    fn generate<P: CryptoProvider>(purpose: KeyPurpose) -> Result<Self> {
        let (private_key, public_key) = match purpose {
            KeyPurpose::KeyAgreement => P::generate_kem_keys(),
            KeyPurpose::Signing => P::generate_signature_keys(),
        }
        .map_err(|e| E2eeError::CryptoUnsupported(e.to_string()))?;

        Ok(Self {
            purpose,
            public_key,
            private_key: Zeroizing::new(private_key),
        })
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("purpose", &self.purpose)
            .field("public_key", &b64::encode(&self.public_key))
            .finish_non_exhaustive()
    }
}

/// Ключи одной локальной identity: key agreement + signing
#[derive(Debug)]
struct IdentityKeys {
    agreement: KeyPair,
    signing: KeyPair,
    generation: u32,
}

/// Публичные ключи для out-of-band распространения
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPublicKeys {
    /// Base64 X25519 public key (44 chars)
    pub encryption: String,
    /// Base64 Ed25519 verifying key (44 chars)
    pub signing: String,
}

/// Менеджер ключевых пар локальных identity
pub struct KeyPairManager<P: CryptoProvider> {
    identities: HashMap<String, IdentityKeys>,
    _phantom: PhantomData<P>,
}

impl<P: CryptoProvider> KeyPairManager<P> {
    /// Создать пустой менеджер
    pub fn new() -> Self {
        Self {
            identities: HashMap::new(),
            _phantom: PhantomData,
        }
    }

    /// Сгенерировать новые пары (agreement + signing) для identity.
    ///
    /// Если у identity уже были ключи, они заменяются. Возвращает base64
    /// публичного key-agreement ключа.
    pub fn generate_key_pair(&mut self, identity: &str) -> Result<String> {
        if identity.is_empty() {
            return Err(E2eeError::InvalidInput("Identity cannot be empty".to_string()));
        }

        let generation = self
            .identities
            .get(identity)
            .map(|keys| keys.generation + 1)
            .unwrap_or(1);

        let keys = IdentityKeys {
            agreement: KeyPair::generate::<P>(KeyPurpose::KeyAgreement)?,
            signing: KeyPair::generate::<P>(KeyPurpose::Signing)?,
            generation,
        };
        let exported = b64::encode(&keys.agreement.public_key);

        // Старые приватные ключи обнуляются здесь (drop Zeroizing)
        self.identities.insert(identity.to_string(), keys);

        tracing::info!(identity, generation, "Generated key pairs");
        Ok(exported)
    }

    /// Ротация: старые приватные ключи уничтожаются, генерируются новые.
    ///
    /// Очистка кэша shared secret делается вызывающим кодом (фасадом), так как
    /// кэш не принадлежит менеджеру.
    pub fn rotate_keys(&mut self, identity: &str) -> Result<String> {
        if !self.identities.contains_key(identity) {
            return Err(E2eeError::KeyNotFound {
                identity: identity.to_string(),
                purpose: KeyPurpose::KeyAgreement,
            });
        }
        self.generate_key_pair(identity)
    }

    /// Экспорт обоих публичных ключей
    pub fn export_public_keys(&self, identity: &str) -> Result<ExportedPublicKeys> {
        let keys = self.keys(identity, KeyPurpose::KeyAgreement)?;
        Ok(ExportedPublicKeys {
            encryption: b64::encode(&keys.agreement.public_key),
            signing: b64::encode(&keys.signing.public_key),
        })
    }

    /// Получить публичный ключ нужного назначения
    pub fn public_key(&self, identity: &str, purpose: KeyPurpose) -> Result<&[u8]> {
        let keys = self.keys(identity, purpose)?;
        Ok(match purpose {
            KeyPurpose::KeyAgreement => &keys.agreement.public_key,
            KeyPurpose::Signing => &keys.signing.public_key,
        })
    }

    /// Копия приватного key-agreement ключа для деривации shared secret.
    ///
    /// Копия сама обнулится при drop. Crate-private: приватные ключи не
    /// выходят за пределы движка.
    pub(crate) fn agreement_private_key(&self, identity: &str) -> Result<Zeroizing<Vec<u8>>> {
        let keys = self.keys(identity, KeyPurpose::KeyAgreement)?;
        Ok(keys.agreement.private_key.clone())
    }

    /// Копия приватного signing ключа (для подписи вне текущего потока)
    pub(crate) fn signing_private_key(&self, identity: &str) -> Result<Zeroizing<Vec<u8>>> {
        let keys = self.keys(identity, KeyPurpose::Signing)?;
        Ok(keys.signing.private_key.clone())
    }

    /// Номер поколения ключей (1 после первой генерации, +1 на каждую ротацию)
    pub fn generation(&self, identity: &str) -> Option<u32> {
        self.identities.get(identity).map(|keys| keys.generation)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.identities.contains_key(identity)
    }

    /// Количество identity с ключами
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    fn keys(&self, identity: &str, purpose: KeyPurpose) -> Result<&IdentityKeys> {
        self.identities.get(identity).ok_or_else(|| E2eeError::KeyNotFound {
            identity: identity.to_string(),
            purpose,
        })
    }
}

impl<P: CryptoProvider> Default for KeyPairManager<P> {
    fn default() -> Self {
        Self::new()
    }
}
