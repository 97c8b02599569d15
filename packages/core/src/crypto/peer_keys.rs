// Хранилище публичных ключей собеседников
//
// Одна запись на пару (identity, purpose). Повторный импорт перезаписывает запись:
// для вызывающего кода это значит "собеседник сменил ключи". Кэш shared secret
// при этом НЕ чистится автоматически, см. `E2eeService::forget_peer`.

use crate::crypto::provider::CryptoProvider;
use crate::utils::b64;
use crate::utils::error::{E2eeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Назначение ключа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyPurpose {
    /// Key agreement (ECDH). На wire называется "encryption".
    #[serde(rename = "encryption")]
    KeyAgreement,
    #[serde(rename = "signing")]
    Signing,
}

impl fmt::Display for KeyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPurpose::KeyAgreement => f.write_str("encryption"),
            KeyPurpose::Signing => f.write_str("signing"),
        }
    }
}

impl std::str::FromStr for KeyPurpose {
    type Err = E2eeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "encryption" => Ok(KeyPurpose::KeyAgreement),
            "signing" => Ok(KeyPurpose::Signing),
            other => Err(E2eeError::InvalidInput(format!("Unknown key purpose '{}'", other))),
        }
    }
}

/// Импортированный публичный ключ собеседника
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyRecord {
    pub owner_identity: String,
    pub purpose: KeyPurpose,
    pub key_material: Vec<u8>,
}

/// Публичные ключи других участников, индексированные по (identity, purpose)
pub struct PeerKeyStore<P: CryptoProvider> {
    records: HashMap<(String, KeyPurpose), PublicKeyRecord>,
    public_key_size: usize,
    _phantom: PhantomData<P>,
}

impl<P: CryptoProvider> PeerKeyStore<P> {
    pub fn new(public_key_size: usize) -> Self {
        Self {
            records: HashMap::new(),
            public_key_size,
            _phantom: PhantomData,
        }
    }

    /// Декодировать base64 и сохранить ключ. Перезаписывает предыдущую запись.
    ///
    /// Возвращает `true`, если запись для (identity, purpose) уже существовала и
    /// ключ отличается от нового (т.е. собеседник сменил ключ).
    pub fn import_public_key(
        &mut self,
        identity: &str,
        base64_key: &str,
        purpose: KeyPurpose,
    ) -> Result<bool> {
        if identity.is_empty() {
            return Err(E2eeError::InvalidInput("Identity cannot be empty".to_string()));
        }

        let key_material = b64::decode_exact(base64_key, self.public_key_size)
            .map_err(|e| E2eeError::InvalidInput(format!("{} key for '{}': {}", purpose, identity, e)))?;

        if purpose == KeyPurpose::Signing {
            P::validate_signature_public_key(&key_material)?;
        }

        let index = (identity.to_string(), purpose);
        let replaced = self
            .records
            .get(&index)
            .map(|old| old.key_material != key_material)
            .unwrap_or(false);

        self.records.insert(
            index,
            PublicKeyRecord {
                owner_identity: identity.to_string(),
                purpose,
                key_material,
            },
        );

        if replaced {
            tracing::info!(identity, %purpose, "Peer public key replaced");
        } else {
            tracing::debug!(identity, %purpose, "Peer public key imported");
        }

        Ok(replaced)
    }

    pub fn get(&self, identity: &str, purpose: KeyPurpose) -> Option<&PublicKeyRecord> {
        self.records.get(&(identity.to_string(), purpose))
    }

    /// Удалить все ключи собеседника. Возвращает количество удалённых записей.
    pub fn remove(&mut self, identity: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|(owner, _), _| owner != identity);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
