//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 E2eeService (api::service)                  │
//! │  - encrypt / decrypt / rotate / import / stats              │
//! └─────────────────────────────────────────────────────────────┘
//!          │                │                 │              │
//!          ▼                ▼                 ▼              ▼
//! ┌────────────────┐ ┌──────────────┐ ┌─────────────────┐ ┌──────────────┐
//! │ KeyPairManager │ │ PeerKeyStore │ │SharedSecretCache│ │ MessageCodec │
//! │ - свои ключи   │ │ - чужие      │ │ - ECDH + HKDF   │ │ - AEAD       │
//! │ - ротация      │ │   публичные  │ │ - TTL, версии   │ │ - подпись    │
//! └────────────────┘ └──────────────┘ └─────────────────┘ └──────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              CryptoProvider (Crypto-Agility)                │
//! │  - Key agreement (X25519)                                   │
//! │  - Signatures (Ed25519)                                     │
//! │  - AEAD (AES-256-GCM, ChaCha20-Poly1305)                    │
//! │  - KDF (HKDF-SHA256)                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

/// CryptoProvider trait для crypto-agility
pub mod provider;

/// Криптографические наборы (Classic, ChaCha)
pub mod suites;

pub mod keys;

pub mod peer_keys;

pub mod secret_cache;

pub mod codec;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use provider::CryptoProvider;
