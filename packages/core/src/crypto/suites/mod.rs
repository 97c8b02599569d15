//! Криптографические наборы (Crypto Suites)
//!
//! Этот модуль содержит различные реализации CryptoProvider trait.
//!
//! ## Доступные наборы
//!
//! ### Classic Suite (по умолчанию)
//! - **Key agreement**: X25519 (ECDH на Curve25519)
//! - **Signatures**: Ed25519
//! - **AEAD**: AES-256-GCM, 96-bit IV
//! - **KDF**: HKDF-SHA256
//! - **Suite ID**: 1
//!
//! ### ChaCha Suite
//! - То же самое, но AEAD = ChaCha20-Poly1305
//! - **Suite ID**: 3
//!
//! ## Выбор suite
//!
//! ```rust
//! use cipherlink_core::crypto::suites::classic::ClassicSuiteProvider;
//! use cipherlink_core::crypto::provider::CryptoProvider;
//!
//! type MySuite = ClassicSuiteProvider;
//!
//! let (private_key, public_key) = MySuite::generate_kem_keys().unwrap();
//! assert_eq!(public_key.len(), 32);
//! # drop(private_key);
//! ```

pub mod chacha;
pub mod classic;
