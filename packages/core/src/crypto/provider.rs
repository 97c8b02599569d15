//! Defines the CryptoProvider trait for crypto-agility.

use crate::error::CryptoError;

/// Trait that formalizes all cryptographic operations for a specific cipher suite.
/// This enables crypto-agility by allowing different implementations (e.g., AES-GCM, ChaCha20).
///
/// Keys cross this boundary as raw bytes. Callers own zeroization of private material.
pub trait CryptoProvider: Send + Sync + 'static {
    /// Generates a new key-agreement key pair. Returns `(private, public)`.
    fn generate_kem_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError>;

    /// Derives a key-agreement public key from a private key.
    fn from_private_key_to_public_key(private_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Raw Diffie-Hellman between a local private key and a remote public key.
    ///
    /// Must reject non-contributory results (low-order remote keys).
    fn diffie_hellman(private_key: &[u8], public_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Generates a new Signature key pair. Returns `(signing, verifying)`.
    fn generate_signature_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError>;

    /// Derives a Signature public key from a Signature private key.
    fn from_signature_private_to_public(private_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Checks that raw bytes form a usable verifying key.
    fn validate_signature_public_key(public_key: &[u8]) -> Result<(), CryptoError>;

    /// Signs a message with the given private key.
    fn sign(private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verifies a signature with the given public key.
    fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError>;

    /// Performs AEAD encryption. The returned ciphertext carries the tag.
    fn aead_encrypt(
        key: &[u8],
        nonce: &[u8],
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Performs AEAD decryption. Never returns partial plaintext.
    fn aead_decrypt(
        key: &[u8],
        nonce: &[u8],
        ciphertext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Derives a key from input key material using HKDF.
    fn hkdf_derive_key(salt: &[u8], ikm: &[u8], info: &[u8], len: usize)
        -> Result<Vec<u8>, CryptoError>;

    /// Generates a cryptographically secure random nonce of a specified length.
    fn generate_nonce(len: usize) -> Result<Vec<u8>, CryptoError>;

    /// Returns the numeric suite id associated with this CryptoProvider.
    fn suite_id() -> u16;

    /// Human-readable suite name for logs.
    fn suite_name() -> &'static str;

    /// Exercises every primitive once. Used at startup to detect a platform
    /// without working primitives (e.g. no entropy source).
    fn self_test() -> Result<(), CryptoError> {
        let (a_priv, a_pub) = Self::generate_kem_keys()?;
        let (b_priv, b_pub) = Self::generate_kem_keys()?;
        let ab = Self::diffie_hellman(&a_priv, &b_pub)?;
        let ba = Self::diffie_hellman(&b_priv, &a_pub)?;
        if ab != ba {
            return Err(CryptoError::SelfTestError(
                "key agreement is not symmetric".to_string(),
            ));
        }

        let key = Self::hkdf_derive_key(b"self-test", &ab, b"self-test", 32)?;
        let nonce = Self::generate_nonce(12)?;
        let sealed = Self::aead_encrypt(&key, &nonce, b"self-test", None)?;
        let opened = Self::aead_decrypt(&key, &nonce, &sealed, None)?;
        if opened != b"self-test" {
            return Err(CryptoError::SelfTestError("AEAD round trip mismatch".to_string()));
        }

        let (sk, vk) = Self::generate_signature_keys()?;
        let signature = Self::sign(&sk, &sealed)?;
        Self::verify(&vk, &sealed, &signature)
            .map_err(|e| CryptoError::SelfTestError(e.to_string()))
    }
}
