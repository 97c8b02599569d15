use crate::crypto::provider::CryptoProvider;
use crate::crypto::suites::classic::ClassicSuiteProvider;
use crate::error::CryptoError;
use chacha20poly1305::{
    aead::{Aead, Payload},
    ChaCha20Poly1305, KeyInit, Nonce,
};

/// Suite ID for the ChaCha20 variant
pub const CHACHA_SUITE_ID: u16 = 3;

/// X25519, Ed25519, ChaCha20-Poly1305, HKDF-SHA256.
///
/// Key agreement, signatures and KDF are shared with [`ClassicSuiteProvider`];
/// only the AEAD differs. Useful on platforms without AES hardware.
pub struct ChaChaSuiteProvider;

impl CryptoProvider for ChaChaSuiteProvider {
    fn generate_kem_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        ClassicSuiteProvider::generate_kem_keys()
    }

    fn from_private_key_to_public_key(private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        ClassicSuiteProvider::from_private_key_to_public_key(private_key)
    }

    fn diffie_hellman(private_key: &[u8], public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        ClassicSuiteProvider::diffie_hellman(private_key, public_key)
    }

    fn generate_signature_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        ClassicSuiteProvider::generate_signature_keys()
    }

    fn from_signature_private_to_public(private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        ClassicSuiteProvider::from_signature_private_to_public(private_key)
    }

    fn validate_signature_public_key(public_key: &[u8]) -> Result<(), CryptoError> {
        ClassicSuiteProvider::validate_signature_public_key(public_key)
    }

    fn sign(private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        ClassicSuiteProvider::sign(private_key, message)
    }

    fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        ClassicSuiteProvider::verify(public_key, message, signature)
    }

    fn aead_encrypt(
        key: &[u8],
        nonce: &[u8],
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = ChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidInputError("Invalid AEAD key length".to_string()))?;
        if nonce.len() != 12 {
            return Err(CryptoError::InvalidInputError("Invalid nonce length".to_string()));
        }

        let payload = Payload {
            msg: plaintext,
            aad: associated_data.unwrap_or(b""),
        };

        cipher
            .encrypt(Nonce::from_slice(nonce), payload)
            .map_err(|e| CryptoError::AeadEncryptionError(e.to_string()))
    }

    fn aead_decrypt(
        key: &[u8],
        nonce: &[u8],
        ciphertext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = ChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidInputError("Invalid AEAD key length".to_string()))?;
        if nonce.len() != 12 {
            return Err(CryptoError::AeadDecryptionError("Invalid nonce length".to_string()));
        }

        let payload = Payload {
            msg: ciphertext,
            aad: associated_data.unwrap_or(b""),
        };

        cipher
            .decrypt(Nonce::from_slice(nonce), payload)
            .map_err(|e| CryptoError::AeadDecryptionError(e.to_string()))
    }

    fn hkdf_derive_key(
        salt: &[u8],
        ikm: &[u8],
        info: &[u8],
        len: usize,
    ) -> Result<Vec<u8>, CryptoError> {
        ClassicSuiteProvider::hkdf_derive_key(salt, ikm, info, len)
    }

    fn generate_nonce(len: usize) -> Result<Vec<u8>, CryptoError> {
        ClassicSuiteProvider::generate_nonce(len)
    }

    fn suite_id() -> u16 {
        CHACHA_SUITE_ID
    }

    fn suite_name() -> &'static str {
        "X25519/Ed25519/ChaCha20-Poly1305/HKDF-SHA256"
    }
}
