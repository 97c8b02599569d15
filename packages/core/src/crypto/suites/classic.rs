use crate::crypto::provider::CryptoProvider;
use crate::error::CryptoError;
use aes_gcm::{
    aead::{consts::U12, Aead, Payload},
    Aes256Gcm, KeyInit, Nonce,
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand_core::RngCore;
use sha2::Sha256;
use x25519_dalek::{PublicKey as KemPublicKeyDalek, StaticSecret};
use zeroize::Zeroizing;

/// Suite ID for the classic suite
pub const CLASSIC_SUITE_ID: u16 = 1;

/// Concrete implementation of `CryptoProvider` for the classic suite:
/// X25519, Ed25519, AES-256-GCM, HKDF-SHA256.
pub struct ClassicSuiteProvider;

pub(crate) fn to_array32(bytes: &[u8], what: &str) -> Result<[u8; 32], CryptoError> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidInputError(format!("Invalid {} length", what)))
}

impl CryptoProvider for ClassicSuiteProvider {
    fn generate_kem_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let private_key = StaticSecret::random_from_rng(OsRng);
        let public_key = KemPublicKeyDalek::from(&private_key);
        Ok((private_key.to_bytes().to_vec(), public_key.to_bytes().to_vec()))
    }

    fn from_private_key_to_public_key(private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let bytes = Zeroizing::new(to_array32(private_key, "KEM private key")?);
        let static_secret = StaticSecret::from(*bytes);
        let public_key = KemPublicKeyDalek::from(&static_secret);
        Ok(public_key.to_bytes().to_vec())
    }

    fn diffie_hellman(private_key: &[u8], public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let sk_bytes = Zeroizing::new(to_array32(private_key, "KEM private key")?);
        let pk_bytes = to_array32(public_key, "KEM public key")?;

        let static_secret = StaticSecret::from(*sk_bytes);
        let remote_public = KemPublicKeyDalek::from(pk_bytes);
        let shared_secret = static_secret.diffie_hellman(&remote_public);

        if !shared_secret.was_contributory() {
            return Err(CryptoError::KeyAgreementError(
                "Non-contributory key agreement (low-order public key)".to_string(),
            ));
        }

        Ok(shared_secret.to_bytes().to_vec())
    }

    fn generate_signature_keys() -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Ok((
            signing_key.to_bytes().to_vec(),
            verifying_key.to_bytes().to_vec(),
        ))
    }

    fn from_signature_private_to_public(private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let bytes = Zeroizing::new(to_array32(private_key, "signing key")?);
        let signing_key = SigningKey::from_bytes(&bytes);
        Ok(signing_key.verifying_key().to_bytes().to_vec())
    }

    fn validate_signature_public_key(public_key: &[u8]) -> Result<(), CryptoError> {
        let vk_bytes = to_array32(public_key, "verifying key")?;
        VerifyingKey::from_bytes(&vk_bytes)
            .map(|_| ())
            .map_err(|e| CryptoError::InvalidInputError(format!("Invalid verifying key: {}", e)))
    }

    fn sign(private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let bytes = Zeroizing::new(to_array32(private_key, "signing key")?);
        let signing_key = SigningKey::from_bytes(&bytes);
        let signature = signing_key.sign(message);
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let vk_bytes = to_array32(public_key, "verifying key")?;
        let verifying_key = VerifyingKey::from_bytes(&vk_bytes)
            .map_err(|e| CryptoError::InvalidInputError(format!("Invalid verifying key: {}", e)))?;

        let sig_bytes: &[u8; 64] = signature
            .try_into()
            .map_err(|_| CryptoError::SignatureVerificationError("Invalid signature length".to_string()))?;
        let signature_obj = Signature::from_bytes(sig_bytes);

        verifying_key
            .verify(message, &signature_obj)
            .map_err(|e| CryptoError::SignatureVerificationError(e.to_string()))
    }

    fn aead_encrypt(
        key: &[u8],
        nonce: &[u8],
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidInputError("Invalid AEAD key length".to_string()))?;
        if nonce.len() != 12 {
            return Err(CryptoError::InvalidInputError("Invalid nonce length".to_string()));
        }

        let payload = Payload {
            msg: plaintext,
            aad: associated_data.unwrap_or(b""),
        };

        cipher
            .encrypt(Nonce::<U12>::from_slice(nonce), payload)
            .map_err(|e| CryptoError::AeadEncryptionError(e.to_string()))
    }

    fn aead_decrypt(
        key: &[u8],
        nonce: &[u8],
        ciphertext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidInputError("Invalid AEAD key length".to_string()))?;
        if nonce.len() != 12 {
            return Err(CryptoError::AeadDecryptionError("Invalid nonce length".to_string()));
        }

        let payload = Payload {
            msg: ciphertext,
            aad: associated_data.unwrap_or(b""),
        };

        cipher
            .decrypt(Nonce::<U12>::from_slice(nonce), payload)
            .map_err(|e| CryptoError::AeadDecryptionError(e.to_string()))
    }

    fn hkdf_derive_key(
        salt: &[u8],
        ikm: &[u8],
        info: &[u8],
        len: usize,
    ) -> Result<Vec<u8>, CryptoError> {
        let hkdf = Hkdf::<Sha256>::new(Some(salt), ikm);
        let mut okm = vec![0u8; len];
        hkdf.expand(info, &mut okm)
            .map_err(|e| CryptoError::KeyDerivationError(e.to_string()))?;
        Ok(okm)
    }

    fn generate_nonce(len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut nonce_bytes = vec![0u8; len];
        OsRng.try_fill_bytes(&mut nonce_bytes)?;
        Ok(nonce_bytes)
    }

    fn suite_id() -> u16 {
        CLASSIC_SUITE_ID
    }

    fn suite_name() -> &'static str {
        "X25519/Ed25519/AES-256-GCM/HKDF-SHA256"
    }
}
