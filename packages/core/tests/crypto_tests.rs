//! Tests for the cipher suite providers
//!
//! This test suite covers:
//! - Classic Suite Provider (X25519, Ed25519, AES-256-GCM, HKDF-SHA256)
//! - ChaCha Suite Provider (same primitives, ChaCha20-Poly1305 AEAD)
//! - Error Handling

use cipherlink_core::crypto::suites::chacha::ChaChaSuiteProvider;
use cipherlink_core::crypto::suites::classic::ClassicSuiteProvider;
use cipherlink_core::crypto::CryptoProvider;
use cipherlink_core::error::CryptoError;

/// Test that ClassicSuiteProvider can generate KEM keys
#[test]
fn test_classic_suite_generate_kem_keys() {
    let result = ClassicSuiteProvider::generate_kem_keys();
    assert!(result.is_ok(), "Failed to generate KEM keys");

    let (private_key, public_key) = result.unwrap();

    // X25519 keys should be 32 bytes
    assert_eq!(private_key.len(), 32, "Private key should be 32 bytes");
    assert_eq!(public_key.len(), 32, "Public key should be 32 bytes");

    let derived = ClassicSuiteProvider::from_private_key_to_public_key(&private_key).unwrap();
    assert_eq!(derived, public_key, "Public key must be derivable from private key");
}

/// Test that both sides of a key agreement arrive at the same secret
#[test]
fn test_classic_suite_diffie_hellman_is_symmetric() {
    let (alice_priv, alice_pub) = ClassicSuiteProvider::generate_kem_keys().unwrap();
    let (bob_priv, bob_pub) = ClassicSuiteProvider::generate_kem_keys().unwrap();

    let alice_view = ClassicSuiteProvider::diffie_hellman(&alice_priv, &bob_pub).unwrap();
    let bob_view = ClassicSuiteProvider::diffie_hellman(&bob_priv, &alice_pub).unwrap();
    assert_eq!(alice_view, bob_view);

    let (carol_priv, _) = ClassicSuiteProvider::generate_kem_keys().unwrap();
    let carol_view = ClassicSuiteProvider::diffie_hellman(&carol_priv, &bob_pub).unwrap();
    assert_ne!(alice_view, carol_view, "Different private keys must give different secrets");
}

/// Low-order public keys give an all-zero shared secret and must be refused
#[test]
fn test_classic_suite_rejects_low_order_public_key() {
    let (private_key, _) = ClassicSuiteProvider::generate_kem_keys().unwrap();
    let result = ClassicSuiteProvider::diffie_hellman(&private_key, &[0u8; 32]);
    assert!(matches!(result, Err(CryptoError::KeyAgreementError(_))));
}

/// Test that ClassicSuiteProvider can generate signature keys
#[test]
fn test_classic_suite_generate_signature_keys() {
    let result = ClassicSuiteProvider::generate_signature_keys();
    assert!(result.is_ok(), "Failed to generate signature keys");

    let (signing_key, verifying_key) = result.unwrap();

    // Ed25519 keys: signing key 32 bytes, verifying key 32 bytes
    assert_eq!(signing_key.len(), 32, "Signing key should be 32 bytes");
    assert_eq!(verifying_key.len(), 32, "Verifying key should be 32 bytes");
    assert!(ClassicSuiteProvider::validate_signature_public_key(&verifying_key).is_ok());
}

/// Test signature creation and verification
#[test]
fn test_classic_suite_sign_verify() {
    let (signing_key, verifying_key) = ClassicSuiteProvider::generate_signature_keys().unwrap();
    let message = b"Hello, Cipherlink!";

    // Sign the message
    let signature = ClassicSuiteProvider::sign(&signing_key, message);
    assert!(signature.is_ok(), "Failed to sign message");
    let signature = signature.unwrap();

    // Ed25519 signature should be 64 bytes
    assert_eq!(signature.len(), 64, "Signature should be 64 bytes");

    // Verify the signature
    let verify_result = ClassicSuiteProvider::verify(&verifying_key, message, &signature);
    assert!(verify_result.is_ok(), "Signature verification failed");
}

/// Test that signature verification fails with wrong message
#[test]
fn test_classic_suite_verify_fails_with_wrong_message() {
    let (signing_key, verifying_key) = ClassicSuiteProvider::generate_signature_keys().unwrap();
    let message = b"Original message";
    let wrong_message = b"Modified message";

    let signature = ClassicSuiteProvider::sign(&signing_key, message).unwrap();

    // Verification should fail with wrong message
    let verify_result = ClassicSuiteProvider::verify(&verifying_key, wrong_message, &signature);
    assert!(
        matches!(verify_result, Err(CryptoError::SignatureVerificationError(_))),
        "Verification should fail with wrong message"
    );
}

/// Test AEAD encryption and decryption
#[test]
fn test_classic_suite_aead_encrypt_decrypt() {
    let key = vec![0u8; 32]; // AES-256-GCM uses 32-byte keys
    let nonce = ClassicSuiteProvider::generate_nonce(12).unwrap(); // 96-bit IV
    let plaintext = b"Secret message for encryption test";
    let aad = b"associated data";

    // Encrypt
    let ciphertext = ClassicSuiteProvider::aead_encrypt(&key, &nonce, plaintext, Some(aad));
    assert!(ciphertext.is_ok(), "Encryption failed");
    let ciphertext = ciphertext.unwrap();

    // Ciphertext should be plaintext + 16-byte tag
    assert_eq!(ciphertext.len(), plaintext.len() + 16, "Ciphertext length incorrect");

    // Decrypt
    let decrypted = ClassicSuiteProvider::aead_decrypt(&key, &nonce, &ciphertext, Some(aad));
    assert!(decrypted.is_ok(), "Decryption failed");
    assert_eq!(decrypted.unwrap(), plaintext, "Decrypted plaintext doesn't match");

    // Wrong AAD must fail
    let result = ClassicSuiteProvider::aead_decrypt(&key, &nonce, &ciphertext, Some(b"other"));
    assert!(result.is_err(), "Decryption should fail with wrong associated data");
}

/// Test that AEAD decryption fails with wrong key
#[test]
fn test_classic_suite_aead_decrypt_fails_with_wrong_key() {
    let key = vec![0u8; 32];
    let wrong_key = vec![1u8; 32];
    let nonce = ClassicSuiteProvider::generate_nonce(12).unwrap();
    let plaintext = b"Secret message";

    let ciphertext = ClassicSuiteProvider::aead_encrypt(&key, &nonce, plaintext, None).unwrap();

    // Decryption should fail with wrong key
    let result = ClassicSuiteProvider::aead_decrypt(&wrong_key, &nonce, &ciphertext, None);
    assert!(
        matches!(result, Err(CryptoError::AeadDecryptionError(_))),
        "Decryption should fail with wrong key"
    );
}

/// Test that AEAD decryption fails with wrong nonce
#[test]
fn test_classic_suite_aead_decrypt_fails_with_wrong_nonce() {
    let key = vec![0u8; 32];
    let nonce = ClassicSuiteProvider::generate_nonce(12).unwrap();
    let wrong_nonce = ClassicSuiteProvider::generate_nonce(12).unwrap();
    let plaintext = b"Secret message";

    let ciphertext = ClassicSuiteProvider::aead_encrypt(&key, &nonce, plaintext, None).unwrap();

    // Decryption should fail with wrong nonce
    let result = ClassicSuiteProvider::aead_decrypt(&key, &wrong_nonce, &ciphertext, None);
    assert!(result.is_err(), "Decryption should fail with wrong nonce");
}

/// A nonce of the wrong length is an input error, not a panic
#[test]
fn test_classic_suite_aead_rejects_bad_nonce_length() {
    let key = vec![0u8; 32];
    let result = ClassicSuiteProvider::aead_encrypt(&key, &[0u8; 8], b"data", None);
    assert!(matches!(result, Err(CryptoError::InvalidInputError(_))));
}

/// Test HKDF key derivation
#[test]
fn test_classic_suite_hkdf() {
    let salt = b"test_salt";
    let ikm = b"input_key_material_for_derivation";
    let info = b"context_info";
    let len = 32;

    let derived_key = ClassicSuiteProvider::hkdf_derive_key(salt, ikm, info, len);
    assert!(derived_key.is_ok(), "HKDF derivation failed");

    let key = derived_key.unwrap();
    assert_eq!(key.len(), len, "Derived key length incorrect");

    // Verify determinism: same inputs should give same output
    let derived_key2 = ClassicSuiteProvider::hkdf_derive_key(salt, ikm, info, len).unwrap();
    assert_eq!(key, derived_key2, "HKDF should be deterministic");

    // Different context must give a different key
    let other = ClassicSuiteProvider::hkdf_derive_key(salt, ikm, b"other_context", len).unwrap();
    assert_ne!(key, other);
}

/// Both suites must pass their startup self-test
#[test]
fn test_suites_self_test() {
    ClassicSuiteProvider::self_test().unwrap();
    ChaChaSuiteProvider::self_test().unwrap();
    assert_ne!(ClassicSuiteProvider::suite_id(), ChaChaSuiteProvider::suite_id());
}

/// Ciphertexts from one suite do not open under the other
#[test]
fn test_suites_are_not_interchangeable() {
    let key = vec![7u8; 32];
    let nonce = ClassicSuiteProvider::generate_nonce(12).unwrap();

    let sealed = ChaChaSuiteProvider::aead_encrypt(&key, &nonce, b"hello", None).unwrap();
    assert_eq!(
        ChaChaSuiteProvider::aead_decrypt(&key, &nonce, &sealed, None).unwrap(),
        b"hello"
    );
    assert!(ClassicSuiteProvider::aead_decrypt(&key, &nonce, &sealed, None).is_err());
}

/// Test random number generation quality (entropy check)
#[test]
fn test_random_number_quality() {
    let mut bytes_set = std::collections::HashSet::new();

    // Generate 100 random nonces
    for _ in 0..100 {
        let nonce = ClassicSuiteProvider::generate_nonce(12).unwrap();
        let nonce_hex = hex::encode(&nonce);

        // All nonces should be unique
        assert!(
            bytes_set.insert(nonce_hex.clone()),
            "Duplicate nonce generated: {}",
            nonce_hex
        );
    }

    // Should have 100 unique nonces
    assert_eq!(bytes_set.len(), 100, "Not all nonces are unique");
}
