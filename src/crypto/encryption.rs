//! AES-256-GCM helpers for short secrets (API tokens, OAuth refresh tokens)
//!
//! The stored form is `base64(iv ‖ ciphertext ‖ tag)` with a 96-bit random IV
//! and a 128-bit authentication tag.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{SleekError, SleekResult};

use super::EncryptionKey;

/// Size of the AES-GCM IV in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

fn cipher(key: &EncryptionKey) -> SleekResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| SleekError::Encryption(format!("Failed to create cipher: {}", e)))
}

/// Encrypt bytes into the raw `iv ‖ ciphertext ‖ tag` layout
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> SleekResult<Vec<u8>> {
    let cipher = cipher(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // aes-gcm appends the tag to the ciphertext
    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| SleekError::Encryption(format!("Encryption failed: {}", e)))?;

    let mut blob = Vec::with_capacity(IV_SIZE + sealed.len());
    blob.extend_from_slice(nonce.as_slice());
    blob.extend_from_slice(&sealed);
    Ok(blob)
}

/// Decrypt a raw `iv ‖ ciphertext ‖ tag` blob
pub fn decrypt(blob: &[u8], key: &EncryptionKey) -> SleekResult<Vec<u8>> {
    if blob.len() < IV_SIZE + TAG_SIZE {
        return Err(SleekError::Encryption(format!(
            "Encrypted value too short: {} bytes, need at least {}",
            blob.len(),
            IV_SIZE + TAG_SIZE
        )));
    }

    let (iv, sealed) = blob.split_at(IV_SIZE);
    cipher(key)?
        .decrypt(Nonce::from_slice(iv), sealed)
        .map_err(|_| {
            SleekError::Encryption("Decryption failed: invalid key or corrupted data".to_string())
        })
}

/// Encrypt a secret string to its base64 storage form
pub fn encrypt_secret(plaintext: &str, key: &EncryptionKey) -> SleekResult<String> {
    encrypt(plaintext.as_bytes(), key).map(|blob| STANDARD.encode(blob))
}

/// Decrypt a base64 storage form back to the secret string
pub fn decrypt_secret(encoded: &str, key: &EncryptionKey) -> SleekResult<String> {
    let blob = STANDARD
        .decode(encoded.trim())
        .map_err(|e| SleekError::Encryption(format!("Invalid base64: {}", e)))?;

    let plaintext = decrypt(&blob, key)?;
    String::from_utf8(plaintext)
        .map_err(|e| SleekError::Encryption(format!("Invalid UTF-8 in decrypted data: {}", e)))
}

/// Whether a stored value has the shape of an encrypted secret. Used to skip
/// double encryption when migrating plaintext tokens.
pub fn looks_encrypted(value: &str) -> bool {
    STANDARD
        .decode(value.trim())
        .map(|blob| blob.len() >= IV_SIZE + TAG_SIZE)
        .unwrap_or(false)
}
