//! Encryption keys
//!
//! A key is either supplied directly (64 hex chars, usually through the
//! `SLEEK_ENCRYPTION_KEY` environment variable) or derived from a passphrase
//! with Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{SleekError, SleekResult};

/// Environment variable holding a hex-encoded 256-bit key
pub const KEY_ENV: &str = "SLEEK_ENCRYPTION_KEY";

/// Length of an AES-256 key in bytes
pub const KEY_LEN: usize = 32;

/// Parameters for passphrase key derivation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Salt (base64, no padding)
    pub salt: String,
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    /// Iterations (default: 3)
    pub time_cost: u32,
    /// Lanes (default: 4)
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            salt: String::new(),
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    /// Default costs with a fresh random salt
    pub fn new() -> Self {
        Self {
            salt: SaltString::generate(&mut OsRng).to_string(),
            ..Default::default()
        }
    }

    pub fn with_values(salt: String, memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            salt,
            memory_cost,
            time_cost,
            parallelism,
        }
    }
}

/// A 256-bit AES key, wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Parse a 64-character hex string
    pub fn from_hex(hex_key: &str) -> SleekResult<Self> {
        let mut decoded = hex::decode(hex_key.trim())
            .map_err(|e| SleekError::Encryption(format!("Invalid hex key: {}", e)))?;

        if decoded.len() != KEY_LEN {
            let len = decoded.len();
            decoded.zeroize();
            return Err(SleekError::Encryption(format!(
                "Key must be {} bytes, got {}",
                KEY_LEN, len
            )));
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { bytes })
    }

    /// Read the key from `SLEEK_ENCRYPTION_KEY`, if set
    pub fn from_env() -> SleekResult<Option<Self>> {
        match std::env::var(KEY_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::from_hex(&value).map(Some),
            _ => Ok(None),
        }
    }

    /// Generate a random key (for `sleek secret keygen`)
    pub fn generate() -> Self {
        use argon2::password_hash::rand_core::RngCore;
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

/// Derive a key from a passphrase with Argon2id
pub fn derive_key(passphrase: &str, params: &KeyDerivationParams) -> SleekResult<EncryptionKey> {
    if params.salt.len() < 8 {
        return Err(SleekError::Encryption(
            "Salt must be at least 8 characters".to_string(),
        ));
    }

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| SleekError::Encryption(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut bytes = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase.as_bytes(), params.salt.as_bytes(), &mut bytes)
        .map_err(|e| SleekError::Encryption(format!("Key derivation failed: {}", e)))?;

    Ok(EncryptionKey { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap parameters so the tests stay fast
    fn fast_params() -> KeyDerivationParams {
        let salt = KeyDerivationParams::new().salt;
        KeyDerivationParams::with_values(salt, 1024, 1, 1)
    }

    #[test]
    fn test_same_passphrase_same_key() {
        let params = fast_params();
        let key1 = derive_key("correct horse", &params).unwrap();
        let key2 = derive_key("correct horse", &params).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_passphrase_or_salt_different_key() {
        let params = fast_params();
        let key1 = derive_key("passphrase1", &params).unwrap();
        let key2 = derive_key("passphrase2", &params).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());

        let key3 = derive_key("passphrase1", &fast_params()).unwrap();
        assert_ne!(key1.as_bytes(), key3.as_bytes());
    }

    #[test]
    fn test_short_salt_rejected() {
        let params = KeyDerivationParams::with_values("abc".into(), 1024, 1, 1);
        assert!(derive_key("x", &params).is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let key = EncryptionKey::generate();
        let parsed = EncryptionKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key.as_bytes(), parsed.as_bytes());
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(EncryptionKey::from_hex("abcd").is_err());
        assert!(EncryptionKey::from_hex("zz").is_err());
    }

    #[test]
    fn test_debug_does_not_leak() {
        let key = EncryptionKey::from_bytes([7u8; KEY_LEN]);
        assert_eq!(format!("{:?}", key), "EncryptionKey(..)");
    }
}
