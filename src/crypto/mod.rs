//! Cryptographic helpers for SleekInvoices
//!
//! AES-256-GCM encryption of short secrets, with keys supplied directly or
//! derived from a passphrase via Argon2id.

pub mod encryption;
pub mod key_derivation;

pub use encryption::{decrypt, decrypt_secret, encrypt, encrypt_secret, looks_encrypted};
pub use key_derivation::{derive_key, EncryptionKey, KeyDerivationParams};
