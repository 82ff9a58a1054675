//! Secret encryption CLI commands
//!
//! Encrypts and decrypts short secrets (API tokens) with AES-256-GCM. The key
//! comes from `SLEEK_ENCRYPTION_KEY` (64 hex characters) when set, otherwise
//! it is derived from a passphrase with the Argon2 parameters stored in the
//! settings file.

use clap::Subcommand;
use tracing::info;

use crate::config::{Settings, SleekPaths};
use crate::crypto::{
    decrypt_secret, derive_key, encrypt_secret, looks_encrypted, EncryptionKey,
    KeyDerivationParams,
};
use crate::error::{SleekError, SleekResult};

/// Secret subcommands
#[derive(Subcommand)]
pub enum SecretCommands {
    /// Print a new random key suitable for SLEEK_ENCRYPTION_KEY
    Keygen,
    /// Encrypt a secret (prompts when no value is given)
    Encrypt {
        value: Option<String>,
        /// Ignore SLEEK_ENCRYPTION_KEY and ask for a passphrase
        #[arg(long)]
        passphrase: bool,
    },
    /// Decrypt a value produced by `secret encrypt`
    Decrypt {
        value: String,
        /// Ignore SLEEK_ENCRYPTION_KEY and ask for a passphrase
        #[arg(long)]
        passphrase: bool,
    },
}

/// Handle a secret command
pub fn handle_secret_command(
    paths: &SleekPaths,
    settings: &mut Settings,
    cmd: SecretCommands,
) -> SleekResult<()> {
    match cmd {
        SecretCommands::Keygen => {
            println!("{}", EncryptionKey::generate().to_hex());
        }

        SecretCommands::Encrypt { value, passphrase } => {
            let value = match value {
                Some(value) => value,
                None => prompt("Secret to encrypt: ")?,
            };
            if value.is_empty() {
                return Err(SleekError::Validation("Nothing to encrypt".into()));
            }
            if looks_encrypted(&value) {
                eprintln!("Warning: the value already looks like an encrypted secret.");
            }

            let key = resolve_key(paths, settings, passphrase, true)?;
            println!("{}", encrypt_secret(&value, &key)?);
        }

        SecretCommands::Decrypt { value, passphrase } => {
            let key = resolve_key(paths, settings, passphrase, false)?;
            println!("{}", decrypt_secret(&value, &key)?);
        }
    }

    Ok(())
}

fn resolve_key(
    paths: &SleekPaths,
    settings: &mut Settings,
    force_passphrase: bool,
    confirm: bool,
) -> SleekResult<EncryptionKey> {
    if !force_passphrase {
        if let Some(key) = EncryptionKey::from_env()? {
            return Ok(key);
        }
    }

    let params = match settings.encryption.key_params.clone() {
        Some(params) => params,
        None => {
            if !confirm {
                return Err(SleekError::Encryption(
                    "No passphrase has been set up; set SLEEK_ENCRYPTION_KEY or encrypt a secret first"
                        .into(),
                ));
            }
            // First passphrase use: persist fresh salt and cost parameters
            let params = KeyDerivationParams::new();
            settings.encryption.key_params = Some(params.clone());
            settings.save(paths)?;
            info!("stored new key derivation parameters");
            params
        }
    };

    let passphrase = prompt("Passphrase: ")?;
    if confirm && prompt("Confirm passphrase: ")? != passphrase {
        return Err(SleekError::Encryption("Passphrases do not match".into()));
    }

    derive_key(&passphrase, &params)
}

fn prompt(label: &str) -> SleekResult<String> {
    rpassword::prompt_password(label)
        .map_err(|e| SleekError::Encryption(format!("Failed to read input: {}", e)))
}
