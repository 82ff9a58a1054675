//! Path management for SleekInvoices
//!
//! ## Path Resolution Order
//!
//! 1. `SLEEK_INVOICES_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `sleek-invoices`
//!    (`~/.config/sleek-invoices` on Linux, `%APPDATA%` on Windows, ...)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::SleekError;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "SLEEK_INVOICES_DATA_DIR";

/// Manages all paths used by SleekInvoices
#[derive(Debug, Clone)]
pub struct SleekPaths {
    base_dir: PathBuf,
}

impl SleekPaths {
    /// Resolve paths from the environment, falling back to the platform
    /// config directory
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, SleekError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "sleek-invoices")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    SleekError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Use an explicit base directory (tests, `--data-dir`)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the entity JSON files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn clients_file(&self) -> PathBuf {
        self.data_dir().join("clients.json")
    }

    pub fn invoices_file(&self) -> PathBuf {
        self.data_dir().join("invoices.json")
    }

    pub fn estimates_file(&self) -> PathBuf {
        self.data_dir().join("estimates.json")
    }

    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    pub fn expense_categories_file(&self) -> PathBuf {
        self.data_dir().join("expense_categories.json")
    }

    /// Create the base and data directories if missing
    pub fn ensure_directories(&self) -> Result<(), SleekError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| SleekError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| SleekError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Whether `sleek init` has been run here
    ///
    /// Settings alone don't count: `sleek config` can write them before init.
    pub fn is_initialized(&self) -> bool {
        self.settings_file().is_file() && self.data_dir().is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.invoices_file(),
            temp_dir.path().join("data").join("invoices.json")
        );
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var(DATA_DIR_ENV, temp_dir.path());

        let paths = SleekPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().join("nested"));

        assert!(!paths.is_initialized());
        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().exists());
    }

    #[test]
    fn test_settings_file_alone_is_not_initialized() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().to_path_buf());

        std::fs::write(paths.settings_file(), "{}").unwrap();
        assert!(!paths.is_initialized());

        paths.ensure_directories().unwrap();
        assert!(paths.is_initialized());
    }
}
