//! First-run setup: directories, settings and starter data

use tracing::info;

use crate::config::{Settings, SleekPaths};
use crate::error::SleekError;
use crate::models::ExpenseCategory;

use super::file_io::write_json_atomic;

/// Starter expense categories with their display colors
const DEFAULT_EXPENSE_CATEGORIES: &[(&str, &str)] = &[
    ("Office Supplies", "#6366f1"),
    ("Software", "#0ea5e9"),
    ("Travel", "#f59e0b"),
    ("Meals", "#ef4444"),
    ("Equipment", "#10b981"),
    ("Marketing", "#ec4899"),
    ("Professional Services", "#8b5cf6"),
    ("Utilities", "#6b7280"),
];

/// Initialize a data directory
///
/// Idempotent: existing settings and categories are left untouched.
pub fn initialize_storage(paths: &SleekPaths) -> Result<Settings, SleekError> {
    paths.ensure_directories()?;

    let settings = Settings::load_or_create(paths)?;
    if !paths.settings_file().exists() {
        settings.save(paths)?;
    }

    if !paths.expense_categories_file().exists() {
        create_default_expense_categories(paths)?;
    }

    info!(path = %paths.base_dir().display(), "storage initialized");
    Ok(settings)
}

fn create_default_expense_categories(paths: &SleekPaths) -> Result<(), SleekError> {
    let records: Vec<ExpenseCategory> = DEFAULT_EXPENSE_CATEGORIES
        .iter()
        .map(|(name, color)| {
            let mut category = ExpenseCategory::new(*name);
            category.color = (*color).to_string();
            category
        })
        .collect();

    write_json_atomic(
        paths.expense_categories_file(),
        &serde_json::json!({ "version": 1, "records": records }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_settings_and_categories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();
        assert!(paths.is_initialized());

        let storage = Storage::open(paths).unwrap();
        let categories = storage.expense_categories.list().unwrap();
        assert_eq!(categories.len(), DEFAULT_EXPENSE_CATEGORIES.len());
        assert!(categories
            .iter()
            .all(|c| ExpenseCategory::is_valid_color(&c.color)));
    }

    #[test]
    fn test_initialize_keeps_settings_written_before_init() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.business_name = "Early Bird".into();
        settings.save(&paths).unwrap();
        assert!(!paths.is_initialized());

        let loaded = initialize_storage(&paths).unwrap();
        assert_eq!(loaded.business_name, "Early Bird");
        assert!(paths.is_initialized());
        assert!(paths.expense_categories_file().exists());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SleekPaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();
        let storage = Storage::open(paths.clone()).unwrap();
        storage
            .expense_categories
            .upsert(ExpenseCategory::new("Hosting"))
            .unwrap();
        storage.save_all().unwrap();

        initialize_storage(&paths).unwrap();
        let reopened = Storage::open(paths).unwrap();
        assert_eq!(
            reopened.expense_categories.count().unwrap(),
            DEFAULT_EXPENSE_CATEGORIES.len() + 1
        );
    }
}
