//! File I/O utilities with atomic writes

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::SleekError;

/// Read JSON from a file, returning `T::default()` if the file doesn't exist
/// or is empty
pub fn read_json<T, P>(path: P) -> Result<T, SleekError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(SleekError::Storage(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            )))
        }
    };
    if metadata.len() == 0 {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| SleekError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SleekError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to a sibling temp file, fsync, then
/// rename over the target)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), SleekError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let fail = |what: &str, e: &dyn std::fmt::Display| {
        SleekError::Storage(format!("Failed to {} {}: {}", what, path.display(), e))
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| fail("create the directory for", &e))?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|e| fail("create a temp file for", &e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data).map_err(|e| fail("serialize", &e))?;
    let file = writer
        .into_inner()
        .map_err(|e| fail("flush", &e.into_error()))?;
    file.sync_all().map_err(|e| fail("sync", &e))?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(fail("replace", &e));
    }
    Ok(())
}
