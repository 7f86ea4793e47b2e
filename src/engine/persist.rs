//! Durable JSON snapshots
//!
//! Stores write a full snapshot through a temp file followed by a rename,
//! so a crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;

/// Write `value` as pretty JSON to `path` atomically (temp file + rename).
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(value)?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load a JSON snapshot. Missing file yields `None`; a file that exists but
/// does not parse is corruption and surfaces as an error.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read(path)?;
    let value = serde_json::from_slice(&data)
        .map_err(|e| AppError::StorageError(format!("corrupt snapshot {:?}: {}", path, e)))?;
    Ok(Some(value))
}
