//! JSON collection storage.
//!
//! Each collection is a single JSON array on disk. It is read whole at the start of an
//! operation and rewritten whole at the end; there is no partial update and no locking.

use crate::error::{HospitalError, HospitalResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Fails with [`HospitalError::FileNotFound`] unless `path` is an existing regular file.
pub fn ensure_readable(path: &Path) -> HospitalResult<()> {
    if !path.is_file() {
        return Err(HospitalError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Reads and parses a JSON document of type `T` from `path`.
///
/// This uses `serde_path_to_error` to surface a best-effort path (e.g. `2.schedule.0.date`)
/// to the failing field when the file does not match the expected shape.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> HospitalResult<T> {
    ensure_readable(path)?;

    let contents = fs::read_to_string(path).map_err(|source| HospitalError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut deserializer = serde_json::Deserializer::from_str(&contents);
    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let at = err.path().to_string();
            let source = err.into_inner();
            let at = if at.is_empty() || at == "." {
                "<root>".to_string()
            } else {
                at
            };
            Err(HospitalError::Deserialization {
                path: path.to_path_buf(),
                at,
                source,
            })
        }
    }
}

/// Converts an already-parsed JSON value from `path` into `T`.
///
/// Used when the target type is only known after inspecting other data, e.g. a replacement
/// record that may be either a doctor or a patient.
pub fn decode_value<T: DeserializeOwned>(path: &Path, value: serde_json::Value) -> HospitalResult<T> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let at = err.path().to_string();
        HospitalError::Deserialization {
            path: path.to_path_buf(),
            at: if at == "." { "<root>".to_string() } else { at },
            source: err.into_inner(),
        }
    })
}

/// Reads a JSON array of records from `path`.
pub fn load_collection<T: DeserializeOwned>(path: &Path) -> HospitalResult<Vec<T>> {
    let records: Vec<T> = load_document(path)?;
    tracing::debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Rewrites `path` with the pretty-printed JSON array of `records`.
pub fn save_collection<T: Serialize>(path: &Path, records: &[T]) -> HospitalResult<()> {
    let mut json = serde_json::to_string_pretty(records).map_err(HospitalError::Serialization)?;
    json.push('\n');

    fs::write(path, json).map_err(|source| HospitalError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}
