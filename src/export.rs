//! JSON exchange format for wheels.
//!
//! ```json
//! { "version": "1.0", "wheel": { "id": "...", "name": "...", "items": [ { "id", "question", "color" } ] } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::wheel::WheelConfig;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelExportData {
    pub version: String,
    pub wheel: WheelConfig,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read wheel file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Wheel file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid wheel data structure: {0}")]
    Structure(&'static str),
}

/// Serialize a wheel as pretty-printed export JSON
pub fn export_to_string(wheel: &WheelConfig) -> serde_json::Result<String> {
    let data = WheelExportData {
        version: EXPORT_VERSION.to_string(),
        wheel: wheel.clone(),
    };
    serde_json::to_string_pretty(&data)
}

/// Parse export JSON, checking the shape before accepting anything.
pub fn import_from_str(content: &str) -> Result<WheelConfig, ImportError> {
    let value: Value = serde_json::from_str(content)?;

    let wheel = value
        .get("wheel")
        .filter(|w| w.is_object())
        .ok_or(ImportError::Structure("missing wheel object"))?;

    match wheel.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => {}
        _ => return Err(ImportError::Structure("wheel.name is missing")),
    }

    if !wheel.get("items").is_some_and(Value::is_array) {
        return Err(ImportError::Structure("wheel.items is not an array"));
    }

    let data: WheelExportData = serde_json::from_value(value)?;
    Ok(data.wheel)
}

pub fn import_from_file(path: &Path) -> Result<WheelConfig, ImportError> {
    let content = std::fs::read_to_string(path)?;
    import_from_str(&content)
}

/// Lowercased name with everything outside `[a-z0-9]` replaced by `_`
pub fn safe_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Write `wheel` into `dir` as `<safe-name>-<unix-millis>.json`
pub fn export_to_dir(wheel: &WheelConfig, dir: &Path) -> anyhow::Result<PathBuf> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let path = dir.join(format!("{}-{}.json", safe_file_stem(&wheel.name), millis));
    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, export_to_string(wheel)?)?;
    Ok(path)
}
