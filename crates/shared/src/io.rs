use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the default directory for profiles and briefing history
pub fn get_default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("daily-briefing");

    Ok(data_dir)
}

/// Load a JSON file, or `None` when it does not exist yet
pub fn read_json<T: DeserializeOwned>(filepath: &Path) -> Result<Option<T>> {
    if !filepath.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(filepath)
        .with_context(|| format!("Failed to read {}", filepath.display()))?;

    let data = serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse JSON from {}. The file may be corrupted.",
            filepath.display()
        )
    })?;

    Ok(Some(data))
}

/// Save data as pretty-printed JSON, creating the parent directory if needed.
/// The file is written beside the target and renamed over it, so readers never see a partial file.
pub fn write_json<T: Serialize>(filepath: &Path, data: &T) -> Result<()> {
    if let Some(parent) = filepath.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;

    let staging = filepath.with_extension("json.tmp");
    fs::write(&staging, json)
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    fs::rename(&staging, filepath)
        .with_context(|| format!("Failed to replace {}", filepath.display()))?;

    Ok(())
}
