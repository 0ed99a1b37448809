use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

/// Writes any serializable value as pretty-printed JSON.
pub fn write_json_report<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
