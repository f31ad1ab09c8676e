use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use posterutil::slugify;

/// Like `new_york_noir_20260102_030405.png`
pub fn filename(city: &str, label: &str, extension: &str, when: &NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.{}",
        slugify(city),
        label,
        when.format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Writes the file into `dir`, creating it if needed, and returns the full path.
pub fn write(dir: &str, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs_err::create_dir_all(dir)?;
    let path = Path::new(dir).join(name);
    fs_err::write(&path, bytes).with_context(|| format!("saving {} bytes", bytes.len()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}
