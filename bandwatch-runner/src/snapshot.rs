//! Static HTML snapshot written by the scheduler.

use anyhow::{Context, Result};
use std::path::Path;

/// Write `html` to `path` atomically.
///
/// The page is written to a sibling temp file and renamed into place, so a
/// reader never sees a half-written snapshot.
pub fn write_snapshot(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {}", parent.display()))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    std::fs::write(&tmp, html)
        .with_context(|| format!("Failed to write snapshot {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move snapshot into place at {}", path.display()))?;
    Ok(())
}
