//! File system utilities.

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Writes content to a file atomically using a temp file and rename.
///
/// This prevents file corruption if the process is interrupted (e.g., Ctrl+C).
/// The temp file is created in the same directory as the target file to ensure
/// the rename operation is atomic (same filesystem).
///
/// Takes bytes rather than a string so that both the textual PO catalog and
/// the binary MO catalog go through the same path.
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or renamed.
pub fn atomic_write(file_path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    let parent = file_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = file_path.file_name().unwrap_or_default().to_string_lossy();
    let temp_path = parent.join(format!(".{file_name}.tmp"));

    // Write to temp file first
    fs::write(&temp_path, content)?;

    // Atomic rename (same filesystem)
    fs::rename(&temp_path, file_path)?;

    Ok(())
}
