//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Append `text` to the file at `path`, creating the file if needed.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written.
pub fn append(path: &Path, text: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open for append: {}", path.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("append to: {}", path.display()))
}

/// Replace the contents of `path` by writing a sibling temporary file and
/// renaming it over the original, preserving the original permissions.
///
/// Symlinks are followed: the file they point at is replaced and the link
/// itself is left in place.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
pub fn replace_atomically(path: &Path, content: &[u8]) -> Result<()> {
    let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temporary file in {}", dir.display()))?;
    tmp.write_all(content)
        .with_context(|| format!("write temporary copy of {}", target.display()))?;
    if let Ok(meta) = std::fs::metadata(&target) {
        std::fs::set_permissions(tmp.path(), meta.permissions())
            .with_context(|| format!("copy permissions of {}", target.display()))?;
    }
    tmp.persist(&target)
        .with_context(|| format!("replace {}", target.display()))?;
    Ok(())
}
