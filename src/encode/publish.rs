use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ReactionError, ReactionResult};

/// Temporary sibling of `dest`: `clip.mp4` becomes `clip.part.mp4`.
///
/// The extension is kept so the encoder still infers the container from the file name.
pub fn temp_path_for(dest: &Path) -> ReactionResult<PathBuf> {
    let stem = dest.file_stem().ok_or_else(|| {
        ReactionError::validation(format!("output path '{}' has no file name", dest.display()))
    })?;
    let mut name = OsString::from(stem);
    name.push(".part");
    if let Some(ext) = dest.extension() {
        name.push(".");
        name.push(ext);
    }
    Ok(dest.with_file_name(name))
}

pub fn ensure_parent_dir(path: &Path) -> ReactionResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Move a finished temporary file onto its destination in one step.
///
/// Both paths share a directory, so the rename never crosses filesystems.
pub fn publish(temp: &Path, dest: &Path) -> ReactionResult<()> {
    std::fs::rename(temp, dest).with_context(|| {
        format!(
            "failed to publish '{}' as '{}'",
            temp.display(),
            dest.display()
        )
    })?;
    Ok(())
}

/// Publish `temp` as `dest` only if `dest` does not exist yet.
///
/// The hard link fails atomically when something already sits at `dest`. Filesystems without
/// hard links fall back to a checked rename.
pub fn publish_new(temp: &Path, dest: &Path) -> ReactionResult<()> {
    match std::fs::hard_link(temp, dest) {
        Ok(()) => {
            discard(temp);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(already_exists(dest)),
        Err(e) => {
            tracing::debug!(error = %e, "hard link unavailable; publishing with rename");
            if dest.exists() {
                return Err(already_exists(dest));
            }
            publish(temp, dest)
        }
    }
}

fn already_exists(dest: &Path) -> ReactionError {
    ReactionError::validation(format!("output file '{}' already exists", dest.display()))
}

/// Best-effort removal of a stale temporary file.
pub fn discard(temp: &Path) {
    if let Err(e) = std::fs::remove_file(temp)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!(path = %temp.display(), error = %e, "failed to remove temporary output");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/publish.rs"]
mod tests;
