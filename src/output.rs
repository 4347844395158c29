//! Serialization and atomic writing of the output files.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::PollerError;

/// A fully rendered output file, ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Render `value` as JSON with 4-space indentation and no trailing newline.
pub fn render_json<T: Serialize>(value: &T) -> Result<Vec<u8>, PollerError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write every file, or none of them.
///
/// All contents are first written to temp files next to their targets; only when every
/// temp file exists are they renamed into place. Existing targets are moved aside first
/// and restored if a later rename fails.
pub fn write_outputs(files: &[RenderedFile]) -> Result<(), PollerError> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());

    for file in files {
        let tmp_path = tmp_path_for(&file.path);
        if let Err(e) = stage(&tmp_path, &file.contents) {
            discard(&staged);
            let _ = std::fs::remove_file(&tmp_path);
            return Err(PollerError::write(&file.path, e));
        }
        staged.push((tmp_path, file.path.as_path()));
    }

    let mut replaced: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());
    for (i, (tmp_path, path)) in staged.iter().enumerate() {
        let result = back_up(path).and_then(|backup| match replace(tmp_path, path) {
            Ok(()) => Ok(backup),
            Err(e) => {
                if let Some(backup) = &backup {
                    restore(backup, path);
                }
                Err(e)
            }
        });

        match result {
            Ok(backup) => replaced.push((*path, backup)),
            Err(e) => {
                roll_back(&replaced);
                discard(&staged[i..]);
                return Err(PollerError::write(*path, e));
            }
        }
    }

    for (path, backup) in &replaced {
        if let Some(backup) = backup {
            if let Err(e) = std::fs::remove_file(backup) {
                log::warn!("Failed to remove backup {:?}: {}", backup, e);
            }
        }
        log::info!("Wrote {}", path.display());
    }

    Ok(())
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Move an existing regular file out of the way. Returns None when there is nothing to keep.
fn back_up(path: &Path) -> std::io::Result<Option<PathBuf>> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_file() => {
            let backup = backup_path_for(path);
            std::fs::rename(path, &backup)?;
            Ok(Some(backup))
        }
        Ok(_) => Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn restore(backup: &Path, path: &Path) {
    if let Err(e) = std::fs::rename(backup, path) {
        log::error!("Failed to restore {:?} from {:?}: {}", path, backup, e);
    }
}

/// Undo already-completed renames, newest first.
fn roll_back(replaced: &[(&Path, Option<PathBuf>)]) {
    for (path, backup) in replaced.iter().rev() {
        match backup {
            Some(backup) => restore(backup, path),
            None => {
                if let Err(e) = std::fs::remove_file(path) {
                    log::error!("Failed to remove {:?} during rollback: {}", path, e);
                }
            }
        }
    }
}

fn stage(tmp_path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = tmp_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(tmp_path, contents)
}

fn replace(tmp_path: &Path, path: &Path) -> std::io::Result<()> {
    // On Windows, rename fails if the destination exists.
    #[cfg(windows)]
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    std::fs::rename(tmp_path, path)
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp_path, _) in staged {
        if let Err(e) = std::fs::remove_file(tmp_path) {
            log::warn!("Failed to remove temp file {:?}: {}", tmp_path, e);
        }
    }
}
