//! Zip extraction for downloaded templates
//!
//! Repository zipballs wrap the tree in a single top-level directory named
//! after the commit (e.g. `owner-repo-1a2b3c4/`).

use crate::error::{CtpError, Result};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Unpack a zip archive into `dest`, creating directories as needed.
///
/// Entries whose names would escape `dest` are skipped.
pub fn unpack(zip_bytes: &[u8], dest: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))?;
    fs::create_dir_all(dest)?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;

        let relative_path = match file.enclosed_name() {
            Some(path) => path,
            None => {
                tracing::warn!(entry = file.name(), "skipping archive entry with unsafe path");
                continue;
            }
        };
        let target = dest.join(relative_path);

        if file.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        fs::write(&target, &contents)?;

        apply_mode(&target, file.unix_mode())?;

        written += 1;
    }

    Ok(written)
}

/// Carry the executable bits of an entry over to the unpacked file
#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let exec_bits = mode.unwrap_or(0) & 0o111;
    if exec_bits == 0 {
        return Ok(());
    }
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | exec_bits);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> std::io::Result<()> {
    Ok(())
}

/// Return the single top-level directory an archive unpacked into
pub fn wrapper_dir(unpacked: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(unpacked)?.collect::<std::io::Result<Vec<_>>>()?;

    if let [entry] = entries.as_slice() {
        if entry.file_type()?.is_dir() {
            return Ok(entry.path());
        }
    }

    Err(CtpError::ArchiveLayout {
        path: unpacked.to_path_buf(),
        entries: entries.len(),
    })
}
