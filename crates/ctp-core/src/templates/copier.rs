//! Copying a cached template into a new project directory

use super::cache::TIMESTAMP_FILE;
use super::manifest::MANIFEST_FILE;
use crate::error::{CtpError, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Files at the template root that never reach the project
const EXCLUDED_ROOT_FILES: &[&str] = &[MANIFEST_FILE, TIMESTAMP_FILE];

/// Copy a template tree to `target_dir`.
///
/// A missing `target_dir` is built as a hidden sibling and renamed into place
/// once complete, so a failed copy leaves nothing behind. An existing empty
/// `target_dir` is filled in place and emptied again if the copy fails. An
/// existing non-empty `target_dir` is refused.
pub async fn copy_template(template_dir: &Path, target_dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_vacant(target_dir).await?;

    if target_dir.is_dir() {
        return match copy_tree(template_dir, target_dir).await {
            Ok(copied) => Ok(copied),
            Err(e) => {
                let _ = clear_dir(target_dir).await;
                Err(e)
            }
        };
    }

    let staging = staging_path(target_dir)?;
    if staging.exists() {
        fs::remove_dir_all(&staging).await?;
    }

    match copy_tree(template_dir, &staging).await {
        Ok(copied) => {
            fs::rename(&staging, target_dir)
                .await
                .with_context(|| format!("Failed to move project into {}", target_dir.display()))?;
            Ok(copied)
        }
        Err(e) => {
            let _ = fs::remove_dir_all(&staging).await;
            Err(e)
        }
    }
}

/// Whether a file (relative to the template root) is left out of the project
fn is_excluded(relative: &Path) -> bool {
    EXCLUDED_ROOT_FILES
        .iter()
        .any(|name| relative == Path::new(name))
}

async fn ensure_vacant(target_dir: &Path) -> Result<()> {
    if !target_dir.exists() {
        return Ok(());
    }
    if target_dir.is_dir() {
        let mut entries = fs::read_dir(target_dir).await?;
        if entries.next_entry().await?.is_none() {
            return Ok(());
        }
    }
    Err(CtpError::ProjectExists(target_dir.to_path_buf()))
}

async fn clear_dir(dir: &Path) -> Result<()> {
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            fs::remove_dir_all(entry.path()).await?;
        } else {
            fs::remove_file(entry.path()).await?;
        }
    }
    Ok(())
}

fn staging_path(target_dir: &Path) -> Result<PathBuf> {
    let name = target_dir
        .file_name()
        .with_context(|| format!("Invalid project directory: {}", target_dir.display()))?;
    let parent = target_dir.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(format!(".{}.ctp-partial", name.to_string_lossy())))
}

async fn copy_tree(source: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest)
        .await
        .with_context(|| format!("Failed to create directory: {}", dest.display()))?;

    let mut copied = Vec::new();

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.context("Failed to read template directory")?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .context("Template entry outside of template directory")?;

        if is_excluded(relative) {
            continue;
        }

        let target_path = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target_path)
                .await
                .with_context(|| format!("Failed to create directory: {}", target_path.display()))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target_path).await?;
            copied.push(relative.to_path_buf());
        } else {
            fs::copy(entry.path(), &target_path)
                .await
                .with_context(|| format!("Failed to write file: {}", target_path.display()))?;
            copied.push(relative.to_path_buf());
        }
    }

    Ok(copied)
}

#[cfg(unix)]
async fn copy_symlink(source: &Path, target: &Path) -> Result<()> {
    let link = fs::read_link(source).await?;
    fs::symlink(&link, target)
        .await
        .with_context(|| format!("Failed to create symlink: {}", target.display()))?;
    Ok(())
}

#[cfg(not(unix))]
async fn copy_symlink(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target)
        .await
        .with_context(|| format!("Failed to write file: {}", target.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "{}").unwrap();
        std::fs::write(dir.path().join(TIMESTAMP_FILE), "1").unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("src/nested/ctp.json"), "kept").unwrap();
        dir
    }

    #[test]
    fn test_is_excluded() {
        assert!(is_excluded(Path::new("ctp.json")));
        assert!(is_excluded(Path::new(".timestamp")));
        assert!(!is_excluded(Path::new("src/ctp.json")));
        assert!(!is_excluded(Path::new("package.json")));
    }

    #[tokio::test]
    async fn test_copy_excludes_manifest_and_timestamp() {
        let template = template();
        let out = TempDir::new().unwrap();
        let project = out.path().join("my-app");

        let copied = copy_template(template.path(), &project).await.unwrap();

        assert!(project.join("package.json").is_file());
        assert!(project.join("src/nested/ctp.json").is_file());
        assert!(!project.join(MANIFEST_FILE).exists());
        assert!(!project.join(TIMESTAMP_FILE).exists());
        assert_eq!(copied.len(), 2);
        assert!(!out.path().join(".my-app.ctp-partial").exists());
    }

    #[tokio::test]
    async fn test_copy_into_empty_directory() {
        let template = template();
        let out = TempDir::new().unwrap();
        let project = out.path().join("my-app");
        std::fs::create_dir(&project).unwrap();

        copy_template(template.path(), &project).await.unwrap();

        assert!(project.join("package.json").is_file());
        assert!(!out.path().join(".my-app.ctp-partial").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_existing_directory_is_kept() {
        use std::os::unix::fs::MetadataExt;

        let template = template();
        let out = TempDir::new().unwrap();
        let project = out.path().join("here");
        std::fs::create_dir(&project).unwrap();
        let inode = std::fs::metadata(&project).unwrap().ino();

        copy_template(template.path(), &project).await.unwrap();

        assert_eq!(std::fs::metadata(&project).unwrap().ino(), inode);
        assert!(project.join("src/nested/ctp.json").is_file());
    }

    #[tokio::test]
    async fn test_failed_copy_leaves_existing_directory_empty() {
        let out = TempDir::new().unwrap();
        let project = out.path().join("here");
        std::fs::create_dir(&project).unwrap();

        let result = copy_template(&out.path().join("no-such-template"), &project).await;

        assert!(result.is_err());
        assert!(project.is_dir());
        assert_eq!(std::fs::read_dir(&project).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_refuses_non_empty_directory() {
        let template = template();
        let out = TempDir::new().unwrap();
        let project = out.path().join("my-app");
        std::fs::create_dir(&project).unwrap();
        std::fs::write(project.join("keep.txt"), "mine").unwrap();

        let result = copy_template(template.path(), &project).await;

        assert!(matches!(result, Err(CtpError::ProjectExists(_))));
        assert_eq!(std::fs::read_to_string(project.join("keep.txt")).unwrap(), "mine");
        assert!(!project.join("package.json").exists());
    }

    #[tokio::test]
    async fn test_missing_template_leaves_nothing() {
        let out = TempDir::new().unwrap();
        let project = out.path().join("my-app");

        let result = copy_template(&out.path().join("no-such-template"), &project).await;

        assert!(result.is_err());
        assert!(!project.exists());
        assert!(!out.path().join(".my-app.ctp-partial").exists());
    }
}
