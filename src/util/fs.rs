//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Recursively copy a directory.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create directory: {}", dst.display()))?;

    for entry in
        fs::read_dir(src).with_context(|| format!("failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    src_path.display(),
                    dst_path.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Mirror `src` into `dst`: the destination is removed, recreated, and
/// repopulated, so anything present only at the destination is gone
/// afterwards. Returns the number of files copied.
pub fn mirror_dir(src: &Path, dst: &Path) -> Result<usize> {
    remove_dir_all_if_exists(dst)?;
    copy_dir_all(src, dst)?;

    let copied = WalkDir::new(dst)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count();

    Ok(copied)
}

/// Append text to a file without touching existing content, creating the
/// file if it does not exist.
pub fn append_to_file(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_all() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("file.txt"), "content").unwrap();
        fs::write(src.join("nested/inner.txt"), "inner").unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("file.txt")).unwrap(), "content");
        assert_eq!(
            fs::read_to_string(dst.join("nested/inner.txt")).unwrap(),
            "inner"
        );
    }

    #[test]
    fn test_mirror_removes_stale_destination_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("kept.txt"), "kept").unwrap();

        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("stale.txt"), "stale").unwrap();

        let copied = mirror_dir(&src, &dst).unwrap();

        assert_eq!(copied, 1);
        assert!(dst.join("kept.txt").exists());
        assert!(!dst.join("stale.txt").exists());
    }

    #[test]
    fn test_append_preserves_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("conf");

        fs::write(&path, "line one\n").unwrap();
        append_to_file(&path, "line two\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn test_append_creates_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fresh");

        append_to_file(&path, "first\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");
    }
}
