//! File access for session and backup files.
//!
//! Writes go through a temporary file in the target directory, are synced,
//! and then renamed over the destination, so a crash never leaves a
//! half-written session behind.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Serializes `data` as JSON and writes it atomically.
pub fn write_json<T: Serialize>(path: &Path, data: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(data)
    } else {
        serde_json::to_string(data)
    }
    .context("Failed to serialize JSON")?;
    write_atomic(path, json.as_bytes())
}

/// Writes bytes to `path` via tmp file + fsync + rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let tmp_path = temp_path(path)?;
    {
        let mut tmp_file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        tmp_file.write_all(bytes)?;
        tmp_file.sync_all()?;
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("Failed to move {} into place", path.display()));
    }
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(format!(".tmp.{}", std::process::id()));
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parent_and_leaves_no_temp() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("session.json");

        write_atomic(&path, b"{}").unwrap();

        assert_eq!(read_text(&path).unwrap(), "{}");
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_json_respects_pretty_flag() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.json");
        let data = serde_json::json!({"a": 1});

        write_json(&path, &data, false).unwrap();
        assert_eq!(read_text(&path).unwrap(), r#"{"a":1}"#);

        write_json(&path, &data, true).unwrap();
        assert!(read_text(&path).unwrap().contains('\n'));
    }

    #[test]
    fn test_read_missing_file_names_the_path() {
        let err = read_text(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
