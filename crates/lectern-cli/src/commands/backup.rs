use anyhow::{Context, Result, bail};
use chrono::Utc;
use lectern_core::{BackupInfo, Session, SessionIntegrity, inspect_backup};
use std::fs;
use std::path::{Path, PathBuf};

use super::{file_safe, load_session};
use crate::config::LecternConfig;
use crate::storage;

const BACKUP_SUFFIX: &str = ".backup.json";

/// Writes a backup envelope for `file` and returns where it went.
pub fn backup(config: &LecternConfig, file: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let integrity = SessionIntegrity::default();
    let loaded = load_session(&integrity, file)?;
    let envelope = integrity.create_backup(&loaded.session)?;

    let target = match output {
        Some(path) => path.to_path_buf(),
        None => config.resolved_backup_dir().join(format!(
            "{}-{}{}",
            file_safe(&loaded.session.id),
            Utc::now().format("%Y%m%dT%H%M%S%.3fZ"),
            BACKUP_SUFFIX
        )),
    };

    storage::write_atomic(&target, envelope.as_bytes())?;
    println!("Backed up {} -> {}", file.display(), target.display());
    Ok(target)
}

/// Restores the session in `backup` into `output`.
pub fn restore(config: &LecternConfig, backup: &Path, output: &Path) -> Result<Session> {
    let text = storage::read_text(backup)?;
    let Some(session) = SessionIntegrity::default().restore_from_backup(&text) else {
        bail!("{} is not a lectern backup", backup.display());
    };

    storage::write_json(output, &session, config.pretty)?;
    println!("Restored session {} -> {}", session.id, output.display());
    Ok(session)
}

/// Backups in the configured directory, oldest first.
pub fn collect(dir: &Path) -> Result<Vec<(PathBuf, BackupInfo)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        let is_backup = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(BACKUP_SUFFIX));
        if !is_backup {
            continue;
        }

        match inspect_backup(&storage::read_text(&path)?) {
            Some(info) => backups.push((path, info)),
            None => tracing::warn!("Skipping {}: not a backup envelope", path.display()),
        }
    }

    backups.sort_by(|(_, a), (_, b)| a.timestamp.cmp(&b.timestamp));
    Ok(backups)
}

pub fn list(config: &LecternConfig) -> Result<()> {
    let dir = config.resolved_backup_dir();
    let backups = collect(&dir)?;
    if backups.is_empty() {
        println!("No backups in {}", dir.display());
        return Ok(());
    }

    for (path, info) in backups {
        println!(
            "{}  {}  {}  {}",
            info.timestamp.as_deref().unwrap_or("-"),
            info.session_id.as_deref().unwrap_or("-"),
            info.session_name.as_deref().unwrap_or("-"),
            path.display()
        );
    }
    Ok(())
}
