use anyhow::Result;
use chrono::Utc;
use lectern_core::{LoadedSession, SessionIntegrity};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use super::{file_safe, load_session};
use crate::config::LecternConfig;
use crate::storage;
use crate::tracing_layer::RecoveryEvent;

/// Repairs `file` and writes the result to `output`, or back over `file`.
///
/// Before an in-place rewrite the original bytes are copied into the backup
/// directory, so nothing the recoverer dropped is lost for good.
pub fn run(config: &LecternConfig, file: &Path, output: Option<&Path>) -> Result<LoadedSession> {
    let integrity = SessionIntegrity::default();
    let loaded = load_session(&integrity, file)?;

    let target = match output {
        Some(path) => path,
        None => {
            if config.backup_before_write {
                let original = preserve_original(config, file, &loaded.session.id)?;
                println!("Original saved to {}", original.display());
            }
            file
        }
    };

    storage::write_json(target, &loaded.session, config.pretty)?;

    if loaded.repaired {
        println!(
            "Repaired {} ({} errors, {} warnings) -> {}",
            file.display(),
            loaded.report.errors.len(),
            loaded.report.warnings.len(),
            target.display()
        );
        for warning in &loaded.report.warnings {
            println!("  warning: {warning}");
        }
    } else {
        println!("{} needed no repair -> {}", file.display(), target.display());
    }

    Ok(loaded)
}

fn preserve_original(config: &LecternConfig, file: &Path, session_id: &str) -> Result<PathBuf> {
    let bytes = storage::read_text(file)?;
    let name = format!(
        "{}-{}.original.json",
        file_safe(session_id),
        Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
    );
    let path = config.resolved_backup_dir().join(name);
    storage::write_atomic(&path, bytes.as_bytes())?;
    Ok(path)
}

/// Prints every dropped-entry event captured during the run.
pub fn print_dropped(events: &mpsc::Receiver<RecoveryEvent>) {
    let dropped: Vec<RecoveryEvent> = events.try_iter().filter(RecoveryEvent::is_drop).collect();
    if dropped.is_empty() {
        println!("No entries were dropped");
        return;
    }

    println!("Dropped entries:");
    for event in dropped {
        let details: Vec<String> = event
            .fields
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        println!("  - {} ({})", event.message, details.join(", "));
    }
}
