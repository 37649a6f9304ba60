use anyhow::{Context, Result};
use lectern_core::{Session, SessionDocument, SessionIntegrity};
use serde_json::Value;
use std::path::Path;

use crate::config::LecternConfig;
use crate::storage;

/// Upgrades a well-formed session file without repairing it.
///
/// Files that do not decode strictly are rejected; `repair` handles those.
pub fn run(config: &LecternConfig, file: &Path, output: Option<&Path>) -> Result<Session> {
    let text = storage::read_text(file)?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let document = SessionDocument::from_value(value).with_context(|| {
        format!(
            "{} is not a well-formed session; run `lectern repair` first",
            file.display()
        )
    })?;

    let from_version = document.schema_version;
    let session = SessionIntegrity::default().migrate_document(document);
    let target = output.unwrap_or(file);
    storage::write_json(target, &session, config.pretty)?;

    println!(
        "Migrated {} from schema {} to {} -> {}",
        file.display(),
        from_version,
        session.schema_version,
        target.display()
    );
    Ok(session)
}
