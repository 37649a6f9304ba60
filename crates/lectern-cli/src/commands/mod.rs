pub mod backup;
pub mod check;
pub mod migrate;
pub mod repair;

use anyhow::{Context, Result};
use lectern_core::{LoadedSession, SessionIntegrity};
use std::path::Path;

use crate::storage;

/// Reads a session file and runs it through the full load pipeline.
pub fn load_session(integrity: &SessionIntegrity, path: &Path) -> Result<LoadedSession> {
    let text = storage::read_text(path)?;
    integrity
        .load_str(&text)
        .with_context(|| format!("Failed to load session from {}", path.display()))
}

/// Makes a session id safe to use inside a file name.
fn file_safe(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if safe.is_empty() { "session".to_string() } else { safe }
}
