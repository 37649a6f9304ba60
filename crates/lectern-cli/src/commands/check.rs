use anyhow::Result;
use lectern_core::{IntegrityError, LoadedSession, SessionIntegrity};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::process::ExitCode;

use crate::storage;

/// Exit status for a record that is not a session at all.
const EXIT_UNRECOVERABLE: u8 = 2;
/// Exit status for a session that `repair` would change.
const EXIT_REPAIRABLE: u8 = 1;

#[derive(Debug, Serialize, PartialEq)]
pub struct CheckSummary {
    pub valid: bool,
    pub repairable: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<LoadedSession> for CheckSummary {
    fn from(loaded: LoadedSession) -> Self {
        Self {
            valid: loaded.report.valid,
            repairable: loaded.repaired,
            errors: loaded.report.errors,
            warnings: loaded.report.warnings,
        }
    }
}

impl CheckSummary {
    fn unrecoverable(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            repairable: false,
            errors,
            warnings: Vec::new(),
        }
    }

    pub fn exit_status(&self) -> u8 {
        if self.repairable {
            EXIT_REPAIRABLE
        } else if self.valid {
            0
        } else {
            EXIT_UNRECOVERABLE
        }
    }
}

/// Runs the same pipeline as `repair`, without writing anything.
pub fn inspect(text: &str) -> CheckSummary {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(err) => return CheckSummary::unrecoverable(vec![format!("Not valid JSON: {err}")]),
    };

    match SessionIntegrity::default().load_value(value) {
        Ok(loaded) => loaded.into(),
        Err(IntegrityError::Unrecoverable { errors }) => CheckSummary::unrecoverable(errors),
        Err(err) => CheckSummary::unrecoverable(vec![err.to_string()]),
    }
}

pub fn run(file: &Path, json: bool) -> Result<ExitCode> {
    let text = storage::read_text(file)?;
    let summary = inspect(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let verdict = match summary.exit_status() {
            0 => "valid",
            EXIT_REPAIRABLE if summary.valid => "valid (repair would change it)",
            EXIT_REPAIRABLE => "invalid (repairable)",
            _ => "unrecoverable",
        };
        println!("{}: {}", file.display(), verdict);
        for error in &summary.errors {
            println!("  error: {error}");
        }
        for warning in &summary.warnings {
            println!("  warning: {warning}");
        }
    }

    Ok(ExitCode::from(summary.exit_status()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_json_is_unrecoverable() {
        let summary = inspect("{oops");
        assert!(!summary.valid);
        assert_eq!(summary.exit_status(), EXIT_UNRECOVERABLE);
        assert!(summary.errors[0].starts_with("Not valid JSON"));
    }

    #[test]
    fn test_non_record_is_unrecoverable() {
        assert_eq!(inspect("[1, 2]").exit_status(), EXIT_UNRECOVERABLE);
    }

    #[test]
    fn test_missing_id_is_repairable() {
        let summary = inspect(r#"{"name": "x"}"#);
        assert_eq!(summary.exit_status(), EXIT_REPAIRABLE);
        assert!(summary.repairable);
    }

    #[test]
    fn test_top_level_warnings_are_repairable() {
        let summary = inspect(r#"{"id": "s1"}"#);
        assert!(summary.valid);
        assert!(summary.repairable);
        assert!(!summary.warnings.is_empty());
        assert_eq!(summary.exit_status(), EXIT_REPAIRABLE);
    }

    #[test]
    fn test_intact_session_passes() {
        let text = serde_json::to_string(&lectern_core::Session::new("s1", "Deck", 0)).unwrap();
        let summary = inspect(&text);
        assert!(summary.valid);
        assert!(!summary.repairable);
        assert!(summary.warnings.is_empty());
        assert_eq!(summary.exit_status(), 0);
    }

    #[test]
    fn test_nested_defects_are_repairable() {
        // The top level is intact; only the note lacks its timestamps.
        let mut value = serde_json::to_value(lectern_core::Session::new("s1", "Deck", 0)).unwrap();
        value["notes"] = serde_json::json!({"slide-0": {"id": "n1", "slideId": "slide-0"}});

        let summary = inspect(&value.to_string());
        assert!(summary.valid);
        assert!(summary.repairable);
        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.exit_status(), EXIT_REPAIRABLE);
    }
}
