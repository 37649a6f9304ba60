//! Workflow phase of a session.

use crate::error::IntegrityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The coarse workflow state of a session.
///
/// Variants are declared in the order a session normally moves through them,
/// so `Ord` reflects that progression. No transition guard is enforced here;
/// the phase is only ever inferred during migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nothing recorded yet.
    #[default]
    Idle,
    /// Audio capture is running.
    Recording,
    /// Transcripts exist and can be sent for enhancement.
    ReadyToEnhance,
    /// Enhancement requests are in flight.
    Enhancing,
    /// Enhanced notes are available.
    Enhanced,
}

impl SessionPhase {
    pub const ALL: [SessionPhase; 5] = [
        SessionPhase::Idle,
        SessionPhase::Recording,
        SessionPhase::ReadyToEnhance,
        SessionPhase::Enhancing,
        SessionPhase::Enhanced,
    ];

    /// Parses an untrusted string, returning `None` for anything that is not
    /// an exact wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "idle" => Some(Self::Idle),
            "recording" => Some(Self::Recording),
            "ready_to_enhance" => Some(Self::ReadyToEnhance),
            "enhancing" => Some(Self::Enhancing),
            "enhanced" => Some(Self::Enhanced),
            _ => None,
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::ReadyToEnhance => "ready_to_enhance",
            Self::Enhancing => "enhancing",
            Self::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionPhase {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| IntegrityError::invalid_enumerant("phase", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_every_wire_name() {
        for phase in SessionPhase::ALL {
            assert_eq!(SessionPhase::parse(phase.as_str()), Some(phase));
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(SessionPhase::parse("Recording"), None);
        assert_eq!(SessionPhase::parse("ready-to-enhance"), None);
        assert_eq!(SessionPhase::parse(""), None);
    }

    #[test]
    fn test_phases_are_ordered_by_progression() {
        assert!(SessionPhase::Idle < SessionPhase::Recording);
        assert!(SessionPhase::ReadyToEnhance < SessionPhase::Enhancing);
        assert!(SessionPhase::Enhancing < SessionPhase::Enhanced);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&SessionPhase::ReadyToEnhance).unwrap();
        assert_eq!(json, "\"ready_to_enhance\"");
    }

    #[test]
    fn test_from_str_reports_kind() {
        let err = "paused".parse::<SessionPhase>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid phase value: 'paused'");
    }
}
