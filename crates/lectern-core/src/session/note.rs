//! User notes and their AI-enhanced counterparts.

use crate::error::IntegrityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user's handwritten or typed note for one slide.
///
/// `slide_id` always equals the key the note is stored under in
/// [`Session::notes`](super::Session::notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub slide_id: String,
    /// Rich editor content
    pub content: String,
    /// Plain-text projection of `content`
    pub plain_text: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Lifecycle of an enhancement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementStatus {
    Pending,
    Generating,
    /// The model finished; the user has not reviewed the result yet.
    #[default]
    Complete,
    Error,
    Accepted,
    Rejected,
}

impl EnhancementStatus {
    pub const ALL: [EnhancementStatus; 6] = [
        EnhancementStatus::Pending,
        EnhancementStatus::Generating,
        EnhancementStatus::Complete,
        EnhancementStatus::Error,
        EnhancementStatus::Accepted,
        EnhancementStatus::Rejected,
    ];

    /// Parses an untrusted status string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "generating" => Some(Self::Generating),
            "complete" => Some(Self::Complete),
            "error" => Some(Self::Error),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for EnhancementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnhancementStatus {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| IntegrityError::invalid_enumerant("status", s))
    }
}

/// An AI-enhanced version of a slide's note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedNote {
    pub id: String,
    pub slide_id: String,
    pub content: String,
    pub plain_text: String,
    pub status: EnhancementStatus,
    /// Failure description when `status` is `Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub enhanced_at: i64,
}
