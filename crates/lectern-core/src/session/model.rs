//! Session domain model.
//!
//! This module contains the root aggregate that is persisted as one record
//! per working session.

use super::conversation::AiConversation;
use super::note::{EnhancedNote, Note};
use super::phase::SessionPhase;
use super::slide::Slide;
use super::transcript::TranscriptSegment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The schema version written by this build.
///
/// Bumping it is what gates a new step in the migration registry.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Represents one user working session.
///
/// A session contains:
/// - The imported document pages (slides), in document order
/// - One user note and at most one enhanced note per slide, keyed by slide id
/// - Transcript segments per slide, keyed by slide id
/// - AI chat history
/// - Recording state and the coarse workflow phase
///
/// The session exclusively owns everything reachable from it. Every field is
/// required except `recording_start_time` and `pdf_file_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Display name
    pub name: String,
    pub slides: Vec<Slide>,
    /// User notes keyed by slide id
    pub notes: BTreeMap<String, Note>,
    /// Enhanced notes keyed by slide id
    pub enhanced_notes: BTreeMap<String, EnhancedNote>,
    /// Transcript segments keyed by slide id, in recognition order
    pub transcripts: BTreeMap<String, Vec<TranscriptSegment>>,
    pub ai_conversations: Vec<AiConversation>,
    pub current_slide_index: usize,
    pub is_recording: bool,
    /// Epoch milliseconds when the current recording started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_start_time: Option<i64>,
    /// Accumulated recording time in milliseconds
    pub total_recording_duration: u64,
    /// Name of the imported document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_file_name: Option<String>,
    pub phase: SessionPhase,
    pub created_at: i64,
    pub updated_at: i64,
    pub schema_version: u32,
}

impl Session {
    /// Creates an empty, idle session at the current schema version.
    pub fn new(id: impl Into<String>, name: impl Into<String>, now_millis: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slides: Vec::new(),
            notes: BTreeMap::new(),
            enhanced_notes: BTreeMap::new(),
            transcripts: BTreeMap::new(),
            ai_conversations: Vec::new(),
            current_slide_index: 0,
            is_recording: false,
            recording_start_time: None,
            total_recording_duration: 0,
            pdf_file_name: None,
            phase: SessionPhase::Idle,
            created_at: now_millis,
            updated_at: now_millis,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Slide ids in document order.
    pub fn slide_ids(&self) -> Vec<&str> {
        self.slides.iter().map(|slide| slide.id.as_str()).collect()
    }

    /// Total number of transcript segments across all slides.
    pub fn transcript_segment_count(&self) -> usize {
        self.transcripts.values().map(Vec::len).sum()
    }

    /// Describes every entity that breaks an ownership or range rule the
    /// type system cannot express.
    ///
    /// Keyed entities must name the slide they are stored under, and
    /// transcript confidence must lie in `[0, 1]`. An empty list means the
    /// session is intact.
    pub fn defects(&self) -> Vec<String> {
        let mut defects = Vec::new();

        for (key, note) in &self.notes {
            if note.slide_id != *key {
                defects.push(format!(
                    "Note '{}' is stored under slide '{key}' but names slide '{}'",
                    note.id, note.slide_id
                ));
            }
        }
        for (key, note) in &self.enhanced_notes {
            if note.slide_id != *key {
                defects.push(format!(
                    "Enhanced note '{}' is stored under slide '{key}' but names slide '{}'",
                    note.id, note.slide_id
                ));
            }
        }
        for (key, segments) in &self.transcripts {
            for segment in segments {
                if segment.slide_id != *key {
                    defects.push(format!(
                        "Transcript segment '{}' is stored under slide '{key}' but names slide '{}'",
                        segment.id, segment.slide_id
                    ));
                }
                if !(0.0..=1.0).contains(&segment.confidence) {
                    defects.push(format!(
                        "Transcript segment '{}' has confidence {} outside [0, 1]",
                        segment.id, segment.confidence
                    ));
                }
            }
        }

        defects
    }
}
