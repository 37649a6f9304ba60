//! Schema-tolerant session shape.
//!
//! `SessionDocument` accepts every schema version this build knows about.
//! Fields introduced by a later schema are optional here and filled in by the
//! migration chain before the document becomes a [`Session`].

use super::traits::Versioned;
use crate::error::Result;
use crate::session::{
    AiConversation, EnhancedNote, Note, Session, SessionPhase, Slide, TranscriptSegment,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub id: String,
    pub name: String,
    pub slides: Vec<Slide>,
    pub notes: BTreeMap<String, Note>,
    /// Added in schema version 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_notes: Option<BTreeMap<String, EnhancedNote>>,
    pub transcripts: BTreeMap<String, Vec<TranscriptSegment>>,
    pub ai_conversations: Vec<AiConversation>,
    pub current_slide_index: usize,
    pub is_recording: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_start_time: Option<i64>,
    /// Added in schema version 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_recording_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_file_name: Option<String>,
    /// Added in schema version 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<SessionPhase>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Documents written before versioning carry no version and count as 0.
    #[serde(default)]
    pub schema_version: u32,
}

impl SessionDocument {
    /// Strictly decodes a value; any missing required field is an error.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl Versioned for SessionDocument {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn stamp_version(&mut self, version: u32) {
        self.schema_version = version;
    }
}

impl From<Session> for SessionDocument {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            name: session.name,
            slides: session.slides,
            notes: session.notes,
            enhanced_notes: Some(session.enhanced_notes),
            transcripts: session.transcripts,
            ai_conversations: session.ai_conversations,
            current_slide_index: session.current_slide_index,
            is_recording: session.is_recording,
            recording_start_time: session.recording_start_time,
            total_recording_duration: Some(session.total_recording_duration),
            pdf_file_name: session.pdf_file_name,
            phase: Some(session.phase),
            created_at: session.created_at,
            updated_at: session.updated_at,
            schema_version: session.schema_version,
        }
    }
}

/// Convert a migrated document into the domain model.
///
/// After the chain has run every optional field is populated; the defaults
/// below only apply to documents that skipped migration.
impl From<SessionDocument> for Session {
    fn from(document: SessionDocument) -> Self {
        Session {
            id: document.id,
            name: document.name,
            slides: document.slides,
            notes: document.notes,
            enhanced_notes: document.enhanced_notes.unwrap_or_default(),
            transcripts: document.transcripts,
            ai_conversations: document.ai_conversations,
            current_slide_index: document.current_slide_index,
            is_recording: document.is_recording,
            recording_start_time: document.recording_start_time,
            total_recording_duration: document.total_recording_duration.unwrap_or_default(),
            pdf_file_name: document.pdf_file_name,
            phase: document.phase.unwrap_or_default(),
            created_at: document.created_at,
            updated_at: document.updated_at,
            schema_version: document.schema_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_v0_document_decodes_without_new_fields() {
        let document = SessionDocument::from_value(json!({
            "id": "s1",
            "name": "Old",
            "slides": [],
            "notes": {},
            "transcripts": {},
            "aiConversations": [],
            "currentSlideIndex": 0,
            "isRecording": false,
            "createdAt": 1,
            "updatedAt": 2
        }))
        .unwrap();

        assert_eq!(document.schema_version, 0);
        assert_eq!(document.enhanced_notes, None);
        assert_eq!(document.phase, None);
        assert_eq!(document.total_recording_duration, None);
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let err = SessionDocument::from_value(json!({"id": "s1"})).unwrap_err();
        assert!(!err.is_parse());
    }

    #[test]
    fn test_session_conversion_is_lossless() {
        let mut session = Session::new("s1", "Roundtrip", 5);
        session.pdf_file_name = Some("deck.pdf".to_string());
        session.phase = SessionPhase::Enhancing;
        session.total_recording_duration = 1200;

        let back: Session = SessionDocument::from(session.clone()).into();
        assert_eq!(back, session);
    }
}
