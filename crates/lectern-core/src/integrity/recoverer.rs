//! Best-effort reconstruction of damaged session records.
//!
//! Each field is recovered independently through [`Fields`]: a defect in one
//! field never influences how another is recovered. Individual collection
//! entries that cannot be trusted are dropped, shrinking the collection.

use super::decode::Fields;
use crate::identity::{Clock, IdGenerator};
use crate::session::{
    AiConversation, AiMessage, CURRENT_SCHEMA_VERSION, DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH,
    EnhancedNote, EnhancementStatus, MessageRole, Note, Session, SessionPhase, Slide,
    TranscriptSegment,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name given to sessions whose name could not be recovered.
pub const RECOVERED_SESSION_NAME: &str = "Recovered Session";

/// Rebuilds a fully well-typed [`Session`] from a loosely-typed value.
#[derive(Clone)]
pub struct Recoverer {
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Recoverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recoverer")
            .field("ids", &"<dyn IdGenerator>")
            .field("clock", &"<dyn Clock>")
            .finish()
    }
}

impl Recoverer {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { ids, clock }
    }

    /// Recovers a session from any value.
    ///
    /// A value that is not an object is treated as an empty record, so the
    /// result is a fresh session with synthesized id and defaults.
    pub fn recover(&self, value: &Value) -> Session {
        let fields = Fields::new(value);
        // One timestamp for every defaulted field keeps the output coherent.
        let now = self.clock.now_millis();

        let id = fields.string_or_else("id", || self.ids.next_id());
        let slides = self.recover_slides(fields.array("slides"));
        let notes = self.recover_keyed(fields.object("notes"), "note", |slide_id, note| {
            self.recover_note(slide_id, note, now)
        });
        let enhanced_notes = self.recover_keyed(
            fields.object("enhancedNotes"),
            "enhanced note",
            |slide_id, note| self.recover_enhanced_note(slide_id, note, now),
        );
        let transcripts = self.recover_transcripts(fields.object("transcripts"));
        let ai_conversations = self.recover_conversations(fields.array("aiConversations"), &id, now);

        let session = Session {
            name: fields.str_or("name", RECOVERED_SESSION_NAME),
            slides,
            notes,
            enhanced_notes,
            transcripts,
            ai_conversations,
            current_slide_index: fields.index_or("currentSlideIndex", 0),
            is_recording: fields.bool_or("isRecording", false),
            recording_start_time: fields.millis("recordingStartTime"),
            total_recording_duration: fields.u64_or("totalRecordingDuration", 0),
            pdf_file_name: fields.string("pdfFileName"),
            phase: fields
                .enumerant("phase", SessionPhase::parse)
                .unwrap_or(SessionPhase::Idle),
            created_at: fields.millis_or_else("createdAt", || now),
            updated_at: fields.millis_or_else("updatedAt", || now),
            schema_version: CURRENT_SCHEMA_VERSION,
            id,
        };

        tracing::info!(
            session_id = %session.id,
            slides = session.slides.len(),
            notes = session.notes.len(),
            enhanced_notes = session.enhanced_notes.len(),
            transcript_segments = session.transcript_segment_count(),
            conversations = session.ai_conversations.len(),
            "Recovered session"
        );

        session
    }

    fn recover_slides(&self, source: Option<&Vec<Value>>) -> Vec<Slide> {
        let Some(entries) = source else {
            return Vec::new();
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let slide = entry.as_object().map(|map| recover_slide(position, map));
                if slide.is_none() {
                    tracing::debug!(position, "Dropped slide that is not an object");
                }
                slide
            })
            .collect()
    }

    /// Recovers a slide-id keyed map, forcing each value's owner to its key.
    fn recover_keyed<T>(
        &self,
        source: Option<&Map<String, Value>>,
        kind: &'static str,
        recover: impl Fn(&str, &Map<String, Value>) -> T,
    ) -> BTreeMap<String, T> {
        let Some(entries) = source else {
            return BTreeMap::new();
        };

        entries
            .iter()
            .filter_map(|(slide_id, entry)| match entry.as_object() {
                Some(map) => Some((slide_id.clone(), recover(slide_id, map))),
                None => {
                    tracing::debug!(slide_id = %slide_id, kind, "Dropped entry that is not an object");
                    None
                }
            })
            .collect()
    }

    fn recover_note(&self, slide_id: &str, map: &Map<String, Value>, now: i64) -> Note {
        let fields = Fields::of(map);
        Note {
            id: fields.string_or_else("id", || self.ids.next_id()),
            slide_id: slide_id.to_string(),
            content: fields.str_or("content", ""),
            plain_text: fields.str_or("plainText", ""),
            created_at: fields.millis_or_else("createdAt", || now),
            updated_at: fields.millis_or_else("updatedAt", || now),
        }
    }

    fn recover_enhanced_note(
        &self,
        slide_id: &str,
        map: &Map<String, Value>,
        now: i64,
    ) -> EnhancedNote {
        let fields = Fields::of(map);
        EnhancedNote {
            id: fields.string_or_else("id", || self.ids.next_id()),
            slide_id: slide_id.to_string(),
            content: fields.str_or("content", ""),
            plain_text: fields.str_or("plainText", ""),
            status: fields
                .enumerant("status", EnhancementStatus::parse)
                .unwrap_or(EnhancementStatus::Complete),
            error: fields.string("error"),
            enhanced_at: fields.millis_or_else("enhancedAt", || now),
        }
    }

    fn recover_transcripts(
        &self,
        source: Option<&Map<String, Value>>,
    ) -> BTreeMap<String, Vec<TranscriptSegment>> {
        let Some(entries) = source else {
            return BTreeMap::new();
        };

        let mut transcripts = BTreeMap::new();
        for (slide_id, entry) in entries {
            let Some(segments) = entry.as_array() else {
                tracing::debug!(slide_id = %slide_id, "Dropped transcript that is not an array");
                continue;
            };

            let recovered: Vec<TranscriptSegment> = segments
                .iter()
                .enumerate()
                .filter_map(|(position, segment)| match segment.as_object() {
                    Some(map) => Some(self.recover_segment(slide_id, map)),
                    None => {
                        tracing::debug!(slide_id = %slide_id, position, "Dropped transcript segment that is not an object");
                        None
                    }
                })
                .collect();
            transcripts.insert(slide_id.clone(), recovered);
        }
        transcripts
    }

    fn recover_segment(&self, slide_id: &str, map: &Map<String, Value>) -> TranscriptSegment {
        let fields = Fields::of(map);
        TranscriptSegment {
            id: fields.string_or_else("id", || self.ids.next_id()),
            slide_id: slide_id.to_string(),
            text: fields.str_or("text", ""),
            start_time: fields.number_or("startTime", 0.0),
            end_time: fields.number_or("endTime", 0.0),
            confidence: fields.number_or("confidence", 0.0).clamp(0.0, 1.0),
        }
    }

    fn recover_conversations(
        &self,
        source: Option<&Vec<Value>>,
        session_id: &str,
        now: i64,
    ) -> Vec<AiConversation> {
        let Some(entries) = source else {
            return Vec::new();
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| match entry.as_object() {
                Some(map) => Some(self.recover_conversation(map, session_id, now)),
                None => {
                    tracing::debug!(position, "Dropped conversation that is not an object");
                    None
                }
            })
            .collect()
    }

    fn recover_conversation(
        &self,
        map: &Map<String, Value>,
        session_id: &str,
        now: i64,
    ) -> AiConversation {
        let fields = Fields::of(map);
        let id = fields.string_or_else("id", || self.ids.next_id());

        let messages = fields
            .array("messages")
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .filter_map(|(position, entry)| {
                        let message = self.recover_message(entry);
                        if message.is_none() {
                            tracing::debug!(conversation_id = %id, position, "Dropped message without a valid role");
                        }
                        message
                    })
                    .collect()
            })
            .unwrap_or_default();

        AiConversation {
            session_id: fields.string_or_else("sessionId", || session_id.to_string()),
            messages,
            created_at: fields.millis_or_else("createdAt", || now),
            id,
        }
    }

    /// A message is only recoverable when its role is one of the known
    /// roles; the role decides how it is rendered and is never guessed.
    fn recover_message(&self, entry: &Value) -> Option<AiMessage> {
        let fields = Fields::new(entry);
        let role = fields.enumerant("role", MessageRole::parse)?;
        Some(AiMessage {
            id: fields.string_or_else("id", || self.ids.next_id()),
            role,
            content: fields.str_or("content", ""),
            timestamp: fields.millis("timestamp"),
        })
    }
}

/// Slide ids fall back to `slide-<position>` using the position in the
/// source array. That can collide with a neighbour's real id; collisions are
/// kept as-is.
fn recover_slide(position: usize, map: &Map<String, Value>) -> Slide {
    let fields = Fields::of(map);
    Slide {
        id: fields.string_or_else("id", || format!("slide-{position}")),
        index: fields.index_or("index", position),
        image_data: fields.str_or("imageData", ""),
        width: fields.u32_or("width", DEFAULT_SLIDE_WIDTH),
        height: fields.u32_or("height", DEFAULT_SLIDE_HEIGHT),
        extracted_text: fields.string("extractedText"),
    }
}
