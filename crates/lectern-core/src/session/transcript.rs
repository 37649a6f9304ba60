use serde::{Deserialize, Serialize};

/// A piece of speech-to-text output attributed to one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub id: String,
    pub slide_id: String,
    pub text: String,
    /// Milliseconds from session start
    pub start_time: f64,
    /// Milliseconds from session start
    pub end_time: f64,
    /// Recognizer confidence in `[0, 1]`
    pub confidence: f64,
}
