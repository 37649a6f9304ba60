//! Structural validation of untrusted session values.

use super::decode::Fields;
use super::recoverer::Recoverer;
use crate::session::Session;
use serde::Serialize;
use serde_json::Value;

pub const NOT_AN_OBJECT: &str = "Session data is null or not an object";
pub const INVALID_ID: &str = "Missing or invalid session id";

/// Outcome of validating one session value.
///
/// `valid` is false whenever `errors` is non-empty. `recovered` is present
/// whenever any defect was found and the value was still a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered: Option<Session>,
}

impl ValidationReport {
    /// Whether the value was rejected outright, with nothing recovered.
    pub fn is_unrecoverable(&self) -> bool {
        !self.valid && self.recovered.is_none()
    }

    /// Whether any defect was found that recovery repaired.
    pub fn needs_repair(&self) -> bool {
        self.recovered.is_some()
    }

    fn unrecoverable() -> Self {
        Self {
            valid: false,
            errors: vec![NOT_AN_OBJECT.to_string()],
            warnings: Vec::new(),
            recovered: None,
        }
    }
}

/// Classifies values as valid, repairable or unrecoverable.
#[derive(Debug, Clone)]
pub struct Validator {
    recoverer: Recoverer,
}

impl Validator {
    pub fn new(recoverer: Recoverer) -> Self {
        Self { recoverer }
    }

    pub fn validate(&self, value: &Value) -> ValidationReport {
        if !value.is_object() {
            tracing::warn!("{}", NOT_AN_OBJECT);
            return ValidationReport::unrecoverable();
        }

        let (errors, warnings) = diagnose(Fields::new(value));

        if errors.is_empty() && warnings.is_empty() {
            return ValidationReport {
                valid: true,
                errors,
                warnings,
                recovered: None,
            };
        }

        tracing::info!(
            errors = errors.len(),
            warnings = warnings.len(),
            "Session data has defects, attempting recovery"
        );

        ValidationReport {
            valid: errors.is_empty(),
            recovered: Some(self.recoverer.recover(value)),
            errors,
            warnings,
        }
    }
}

fn diagnose(fields: Fields<'_>) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if fields.str("id").is_none() {
        errors.push(INVALID_ID.to_string());
    }
    if fields.str("name").is_none() {
        warnings.push("Missing session name".to_string());
    }
    if fields.millis("createdAt").is_none() {
        warnings.push("Missing createdAt timestamp".to_string());
    }

    match fields.array("slides") {
        Some(slides) => {
            for (position, slide) in slides.iter().enumerate() {
                let slide = Fields::new(slide);
                if !slide.is_record() {
                    warnings.push(format!("Slide {position}: not an object"));
                    continue;
                }
                if slide.str("id").is_none() {
                    warnings.push(format!("Slide {position}: missing id"));
                }
                if slide.index("index").is_none() {
                    warnings.push(format!("Slide {position}: missing index"));
                }
            }
        }
        None => warnings.push("Slides is not an array".to_string()),
    }

    if fields.object("notes").is_none() {
        warnings.push("Notes is not an object".to_string());
    }
    // Absent enhanced notes are a legal pre-v1 shape; only a wrong type is a defect.
    if fields.has("enhancedNotes") && fields.object("enhancedNotes").is_none() {
        warnings.push("Enhanced notes is not an object".to_string());
    }
    if fields.object("transcripts").is_none() {
        warnings.push("Transcripts is not an object".to_string());
    }
    if fields.array("aiConversations").is_none() {
        warnings.push("AI conversations is not an array".to_string());
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{FixedClock, SequentialIdGenerator};
    use serde_json::json;
    use std::sync::Arc;

    fn validator() -> Validator {
        Validator::new(Recoverer::new(
            Arc::new(SequentialIdGenerator::new("gen")),
            Arc::new(FixedClock(1_000)),
        ))
    }

    fn healthy() -> Value {
        json!({
            "id": "s1",
            "name": "Chemistry",
            "slides": [{"id": "slide-0", "index": 0, "imageData": "", "width": 800, "height": 600}],
            "notes": {},
            "enhancedNotes": {},
            "transcripts": {},
            "aiConversations": [],
            "currentSlideIndex": 0,
            "isRecording": false,
            "totalRecordingDuration": 0,
            "phase": "idle",
            "createdAt": 1,
            "updatedAt": 2,
            "schemaVersion": 1
        })
    }

    #[test]
    fn test_non_objects_are_unrecoverable() {
        for value in [json!(null), json!(42), json!("session"), json!([]), json!(true)] {
            let report = validator().validate(&value);
            assert!(!report.valid);
            assert_eq!(report.errors, vec![NOT_AN_OBJECT.to_string()]);
            assert!(report.warnings.is_empty());
            assert!(report.recovered.is_none());
            assert!(report.is_unrecoverable());
        }
    }

    #[test]
    fn test_healthy_session_skips_recovery() {
        let report = validator().validate(&healthy());
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert!(report.recovered.is_none());
        assert!(!report.needs_repair());
    }

    #[test]
    fn test_missing_id_is_an_error_but_still_recovers() {
        let mut value = healthy();
        value.as_object_mut().unwrap().remove("id");

        let report = validator().validate(&value);
        assert!(!report.valid);
        assert_eq!(report.errors, vec![INVALID_ID.to_string()]);
        let recovered = report.recovered.expect("recovered session");
        assert_eq!(recovered.id, "gen-1");
        assert_eq!(recovered.name, "Chemistry");
    }

    #[test]
    fn test_defaultable_fields_are_warnings() {
        let report = validator().validate(&json!({
            "id": "s1",
            "slides": "oops",
            "notes": [],
            "transcripts": 3,
            "aiConversations": {}
        }));

        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert_eq!(
            report.warnings,
            vec![
                "Missing session name",
                "Missing createdAt timestamp",
                "Slides is not an array",
                "Notes is not an object",
                "Transcripts is not an object",
                "AI conversations is not an array",
            ]
        );
        assert!(report.recovered.is_some());
    }

    #[test]
    fn test_slide_warnings_carry_position() {
        let mut value = healthy();
        value["slides"] = json!([{"id": "a", "index": 0}, {"index": 1}, {"id": "c"}, 5]);

        let report = validator().validate(&value);
        assert_eq!(
            report.warnings,
            vec![
                "Slide 1: missing id",
                "Slide 2: missing index",
                "Slide 3: not an object",
            ]
        );
        assert_eq!(report.recovered.unwrap().slides.len(), 3);
    }

    #[test]
    fn test_enhanced_notes_only_warn_on_wrong_type() {
        let mut value = healthy();
        value.as_object_mut().unwrap().remove("enhancedNotes");
        assert!(validator().validate(&value).warnings.is_empty());

        value["enhancedNotes"] = json!("corrupt");
        assert_eq!(
            validator().validate(&value).warnings,
            vec!["Enhanced notes is not an object"]
        );
    }

    #[test]
    fn test_report_serializes_without_empty_recovery() {
        let report = validator().validate(&healthy());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, json!({"valid": true, "errors": [], "warnings": []}));
    }
}
