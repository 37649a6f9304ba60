//! Backup envelope encoding.
//!
//! A backup is the session wrapped as
//! `{ "backup": true, "timestamp": <ISO-8601>, "session": <Session> }`.
//! Anything else is "not a backup".

use super::decode::{Fields, is_truthy};
use crate::error::Result;
use crate::session::Session;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The typed backup envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupEnvelope {
    pub backup: bool,
    pub timestamp: String,
    pub session: Session,
}

#[derive(Serialize)]
struct BorrowedEnvelope<'a> {
    backup: bool,
    timestamp: String,
    session: &'a Session,
}

/// Summary of a backup, read without restoring it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub timestamp: Option<String>,
    pub session_id: Option<String>,
    pub session_name: Option<String>,
}

/// Formats epoch milliseconds the way `Date.prototype.toISOString` does.
pub fn iso_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn encode(session: &Session, now_millis: i64) -> Result<String> {
    let envelope = BorrowedEnvelope {
        backup: true,
        timestamp: iso_timestamp(now_millis),
        session,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parses `text` and returns the envelope object if it is shaped like a
/// backup: a truthy `backup` marker and an object `session` member.
pub(crate) fn open(text: &str) -> Option<serde_json::Map<String, Value>> {
    let value: Value = serde_json::from_str(text).ok()?;
    let Value::Object(envelope) = value else {
        return None;
    };

    let fields = Fields::of(&envelope);
    let marked = fields.get("backup").is_some_and(is_truthy);
    if !marked || fields.object("session").is_none() {
        return None;
    }
    Some(envelope)
}

/// Reads the timestamp and session identity of a backup.
pub fn inspect(text: &str) -> Option<BackupInfo> {
    let envelope = open(text)?;
    let fields = Fields::of(&envelope);
    let session = fields.object("session").map(Fields::of);
    Some(BackupInfo {
        timestamp: fields.string("timestamp"),
        session_id: session.and_then(|s| s.string("id")),
        session_name: session.and_then(|s| s.string("name")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_timestamp_matches_javascript_format() {
        assert_eq!(iso_timestamp(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso_timestamp(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_encode_produces_envelope() {
        let session = Session::new("s1", "Deck", 0);
        let text = encode(&session, 0).unwrap();
        let envelope: BackupEnvelope = serde_json::from_str(&text).unwrap();
        assert!(envelope.backup);
        assert_eq!(envelope.timestamp, "1970-01-01T00:00:00.000Z");
        assert_eq!(envelope.session, session);
    }

    #[test]
    fn test_open_rejects_non_backups() {
        assert!(open("invalid json").is_none());
        assert!(open(r#"{"foo":"bar"}"#).is_none());
        assert!(open(r#"[1,2]"#).is_none());
        assert!(open(r#"{"backup":false,"session":{}}"#).is_none());
        assert!(open(r#"{"backup":true}"#).is_none());
        assert!(open(r#"{"backup":true,"session":"s"}"#).is_none());
        assert!(open(r#"{"backup":1,"session":{}}"#).is_some());
    }

    #[test]
    fn test_inspect_reads_identity() {
        let info = inspect(r#"{"backup":true,"timestamp":"t","session":{"id":"s1","name":"Deck"}}"#)
            .unwrap();
        assert_eq!(info.timestamp.as_deref(), Some("t"));
        assert_eq!(info.session_id.as_deref(), Some("s1"));
        assert_eq!(info.session_name.as_deref(), Some("Deck"));
    }
}
