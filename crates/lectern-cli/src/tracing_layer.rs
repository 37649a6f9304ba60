//! Tracing layer that captures recovery events from `lectern_core`.
//!
//! The recoverer reports every entry it drops as a debug event. This layer
//! forwards those events over a channel so `repair --verbose` can list them
//! after the run, independent of the console log level. It is installed only
//! for that command.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// One captured log event.
#[derive(Debug, Clone)]
pub struct RecoveryEvent {
    /// Human-readable message
    pub message: String,
    /// Structured fields from the event, without the message
    pub fields: BTreeMap<String, Value>,
}

impl RecoveryEvent {
    /// Whether the event reports an entry that was dropped during recovery.
    pub fn is_drop(&self) -> bool {
        self.message.starts_with("Dropped")
    }
}

pub struct RecoveryEventLayer {
    sender: mpsc::Sender<RecoveryEvent>,
}

impl RecoveryEventLayer {
    pub fn new(sender: mpsc::Sender<RecoveryEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for RecoveryEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        let mut visitor = FieldVisitor(&mut fields);
        event.record(&mut visitor);

        let message = match fields.remove("message") {
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        // The receiver may already be gone at shutdown; events are best effort.
        let _ = self.sender.send(RecoveryEvent { message, fields });
    }
}

/// Field visitor that extracts tracing event fields into a map
struct FieldVisitor<'a>(&'a mut BTreeMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    #[test]
    fn test_layer_captures_structured_fields() {
        let (sender, receiver) = mpsc::channel();
        let subscriber = tracing_subscriber::registry().with(RecoveryEventLayer::new(sender));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(position = 3_usize, slide_id = "s-1", "Dropped slide that is not an object");
        });

        let event = receiver.try_recv().unwrap();
        assert!(event.is_drop());
        assert_eq!(event.message, "Dropped slide that is not an object");
        assert_eq!(event.fields["position"], serde_json::json!(3));
        assert_eq!(event.fields["slide_id"], serde_json::json!("s-1"));
    }
}
