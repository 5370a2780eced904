//! Log event documents and dotted-path field extraction.
//!
//! An event is one ingested log record: a free-text message, an ingest
//! timestamp, and a nested `metadata` document. Extraction walks dotted
//! paths into the metadata tree; when an intermediate key holds a list of
//! maps, the walk fans out element-wise and yields every candidate leaf
//! (existential semantics, matching a SQL `UNNEST` join).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use lql_parser::{EVENT_MESSAGE, TIMESTAMP};

/// One ingested log record. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub event_message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A value extracted from an event for one filter path.
///
/// The two system paths have dedicated representations; everything under
/// `metadata` is borrowed JSON.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldCandidate<'a> {
    Message(&'a str),
    Timestamp(DateTime<Utc>),
    Json(&'a Value),
}

impl LogEvent {
    pub fn new(event_message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        LogEvent {
            event_message: event_message.into(),
            timestamp,
            metadata: Map::new(),
        }
    }

    /// Attach a metadata document. Non-object values leave metadata empty.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        if let Value::Object(map) = metadata {
            self.metadata = map;
        }
        self
    }

    /// Extract every candidate value for a dotted path.
    ///
    /// An empty result means the path is missing from this event; a missing
    /// value fails every non-negated predicate and satisfies negated ones.
    pub fn extract(&self, path: &str) -> Vec<FieldCandidate<'_>> {
        if path == EVENT_MESSAGE {
            return vec![FieldCandidate::Message(&self.event_message)];
        }
        if path == TIMESTAMP {
            return vec![FieldCandidate::Timestamp(self.timestamp)];
        }

        let Some(rest) = path.strip_prefix("metadata.") else {
            return Vec::new();
        };
        let segments: Vec<&str> = rest.split('.').collect();

        let mut out = Vec::new();
        let (first, remaining) = segments.split_first().expect("path has segments");
        if let Some(value) = self.metadata.get(*first) {
            collect_candidates(value, remaining, &mut out);
        }
        out
    }
}

fn collect_candidates<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<FieldCandidate<'a>>) {
    match segments.split_first() {
        // Leaf reached: the whole value is one candidate, lists included
        // (container operators and element-wise matching happen downstream).
        None => out.push(FieldCandidate::Json(value)),
        Some((segment, rest)) => match value {
            Value::Object(map) => {
                if let Some(child) = map.get(*segment) {
                    collect_candidates(child, rest, out);
                }
            }
            // List-of-maps fan-out: resume the walk inside each element with
            // the same remaining path.
            Value::Array(items) => {
                for item in items {
                    if item.is_object() {
                        collect_candidates(item, segments, out);
                    }
                }
            }
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 17, 14, 35, 0).unwrap()
    }

    #[test]
    fn test_extract_message_and_timestamp() {
        let event = LogEvent::new("info count: 113", ts());
        assert_eq!(
            event.extract("event_message"),
            vec![FieldCandidate::Message("info count: 113")]
        );
        assert_eq!(
            event.extract("timestamp"),
            vec![FieldCandidate::Timestamp(ts())]
        );
    }

    #[test]
    fn test_extract_nested_metadata() {
        let event = LogEvent::new("m", ts())
            .with_metadata(json!({"request": {"url": "/api/user/4/sources"}}));
        let candidates = event.extract("metadata.request.url");
        assert_eq!(
            candidates,
            vec![FieldCandidate::Json(&json!("/api/user/4/sources"))]
        );
    }

    #[test]
    fn test_missing_intermediate_key_yields_nothing() {
        let event = LogEvent::new("m", ts()).with_metadata(json!({"request": {}}));
        assert!(event.extract("metadata.request.url").is_empty());
        assert!(event.extract("metadata.response.status").is_empty());
    }

    #[test]
    fn test_list_of_maps_fans_out() {
        let event = LogEvent::new("m", ts()).with_metadata(json!({
            "spans": [
                {"name": "db", "ms": 4},
                {"name": "render", "ms": 12},
            ]
        }));
        let candidates = event.extract("metadata.spans.ms");
        assert_eq!(
            candidates,
            vec![
                FieldCandidate::Json(&json!(4)),
                FieldCandidate::Json(&json!(12)),
            ]
        );
    }

    #[test]
    fn test_terminal_list_is_one_candidate() {
        let event =
            LogEvent::new("m", ts()).with_metadata(json!({"ids": [1, 2, 5, 0, -100, 1000000]}));
        let candidates = event.extract("metadata.ids");
        assert_eq!(candidates.len(), 1);
        assert!(matches!(candidates[0], FieldCandidate::Json(Value::Array(_))));
    }

    #[test]
    fn test_unknown_top_level_path_yields_nothing() {
        let event = LogEvent::new("m", ts());
        assert!(event.extract("not_a_field").is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let event = LogEvent::new("hello", ts()).with_metadata(json!({"a": {"b": 1}}));
        let json = serde_json::to_string(&event).unwrap();
        let back: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
