//! In-memory table schema: the set of known field paths and their types.
//!
//! The parser resolves every `path:` term against a [`Schema`] so that rule
//! values are fully typed at parse time. Schemas are built either from
//! explicit descriptors ([`SchemaBuilder`]) or inferred recursively from a
//! sample `metadata` document ([`Schema::from_metadata_sample`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Path of the free-text message field, always present.
pub const EVENT_MESSAGE: &str = "event_message";

/// Path of the ingest timestamp field, always present.
pub const TIMESTAMP: &str = "timestamp";

// =============================================================================
// FieldType
// =============================================================================

/// Semantic type of a schema field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Date,
    List(Box<FieldType>),
    /// Interior node: a nested map with typed children, not filterable itself.
    Object,
}

impl FieldType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::DateTime | FieldType::Date)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::DateTime => write!(f, "datetime"),
            FieldType::Date => write!(f, "date"),
            FieldType::List(elem) => write!(f, "list<{elem}>"),
            FieldType::Object => write!(f, "object"),
        }
    }
}

// =============================================================================
// Schema
// =============================================================================

/// A table schema: unique fully-qualified paths mapped to semantic types.
///
/// `event_message` and `timestamp` are always present. The map is ordered so
/// [`Schema::paths`] enumerates deterministically (error suggestions, tests).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: BTreeMap<String, FieldType>,
}

impl Schema {
    /// A schema containing only the two system paths.
    pub fn new() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(EVENT_MESSAGE.to_string(), FieldType::String);
        fields.insert(TIMESTAMP.to_string(), FieldType::DateTime);
        Schema { fields }
    }

    /// Start building a schema from explicit field descriptors.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            schema: Schema::new(),
        }
    }

    /// Infer a schema from a sample `metadata` document.
    ///
    /// Types are inferred as: integer for whole-number samples, float for any
    /// sample with a decimal point, boolean for `true`/`false`, string
    /// otherwise. A list is typed by its first element; nested maps become
    /// `Object` interior nodes with dotted child paths. All inferred paths
    /// are prefixed `metadata.`; null samples carry no type and are skipped.
    pub fn from_metadata_sample(sample: &serde_json::Value) -> Self {
        let mut schema = Schema::new();
        if let serde_json::Value::Object(map) = sample {
            schema.fields.insert("metadata".to_string(), FieldType::Object);
            for (key, value) in map {
                infer_into(&mut schema.fields, &format!("metadata.{key}"), value);
            }
        }
        schema
    }

    /// Resolve a path to its semantic type.
    pub fn resolve(&self, path: &str) -> Option<&FieldType> {
        self.fields.get(path)
    }

    pub fn is_numeric(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(FieldType::is_numeric)
    }

    pub fn is_temporal(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(FieldType::is_temporal)
    }

    pub fn is_string(&self, path: &str) -> bool {
        self.resolve(path) == Some(&FieldType::String)
    }

    pub fn is_list(&self, path: &str) -> bool {
        matches!(self.resolve(path), Some(FieldType::List(_)))
    }

    /// All known paths, in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The known path closest to `path`, when one is plausibly a typo match.
    ///
    /// Only leaf paths within a small edit distance are considered, so wildly
    /// wrong paths produce no suggestion rather than a misleading one.
    pub fn suggest(&self, path: &str) -> Option<&str> {
        self.fields
            .iter()
            .filter(|(_, ty)| **ty != FieldType::Object)
            .map(|(known, _)| known.as_str())
            .filter(|known| edit_distance(path, known) <= SUGGEST_MAX_EDIT_DISTANCE)
            .min_by_key(|known| edit_distance(path, known))
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for schemas declared from explicit type descriptors.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Declare a field. Interior `Object` nodes for ancestor segments are
    /// filled in automatically.
    pub fn field(mut self, path: &str, ty: FieldType) -> Self {
        let segments: Vec<&str> = path.split('.').collect();
        for i in 1..segments.len() {
            let ancestor = segments[..i].join(".");
            self.schema
                .fields
                .entry(ancestor)
                .or_insert(FieldType::Object);
        }
        self.schema.fields.insert(path.to_string(), ty);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

fn infer_into(fields: &mut BTreeMap<String, FieldType>, path: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            fields.insert(path.to_string(), FieldType::Object);
            for (key, child) in map {
                infer_into(fields, &format!("{path}.{key}"), child);
            }
        }
        serde_json::Value::Array(items) => {
            let elem = items.first().map_or(FieldType::String, infer_scalar);
            fields.insert(path.to_string(), FieldType::List(Box::new(elem)));
        }
        serde_json::Value::Null => {}
        scalar => {
            fields.insert(path.to_string(), infer_scalar(scalar));
        }
    }
}

fn infer_scalar(value: &serde_json::Value) -> FieldType {
    match value {
        serde_json::Value::Bool(_) => FieldType::Boolean,
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => FieldType::Integer,
        serde_json::Value::Number(_) => FieldType::Float,
        _ => FieldType::String,
    }
}

// =============================================================================
// Typo suggestions
// =============================================================================

/// Maximum edit distance to consider an unknown path a likely typo of a
/// known path.
const SUGGEST_MAX_EDIT_DISTANCE: usize = 2;

/// Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let (a_len, b_len) = (a.len(), b.len());
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];
    for (i, ca) in a.bytes().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.bytes().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}
