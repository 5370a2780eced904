use thiserror::Error;

/// Errors that can occur while parsing an LQL query.
///
/// The `Display` form of each variant is the user-visible message; callers
/// that persist rejection reasons as flat strings use `to_string()`.
#[derive(Debug, Error)]
pub enum LqlParserError {
    /// The query text could not be tokenized (malformed quoting, trailing
    /// operators, stray characters).
    #[error("Error while tokenizing query: {0}")]
    Syntax(String),

    /// A filter path is not present in the schema.
    #[error("{}", format_unknown_field(.path, .suggestion))]
    UnknownField {
        path: String,
        suggestion: Option<String>,
    },

    /// A raw filter value could not be coerced to the field's resolved type.
    #[error("Error while parsing `{path}` field metadata filter value: \"{raw}\"")]
    FilterValue { path: String, raw: String },

    /// A `timestamp:` filter value was not an ISO-8601 date, datetime, or range.
    #[error("Error while parsing timestamp filter value: expected ISO8601 string or range, got {raw}")]
    Timestamp { raw: String },

    /// A range literal with `lo > hi`, or mixed-type bounds that cannot be
    /// widened to a common type.
    #[error("Invalid range: {0}")]
    Range(String),

    /// An operator applied to a field whose type does not support it.
    #[error("Operator `{operator}` is not supported on `{field_type}` field `{path}`")]
    IncompatibleOperator {
        operator: String,
        path: String,
        field_type: String,
    },

    /// A `chart:` directive on a non-numeric field.
    #[error("Chart directive requires a numeric field, `{path}` is {field_type}")]
    Chart { path: String, field_type: String },

    /// A `~` value is not a valid regex source.
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

fn format_unknown_field(path: &str, suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!("Unknown field `{path}`; did you mean `{s}`?"),
        None => format!("Unknown field `{path}`"),
    }
}

pub type Result<T> = std::result::Result<T, LqlParserError>;
