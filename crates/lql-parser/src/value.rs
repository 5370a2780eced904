use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::FieldType;

// =============================================================================
// LqlValue — typed filter values
// =============================================================================

/// A typed value carried by a filter or chart rule.
///
/// Values are produced by schema-driven coercion at parse time, so downstream
/// consumers (the routing evaluator, SQL generators) always see the resolved
/// type: integers as integers, timestamps as dates/datetimes, and so on.
/// Lists appear only as the right-hand side of the internal `range` operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LqlValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Calendar date without a time component (`YYYY-MM-DD`).
    Date(NaiveDate),
    /// UTC instant (`YYYY-MM-DDTHH:MM:SSZ`).
    DateTime(DateTime<Utc>),
    List(Vec<LqlValue>),
}

impl LqlValue {
    /// Coerce a raw token to the given field type.
    ///
    /// Returns `None` when the token is not a literal of that type; the
    /// caller turns this into a path-qualified parse error.
    pub fn coerce(raw: &str, ty: &FieldType) -> Option<LqlValue> {
        match ty {
            FieldType::String => Some(LqlValue::String(raw.to_string())),
            FieldType::Integer => raw.parse::<i64>().ok().map(LqlValue::Integer),
            FieldType::Float => raw.parse::<f64>().ok().map(LqlValue::Float),
            FieldType::Boolean => match raw {
                "true" => Some(LqlValue::Bool(true)),
                "false" => Some(LqlValue::Bool(false)),
                _ => None,
            },
            FieldType::Date => parse_date(raw).map(LqlValue::Date),
            FieldType::DateTime => parse_temporal(raw),
            // List values coerce to the element type; containment semantics
            // are applied by the operator, not the value.
            FieldType::List(elem) => LqlValue::coerce(raw, elem),
            FieldType::Object => None,
        }
    }

    /// Returns `true` for `Integer` and `Float` values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, LqlValue::Integer(_) | LqlValue::Float(_))
    }

    /// Returns `true` for `Date` and `DateTime` values.
    pub fn is_temporal(&self) -> bool {
        matches!(self, LqlValue::Date(_) | LqlValue::DateTime(_))
    }

    /// Numeric view of the value, widening integers to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LqlValue::Integer(n) => Some(*n as f64),
            LqlValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Total, deterministic ordering used for the canonical rule-set sort.
    ///
    /// Values of different variants order by variant rank; numeric values of
    /// mixed width are first widened so `2` and `2.5` interleave naturally,
    /// and date/datetime bounds compare chronologically.
    pub fn canonical_cmp(&self, other: &LqlValue) -> Ordering {
        use LqlValue::*;
        match (self, other) {
            (String(a), String(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)),
            (Bool(a), Bool(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Date(a), DateTime(b)) => midnight(*a).cmp(b),
            (DateTime(a), Date(b)) => a.cmp(&midnight(*b)),
            (List(a), List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.canonical_cmp(y) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            LqlValue::String(_) => 0,
            LqlValue::Integer(_) | LqlValue::Float(_) => 1,
            LqlValue::Bool(_) => 2,
            LqlValue::Date(_) | LqlValue::DateTime(_) => 3,
            LqlValue::List(_) => 4,
        }
    }
}

impl fmt::Display for LqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LqlValue::String(s) => write!(f, "{s}"),
            LqlValue::Integer(n) => write!(f, "{n}"),
            LqlValue::Float(n) => write!(f, "{n}"),
            LqlValue::Bool(b) => write!(f, "{b}"),
            LqlValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            LqlValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            LqlValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Midnight UTC of a date, for cross-type chronological comparison.
pub fn midnight(d: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}

// =============================================================================
// Temporal literal parsing
// =============================================================================

/// Parse a `YYYY-MM-DD` date literal.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Parse an ISO-8601 temporal literal.
///
/// `YYYY-MM-DD` yields a `Date`; anything with a time component yields a UTC
/// `DateTime`. Accepts RFC 3339 offsets, a trailing `Z`, bare
/// `YYYY-MM-DDTHH:MM:SS` (assumed UTC), and fractional seconds.
pub fn parse_temporal(s: &str) -> Option<LqlValue> {
    if let Some(d) = parse_date(s) {
        return Some(LqlValue::Date(d));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(LqlValue::DateTime(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(LqlValue::DateTime(Utc.from_utc_datetime(&naive)));
        }
    }
    None
}
