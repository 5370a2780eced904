//! Operator dispatch against extracted event values.
//!
//! Evaluation is total: a type mismatch between the rule value and the event
//! value fails the predicate, it never errors. Numeric comparisons widen
//! integers (and numeric-looking strings) to `f64`; temporal comparisons are
//! chronological, with date-typed rule values compared against the event
//! value's date portion so a date bound covers its whole day.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use lql_parser::value::{midnight, parse_temporal};
use lql_parser::{FilterRule, LqlValue, Operator};

use crate::event::{FieldCandidate, LogEvent};
use crate::regex_cache::cached_regex;

/// Evaluate a single filter against an event.
///
/// The operator is applied existentially over every extracted candidate,
/// then XORed with the `negate` modifier; a missing path therefore fails
/// plain predicates and satisfies negated ones.
pub fn filter_matches(event: &LogEvent, filter: &FilterRule) -> bool {
    let raw = event
        .extract(&filter.path)
        .iter()
        .any(|c| candidate_matches(c, filter.operator, &filter.value));
    raw ^ filter.modifiers.negate
}

fn candidate_matches(candidate: &FieldCandidate<'_>, op: Operator, value: &LqlValue) -> bool {
    match candidate {
        FieldCandidate::Message(s) => text_matches(s, op, value),
        FieldCandidate::Timestamp(dt) => temporal_matches(*dt, op, value),
        FieldCandidate::Json(v) => json_matches(v, op, value),
    }
}

// ---------------------------------------------------------------------------
// event_message
// ---------------------------------------------------------------------------

fn text_matches(text: &str, op: Operator, value: &LqlValue) -> bool {
    let LqlValue::String(expected) = value else {
        return false;
    };
    match op {
        Operator::Eq => text == expected,
        Operator::NotEq => text != expected,
        Operator::Regex => regex_match(expected, text),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// timestamp
// ---------------------------------------------------------------------------

fn temporal_matches(dt: DateTime<Utc>, op: Operator, value: &LqlValue) -> bool {
    match op {
        Operator::Range => {
            let LqlValue::List(bounds) = value else {
                return false;
            };
            let [lo, hi] = bounds.as_slice() else {
                return false;
            };
            temporal_cmp(dt, lo).is_some_and(|o| o != Ordering::Less)
                && temporal_cmp(dt, hi).is_some_and(|o| o != Ordering::Greater)
        }
        _ => temporal_cmp(dt, value).is_some_and(|o| ordering_satisfies(o, op)),
    }
}

/// Chronological comparison of an event instant with a rule value.
///
/// Date rule values compare against the instant's date portion, so
/// `timestamp:<=2020-01-02` includes all of January 2nd.
fn temporal_cmp(dt: DateTime<Utc>, value: &LqlValue) -> Option<Ordering> {
    match value {
        LqlValue::Date(d) => Some(dt.date_naive().cmp(d)),
        LqlValue::DateTime(v) => Some(dt.cmp(v)),
        _ => None,
    }
}

fn ordering_satisfies(ord: Ordering, op: Operator) -> bool {
    match op {
        Operator::Eq => ord == Ordering::Equal,
        Operator::NotEq => ord != Ordering::Equal,
        Operator::Gt => ord == Ordering::Greater,
        Operator::Gte => ord != Ordering::Less,
        Operator::Lt => ord == Ordering::Less,
        Operator::Lte => ord != Ordering::Greater,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// metadata values
// ---------------------------------------------------------------------------

fn json_matches(v: &Value, op: Operator, value: &LqlValue) -> bool {
    match op {
        Operator::Eq => json_eq(v, value),
        Operator::NotEq => !json_eq(v, value),
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            if value.is_temporal() {
                json_temporal(v, &|ord| ordering_satisfies(ord, op), value)
            } else {
                let Some(target) = value.as_f64() else {
                    return false;
                };
                json_numeric(v, &|n| {
                    ordering_satisfies(n.total_cmp(&target), op)
                })
            }
        }
        Operator::Regex => {
            let LqlValue::String(pattern) = value else {
                return false;
            };
            json_text(v, &|s| regex_match(pattern, s))
        }
        Operator::ListIncludes => match v {
            Value::Array(items) => items.iter().any(|item| json_eq(item, value)),
            _ => false,
        },
        Operator::Range => {
            let LqlValue::List(bounds) = value else {
                return false;
            };
            let [lo, hi] = bounds.as_slice() else {
                return false;
            };
            json_matches(v, Operator::Gte, lo) && json_matches(v, Operator::Lte, hi)
        }
    }
}

/// Deep equality of an event value with a typed rule value.
///
/// String comparison is exact and case-sensitive. Numeric comparison widens
/// to `f64` (so integer and float forms of the same quantity are equal), and
/// accepts stringified numbers. Array event values match existentially,
/// except against a list rule value where equality is element-wise.
fn json_eq(v: &Value, value: &LqlValue) -> bool {
    match value {
        LqlValue::String(expected) => match v {
            Value::String(s) => s == expected,
            Value::Array(items) => items.iter().any(|item| json_eq(item, value)),
            _ => false,
        },
        LqlValue::Integer(_) | LqlValue::Float(_) => {
            let Some(target) = value.as_f64() else {
                return false;
            };
            json_numeric(v, &|n| (n - target).abs() < f64::EPSILON)
        }
        LqlValue::Bool(expected) => match v {
            Value::Bool(b) => b == expected,
            Value::String(s) => match s.as_str() {
                "true" => *expected,
                "false" => !*expected,
                _ => false,
            },
            Value::Array(items) => items.iter().any(|item| json_eq(item, value)),
            _ => false,
        },
        LqlValue::Date(_) | LqlValue::DateTime(_) => {
            json_temporal(v, &|ord| ord == Ordering::Equal, value)
        }
        LqlValue::List(expected) => match v {
            Value::Array(items) => {
                items.len() == expected.len()
                    && items.iter().zip(expected).all(|(item, e)| json_eq(item, e))
            }
            _ => false,
        },
    }
}

/// Apply a string predicate to the string form of an event value.
///
/// Numbers and booleans compare through their canonical string form; arrays
/// match existentially.
fn json_text(v: &Value, pred: &dyn Fn(&str) -> bool) -> bool {
    match v {
        Value::String(s) => pred(s),
        Value::Number(n) => pred(&n.to_string()),
        Value::Bool(b) => pred(if *b { "true" } else { "false" }),
        Value::Array(items) => items.iter().any(|item| json_text(item, pred)),
        _ => false,
    }
}

/// Apply a numeric predicate, widening integers and numeric strings to `f64`.
fn json_numeric(v: &Value, pred: &dyn Fn(f64) -> bool) -> bool {
    match v {
        Value::Number(n) => n.as_f64().is_some_and(pred),
        Value::String(s) => s.parse::<f64>().is_ok_and(pred),
        Value::Array(items) => items.iter().any(|item| json_numeric(item, pred)),
        _ => false,
    }
}

/// Compare a temporal event value (ISO-8601 string) against a temporal rule
/// value and test the resulting ordering.
fn json_temporal(v: &Value, pred: &dyn Fn(Ordering) -> bool, value: &LqlValue) -> bool {
    match v {
        Value::String(s) => {
            let Some(event_value) = parse_temporal(s) else {
                return false;
            };
            let ord = match (&event_value, value) {
                (LqlValue::DateTime(a), _) => {
                    return temporal_cmp(*a, value).is_some_and(pred);
                }
                (LqlValue::Date(a), LqlValue::Date(b)) => a.cmp(b),
                (LqlValue::Date(a), LqlValue::DateTime(b)) => midnight(*a).cmp(b),
                _ => return false,
            };
            pred(ord)
        }
        Value::Array(items) => items.iter().any(|item| json_temporal(item, pred, value)),
        _ => false,
    }
}

fn regex_match(pattern: &str, candidate: &str) -> bool {
    cached_regex(pattern).is_some_and(|re| re.is_match(candidate))
}
