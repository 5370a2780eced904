//! Rule types produced by the parser: filter predicates, chart directives,
//! and the rule set that groups them.
//!
//! All types serialize with stable string tokens so rule sets survive
//! round-trips through external storage unchanged.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::value::LqlValue;

// =============================================================================
// Operator
// =============================================================================

/// Comparison operator of a filter rule.
///
/// Declaration order is the canonical sort rank (see [`RuleSet::canonicalize`]).
/// `NotEq` and `Range` are not produced by the surface syntax; they exist for
/// persistence and downstream SQL generators and are fully evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<>")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "~")]
    Regex,
    #[serde(rename = "list_includes")]
    ListIncludes,
    #[serde(rename = "range")]
    Range,
}

impl Operator {
    /// The stable string token, as persisted.
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Regex => "~",
            Operator::ListIncludes => "list_includes",
            Operator::Range => "range",
        }
    }

    /// Returns `true` for the ordered comparison operators.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for Operator {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Eq),
            "<>" => Ok(Operator::NotEq),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "~" => Ok(Operator::Regex),
            "list_includes" => Ok(Operator::ListIncludes),
            "range" => Ok(Operator::Range),
            _ => Err(()),
        }
    }
}

// =============================================================================
// FilterRule
// =============================================================================

/// Modifier flags attached to a filter rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterModifiers {
    /// Invert the predicate: the rule matches when the operator does not.
    #[serde(default)]
    pub negate: bool,
}

impl FilterModifiers {
    pub const NEGATED: FilterModifiers = FilterModifiers { negate: true };
}

/// A single typed predicate: path, operator, value, modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub path: String,
    pub operator: Operator,
    pub value: LqlValue,
    #[serde(default)]
    pub modifiers: FilterModifiers,
}

impl FilterRule {
    pub fn new(path: impl Into<String>, operator: Operator, value: LqlValue) -> Self {
        FilterRule {
            path: path.into(),
            operator,
            value,
            modifiers: FilterModifiers::default(),
        }
    }

    pub fn negated(mut self) -> Self {
        self.modifiers.negate = true;
        self
    }

    /// Canonical total order: negated rules last, then path, operator rank,
    /// and value.
    pub fn canonical_cmp(&self, other: &FilterRule) -> Ordering {
        self.modifiers
            .negate
            .cmp(&other.modifiers.negate)
            .then_with(|| self.path.cmp(&other.path))
            .then_with(|| self.operator.cmp(&other.operator))
            .then_with(|| self.value.canonical_cmp(&other.value))
    }
}

// =============================================================================
// ChartRule
// =============================================================================

/// Numeric width of a charted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartValueType {
    Integer,
    Float,
}

/// A `chart:` directive over a numeric field.
///
/// `aggregate` and `period` are hints set by external consumers (dashboard
/// layers); the parser leaves them unset and serde round-trips them opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRule {
    pub path: String,
    pub value_type: ChartValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

// =============================================================================
// RuleSet
// =============================================================================

/// Parsed output of one LQL query: conjoined filters plus at most one chart
/// directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub search: Vec<FilterRule>,
    pub chart: Vec<ChartRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// The chart directive, if the query carried one.
    pub fn chart(&self) -> Option<&ChartRule> {
        self.chart.first()
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.chart.is_empty()
    }

    /// Sort `search` into the canonical order so equivalent queries produce
    /// byte-identical rule sets.
    pub fn canonicalize(&mut self) {
        self.search.sort_by(|a, b| a.canonical_cmp(b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_tokens_round_trip() {
        for op in [
            Operator::Eq,
            Operator::NotEq,
            Operator::Lt,
            Operator::Lte,
            Operator::Gt,
            Operator::Gte,
            Operator::Regex,
            Operator::ListIncludes,
            Operator::Range,
        ] {
            assert_eq!(op.token().parse::<Operator>(), Ok(op));
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.token()));
            let back: Operator = serde_json::from_str(&json).unwrap();
            assert_eq!(back, op);
        }
    }

    #[test]
    fn test_canonicalize_sorts_negated_last() {
        let mut rules = RuleSet {
            search: vec![
                FilterRule::new("event_message", Operator::Regex, LqlValue::String("a".into()))
                    .negated(),
                FilterRule::new("event_message", Operator::Regex, LqlValue::String("z".into())),
            ],
            chart: vec![],
        };
        rules.canonicalize();
        assert!(!rules.search[0].modifiers.negate);
        assert!(rules.search[1].modifiers.negate);
    }

    #[test]
    fn test_canonicalize_orders_by_value_within_operator() {
        let mut rules = RuleSet {
            search: vec![
                FilterRule::new("event_message", Operator::Regex, LqlValue::String("up".into())),
                FilterRule::new("event_message", Operator::Regex, LqlValue::String("sign".into())),
                FilterRule::new("event_message", Operator::Regex, LqlValue::String("user".into())),
            ],
            chart: vec![],
        };
        rules.canonicalize();
        let values: Vec<&LqlValue> = rules.search.iter().map(|f| &f.value).collect();
        assert_eq!(
            values,
            vec![
                &LqlValue::String("sign".into()),
                &LqlValue::String("up".into()),
                &LqlValue::String("user".into()),
            ]
        );
    }

    #[test]
    fn test_filter_rule_serde_round_trip() {
        let rule = FilterRule::new(
            "metadata.user.source_count",
            Operator::Gte,
            LqlValue::Integer(50),
        )
        .negated();
        let json = serde_json::to_string(&rule).unwrap();
        let back: FilterRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }
}
