//! Text → [`RuleSet`] parser for LQL queries.
//!
//! Term recognition is a pest PEG grammar (`lql.pest`); this module walks the
//! parse tree, resolves paths against the [`Schema`], coerces raw values to
//! their resolved types, expands ranges, applies negation, and sorts the
//! result into the canonical order.
//!
//! Parsing is fail-fast: the first error wins and no partial rule set is
//! emitted.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::ast::{ChartRule, ChartValueType, FilterRule, Operator, RuleSet};
use crate::error::{LqlParserError, Result};
use crate::schema::{EVENT_MESSAGE, FieldType, Schema, TIMESTAMP};
use crate::value::{LqlValue, parse_temporal};

// ---------------------------------------------------------------------------
// Pest parser (generated from lql.pest grammar)
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[grammar = "src/lql.pest"]
struct LqlQueryParser;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse an LQL query against a table schema.
///
/// # Examples
///
/// ```
/// use lql_parser::{FieldType, Operator, Schema, parse};
///
/// let schema = Schema::builder()
///     .field("metadata.users.source_count", FieldType::Integer)
///     .build();
///
/// let rules = parse("error metadata.users.source_count:>=50", &schema).unwrap();
/// assert_eq!(rules.search.len(), 2);
/// assert_eq!(rules.search[1].operator, Operator::Gte);
/// ```
pub fn parse(query: &str, schema: &Schema) -> Result<RuleSet> {
    let pairs = LqlQueryParser::parse(Rule::query, query)
        .map_err(|e| LqlParserError::Syntax(e.to_string()))?;

    // query = { SOI ~ ws* ~ (term ~ (ws+ ~ term)*)? ~ ws* ~ EOI }
    let query_pair = pairs.into_iter().next().expect("grammar yields one query");

    let mut rules = RuleSet::new();
    for pair in query_pair.into_inner() {
        match pair.as_rule() {
            Rule::chart_term => parse_chart_term(pair, schema, &mut rules)?,
            Rule::field_term => {
                let filters = parse_field_term(pair, schema)?;
                rules.search.extend(filters);
            }
            Rule::quoted_term | Rule::word_term => {
                rules.search.push(parse_text_term(pair)?);
            }
            Rule::EOI => {}
            other => unreachable!("unexpected term rule: {other:?}"),
        }
    }

    rules.canonicalize();
    Ok(rules)
}

// ---------------------------------------------------------------------------
// Free-text terms
// ---------------------------------------------------------------------------

/// A bare word or quoted phrase: a `~` filter on `event_message`.
fn parse_text_term(pair: Pair<'_, Rule>) -> Result<FilterRule> {
    let mut negate = false;
    let mut text = "";
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::negate => negate = true,
            Rule::word => text = p.as_str(),
            Rule::quoted => text = quoted_content(p),
            other => unreachable!("unexpected text term child: {other:?}"),
        }
    }

    // The value is a regex source at evaluation time; reject bad patterns at
    // rule creation rather than at ingest.
    regex::Regex::new(text)?;

    let mut filter = FilterRule::new(EVENT_MESSAGE, Operator::Regex, LqlValue::String(text.into()));
    if negate {
        filter = filter.negated();
    }
    Ok(filter)
}

// ---------------------------------------------------------------------------
// Field terms
// ---------------------------------------------------------------------------

/// A `path:value` term in any of its operator forms. Ranges expand to two
/// filters; negation distributes over everything the term produced.
fn parse_field_term(pair: Pair<'_, Rule>, schema: &Schema) -> Result<Vec<FilterRule>> {
    let mut negate = false;
    let mut raw_path = "";
    let mut value_pair = None;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::negate => negate = true,
            Rule::path => raw_path = p.as_str(),
            _ => value_pair = Some(p),
        }
    }

    let path = normalize_path(raw_path);
    let mut filters = parse_field_value(&path, value_pair, schema)?;
    if negate {
        for f in &mut filters {
            f.modifiers.negate = true;
        }
    }
    Ok(filters)
}

fn parse_field_value(
    path: &str,
    value_pair: Option<Pair<'_, Rule>>,
    schema: &Schema,
) -> Result<Vec<FilterRule>> {
    // An empty value is rejected before schema lookup, so the message always
    // names the path the user wrote.
    let Some(value_pair) = value_pair else {
        return Err(value_error(path, ""));
    };

    if path == TIMESTAMP {
        return parse_timestamp_value(value_pair);
    }

    let Some(field_type) = schema.resolve(path) else {
        return Err(LqlParserError::UnknownField {
            path: path.to_string(),
            suggestion: schema.suggest(path).map(String::from),
        });
    };

    match value_pair.as_rule() {
        Rule::regex_value => {
            let raw = unwrap_regex_source(value_pair);
            let string_compatible = matches!(field_type, FieldType::String)
                || matches!(field_type, FieldType::List(elem) if **elem == FieldType::String);
            if !string_compatible {
                return Err(incompatible(Operator::Regex, path, field_type));
            }
            regex::Regex::new(raw)?;
            Ok(vec![FilterRule::new(
                path,
                Operator::Regex,
                LqlValue::String(raw.into()),
            )])
        }

        Rule::comparison => {
            let (op, raw) = unwrap_comparison(value_pair);
            if !field_type.is_numeric() && !field_type.is_temporal() {
                return Err(incompatible(op, path, field_type));
            }
            let value =
                LqlValue::coerce(raw, field_type).ok_or_else(|| value_error(path, raw))?;
            Ok(vec![FilterRule::new(path, op, value)])
        }

        Rule::includes_value => {
            let raw = first_inner_str(value_pair);
            let FieldType::List(_) = field_type else {
                return Err(incompatible(Operator::ListIncludes, path, field_type));
            };
            let value =
                LqlValue::coerce(raw, field_type).ok_or_else(|| value_error(path, raw))?;
            Ok(vec![FilterRule::new(path, Operator::ListIncludes, value)])
        }

        Rule::range_value => {
            if !field_type.is_numeric() && !field_type.is_temporal() {
                return Err(incompatible(Operator::Range, path, field_type));
            }
            let (lo_raw, hi_raw) = unwrap_range(value_pair);
            let lo =
                LqlValue::coerce(lo_raw, field_type).ok_or_else(|| value_error(path, lo_raw))?;
            let hi =
                LqlValue::coerce(hi_raw, field_type).ok_or_else(|| value_error(path, hi_raw))?;
            expand_range(path, lo, hi)
        }

        Rule::quoted | Rule::bare => {
            if let FieldType::Object = field_type {
                return Err(incompatible(Operator::Eq, path, field_type));
            }
            let raw = match value_pair.as_rule() {
                Rule::quoted => quoted_content(value_pair),
                _ => value_pair.as_str(),
            };
            let value =
                LqlValue::coerce(raw, field_type).ok_or_else(|| value_error(path, raw))?;
            // The implicit operator is equality, except on list paths where a
            // scalar value means containment.
            let op = if schema.is_list(path) {
                Operator::ListIncludes
            } else {
                Operator::Eq
            };
            Ok(vec![FilterRule::new(path, op, value)])
        }

        other => unreachable!("unexpected field value rule: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Timestamp terms
// ---------------------------------------------------------------------------

/// `timestamp:` filters take ISO-8601 dates, datetimes, or ranges of either;
/// each range bound keeps its own type. Everything else is the dedicated
/// timestamp error.
fn parse_timestamp_value(value_pair: Pair<'_, Rule>) -> Result<Vec<FilterRule>> {
    match value_pair.as_rule() {
        Rule::comparison => {
            let (op, raw) = unwrap_comparison(value_pair);
            let value = parse_temporal(raw).ok_or_else(|| timestamp_error(raw))?;
            Ok(vec![FilterRule::new(TIMESTAMP, op, value)])
        }
        Rule::range_value => {
            let (lo_raw, hi_raw) = unwrap_range(value_pair);
            let lo = parse_temporal(lo_raw).ok_or_else(|| timestamp_error(lo_raw))?;
            let hi = parse_temporal(hi_raw).ok_or_else(|| timestamp_error(hi_raw))?;
            expand_range(TIMESTAMP, lo, hi)
        }
        Rule::quoted | Rule::bare => {
            let raw = match value_pair.as_rule() {
                Rule::quoted => quoted_content(value_pair),
                _ => value_pair.as_str(),
            };
            let value = parse_temporal(raw).ok_or_else(|| timestamp_error(raw))?;
            Ok(vec![FilterRule::new(TIMESTAMP, Operator::Eq, value)])
        }
        // `~` and `@>` have no timestamp meaning.
        _ => Err(timestamp_error(value_pair.as_str())),
    }
}

// ---------------------------------------------------------------------------
// Chart directive
// ---------------------------------------------------------------------------

/// `chart:path` over a numeric field. A later directive overwrites an
/// earlier one.
fn parse_chart_term(pair: Pair<'_, Rule>, schema: &Schema, rules: &mut RuleSet) -> Result<()> {
    let raw_path = pair
        .into_inner()
        .next()
        .expect("chart term has a path")
        .as_str();
    let path = normalize_path(raw_path);

    let Some(field_type) = schema.resolve(&path) else {
        let suggestion = schema.suggest(&path).map(String::from);
        return Err(LqlParserError::UnknownField { path, suggestion });
    };

    let value_type = match field_type {
        FieldType::Integer => ChartValueType::Integer,
        FieldType::Float => ChartValueType::Float,
        other => {
            return Err(LqlParserError::Chart {
                path,
                field_type: other.to_string(),
            });
        }
    };

    rules.chart = vec![ChartRule {
        path,
        value_type,
        aggregate: None,
        period: None,
    }];
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `m.` is shorthand for `metadata.`; normalized before schema lookup.
fn normalize_path(raw: &str) -> String {
    match raw.strip_prefix("m.") {
        Some(rest) => format!("metadata.{rest}"),
        None => raw.to_string(),
    }
}

/// `lo..hi` expands to `>= lo` and `<= hi`, after checking `lo <= hi`.
fn expand_range(path: &str, lo: LqlValue, hi: LqlValue) -> Result<Vec<FilterRule>> {
    if lo.canonical_cmp(&hi) == std::cmp::Ordering::Greater {
        return Err(LqlParserError::Range(format!(
            "lower bound `{lo}` exceeds upper bound `{hi}`"
        )));
    }
    Ok(vec![
        FilterRule::new(path, Operator::Gte, lo),
        FilterRule::new(path, Operator::Lte, hi),
    ])
}

fn unwrap_comparison(pair: Pair<'_, Rule>) -> (Operator, &str) {
    let mut op = Operator::Eq;
    let mut raw = "";
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::compare_op => {
                op = p.as_str().parse().expect("grammar admits known operators");
            }
            Rule::bare => raw = p.as_str(),
            other => unreachable!("unexpected comparison child: {other:?}"),
        }
    }
    (op, raw)
}

fn unwrap_range(pair: Pair<'_, Rule>) -> (&str, &str) {
    let mut bounds = pair.into_inner().map(|p| p.as_str());
    let lo = bounds.next().expect("range has a lower bound");
    let hi = bounds.next().expect("range has an upper bound");
    (lo, hi)
}

/// The regex source of a `~` value: quoted content or the bare remainder.
fn unwrap_regex_source(pair: Pair<'_, Rule>) -> &str {
    let inner = pair.into_inner().next().expect("regex value has a source");
    match inner.as_rule() {
        Rule::quoted => quoted_content(inner),
        _ => inner.as_str(),
    }
}

fn quoted_content(pair: Pair<'_, Rule>) -> &str {
    pair.into_inner()
        .next()
        .expect("quoted value has inner content")
        .as_str()
}

fn first_inner_str(pair: Pair<'_, Rule>) -> &str {
    pair.into_inner()
        .next()
        .expect("value has inner content")
        .as_str()
}

fn value_error(path: &str, raw: &str) -> LqlParserError {
    LqlParserError::FilterValue {
        path: path.to_string(),
        raw: raw.to_string(),
    }
}

fn timestamp_error(raw: &str) -> LqlParserError {
    LqlParserError::Timestamp {
        raw: raw.to_string(),
    }
}

fn incompatible(op: Operator, path: &str, field_type: &FieldType) -> LqlParserError {
    LqlParserError::IncompatibleOperator {
        operator: op.token().to_string(),
        path: path.to_string(),
        field_type: field_type.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
