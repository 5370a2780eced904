use lql_parser::{
    EVENT_MESSAGE, FieldType, FilterRule, LqlValue, Operator, RuleSet, Schema, parse,
};

fn routing_schema() -> Schema {
    Schema::builder()
        .field("metadata.users.source_count", FieldType::Integer)
        .field("metadata.request.url", FieldType::String)
        .field("metadata.latency", FieldType::Float)
        .build()
}

#[test]
fn free_text_words_become_message_filters_in_canonical_order() {
    let rules = parse("user sign up", &Schema::default()).unwrap();
    assert_eq!(rules.search.len(), 3);
    assert!(rules.chart.is_empty());
    let values: Vec<String> = rules.search.iter().map(|f| f.value.to_string()).collect();
    // Canonical order sorts by value within the same path and operator.
    assert_eq!(values, vec!["sign", "up", "user"]);
    for f in &rules.search {
        assert_eq!(f.path, EVENT_MESSAGE);
        assert_eq!(f.operator, Operator::Regex);
        assert!(!f.modifiers.negate);
    }
}

#[test]
fn quoted_phrase_stays_one_filter() {
    let rules = parse("new \"user sign up\" server", &Schema::default()).unwrap();
    let values: Vec<String> = rules.search.iter().map(|f| f.value.to_string()).collect();
    assert_eq!(values, vec!["new", "server", "user sign up"]);
}

#[test]
fn integer_range_expands_to_bounds() {
    let rules = parse("metadata.users.source_count:50..200", &routing_schema()).unwrap();
    assert_eq!(
        rules.search,
        vec![
            FilterRule::new(
                "metadata.users.source_count",
                Operator::Gte,
                LqlValue::Integer(50)
            ),
            FilterRule::new(
                "metadata.users.source_count",
                Operator::Lte,
                LqlValue::Integer(200)
            ),
        ]
    );
}

#[test]
fn parse_is_deterministic() {
    let schema = routing_schema();
    let q = "server error metadata.users.source_count:50..200 -metadata.request.url:~internal";
    assert_eq!(parse(q, &schema).unwrap(), parse(q, &schema).unwrap());
}

#[test]
fn whitespace_and_line_breaks_are_interchangeable() {
    let schema = routing_schema();
    let compact = parse("error metadata.latency:>0.5 -debug", &schema).unwrap();
    let sprawling = parse("\n  -debug\n\nerror\t metadata.latency:>0.5  ", &schema).unwrap();
    assert_eq!(compact, sprawling);
}

#[test]
fn negated_rules_sort_after_plain_rules() {
    let rules = parse("-zeta alpha", &Schema::default()).unwrap();
    assert_eq!(rules.search[0].value.to_string(), "alpha");
    assert!(!rules.search[0].modifiers.negate);
    assert_eq!(rules.search[1].value.to_string(), "zeta");
    assert!(rules.search[1].modifiers.negate);
}

#[test]
fn negation_distributes_over_range_bounds() {
    let rules = parse("-metadata.users.source_count:50..200", &routing_schema()).unwrap();
    assert_eq!(rules.search.len(), 2);
    assert!(rules.search.iter().all(|f| f.modifiers.negate));
    assert_eq!(rules.search[0].operator, Operator::Gte);
    assert_eq!(rules.search[1].operator, Operator::Lte);
}

#[test]
fn metadata_alias_is_equivalent_to_full_prefix() {
    let schema = routing_schema();
    let aliased = parse("m.request.url:~\"sources$\"", &schema).unwrap();
    let full = parse("metadata.request.url:~\"sources$\"", &schema).unwrap();
    assert_eq!(aliased, full);
}

#[test]
fn empty_query_yields_empty_rule_set() {
    let rules = parse("", &Schema::default()).unwrap();
    assert_eq!(rules, RuleSet::new());
}

#[test]
fn rule_set_survives_serde_round_trip() {
    let schema = routing_schema();
    let rules = parse(
        "error -metadata.request.url:~internal metadata.users.source_count:50..200 \
         chart:metadata.latency",
        &schema,
    )
    .unwrap();

    let json = serde_json::to_string(&rules).unwrap();
    let back: RuleSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rules);

    // Operators persist as their stable string tokens.
    assert!(json.contains("\">=\""));
    assert!(json.contains("\"<=\""));
    assert!(json.contains("\"~\""));
}

#[test]
fn timestamp_range_parses_both_bound_types() {
    let rules = parse("timestamp:2020-01-01..2020-02-01T12:00:00Z", &Schema::default()).unwrap();
    assert_eq!(rules.search.len(), 2);
    assert_eq!(rules.search[0].operator, Operator::Gte);
    assert!(matches!(rules.search[0].value, LqlValue::Date(_)));
    assert_eq!(rules.search[1].operator, Operator::Lte);
    assert!(matches!(rules.search[1].value, LqlValue::DateTime(_)));
}
