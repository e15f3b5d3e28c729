// tests/encoder_tests.rs

use cql_lang::geometry::{Coord, Geometry};
use cql_lang::{
    ComparisonOp, Expression, Filter, Language, Wildcards, encode_expression, encode_filter,
    encode_filter_list, to_expression, to_filter, to_filter_list,
};
use proptest::prelude::*;

fn round_trip(input: &str, language: Language) -> String {
    encode_filter(&to_filter(input, language).unwrap())
}

fn assert_canonical(input: &str, expected: &str) {
    assert_eq!(round_trip(input, Language::Ecql), expected, "Failed for input: {}", input);
}

// ============================================================================
// Canonical Forms
// ============================================================================

#[test]
fn test_canonical_text_is_stable() {
    let inputs = vec![
        "ATTR1 < 10 AND ATTR2 LIKE 'abc%'",
        "ATTR1 = 'abc'",
        "ATTR1 <> 1.5",
        "ATTR1 BETWEEN 10 AND 20",
        "ATTR1 IS NULL",
        "INTERSECTS(the_geom, POINT(1 2))",
        "ATTR1 AFTER 2006-11-30T01:30:00Z",
        "ATTR1 > 2006-11-30",
        "INCLUDE",
        "EXCLUDE",
        "a + b * c > 3",
    ];
    for input in inputs {
        assert_eq!(round_trip(input, Language::Cql), input, "Failed for input: {}", input);
    }
}

#[test]
fn test_negations_use_parenthesized_not() {
    assert_canonical("NOT ATTR1 < 10", "NOT (ATTR1 < 10)");
    assert_canonical("ATTR1 NOT BETWEEN 10 AND 20", "NOT (ATTR1 BETWEEN 10 AND 20)");
    assert_canonical("ATTR1 IS NOT NULL", "NOT (ATTR1 IS NULL)");
    assert_canonical("ATTR1 NOT LIKE 'a_c'", "NOT (ATTR1 LIKE 'a_c')");
    assert_canonical(
        "ATTR3 < 4 AND (NOT( ATTR1 < 10 AND ATTR2 < 2))",
        "ATTR3 < 4 AND NOT (ATTR1 < 10 AND ATTR2 < 2)",
    );
}

#[test]
fn test_grouping_only_where_needed() {
    assert_canonical("(a = 1 OR b = 2) AND c = 3", "(a = 1 OR b = 2) AND c = 3");
    assert_canonical("(a = 1 AND b = 2) OR c = 3", "a = 1 AND b = 2 OR c = 3");
    assert_canonical("[a = 1] AND [b = 2]", "a = 1 AND b = 2");
    assert_canonical("((((a = 1))))", "a = 1");
}

#[test]
fn test_extended_forms() {
    assert_canonical("ATTR1 ILIKE 'abc%'", "ATTR1 ILIKE 'abc%'");
    assert_canonical("IN ('river.1', 'river.2')", "IN ('river.1', 'river.2')");
    assert_canonical("length IN (1, 2)", "length = 1 OR length = 2");
    assert_canonical("NAME EXISTS", "PropertyExists(NAME) = true");
    assert_canonical("NAME DOES-NOT-EXIST", "NOT (PropertyExists(NAME) = true)");
    assert_canonical(
        "RELATE(the_geom, LINESTRING(1 2, 10 15), 201000002)",
        "relatePattern(the_geom, LINESTRING(1 2, 10 15), '201000002') = true",
    );
}

#[test]
fn test_spatial_forms() {
    assert_canonical(
        "BBOX(ATTR1, 10, 20, 30, 40, 'urn:ogc:def:crs:EPSG::4326')",
        "BBOX(ATTR1, 10.0, 20.0, 30.0, 40.0, 'EPSG:4326')",
    );
    assert_canonical(
        "DWITHIN(ATTR1, POINT(1 2), 10, kilometers)",
        "DWITHIN(ATTR1, POINT(1 2), 10.0, kilometers)",
    );
    assert_canonical(
        "BEYOND(ATTR1, POINT(1 2), 2.5, statute miles)",
        "BEYOND(ATTR1, POINT(1 2), 2.5, statute miles)",
    );
    assert_canonical("WITHIN(g, POINT EMPTY)", "WITHIN(g, POINT EMPTY)");
}

#[test]
fn test_temporal_forms() {
    assert_canonical(
        "ATTR1 DURING 2006-11-30T01:30:00Z/2006-12-31T01:30:00Z",
        "ATTR1 DURING 2006-11-30T01:30:00Z/2006-12-31T01:30:00Z",
    );
    assert_canonical(
        "ATTR1 BEFORE OR DURING 2006-11-30T01:30:00Z/2006-12-31T01:30:00Z",
        "ATTR1 BEFORE 2006-11-30T01:30:00Z OR ATTR1 DURING 2006-11-30T01:30:00Z/2006-12-31T01:30:00Z",
    );
    assert_canonical(
        "ATTR1 DURING 2006-11-30T01:30:00Z/T5H",
        "ATTR1 DURING 2006-11-30T01:30:00Z/2006-11-30T06:30:00Z",
    );
}

#[test]
fn test_literal_escaping_and_quoted_paths() {
    assert_canonical("NAME = 'O''Brien'", "NAME = 'O''Brien'");
    assert_canonical("\"first name\" = 'x'", "\"first name\" = 'x'");
    assert_canonical("\"and\".b = 1", "\"and\".b = 1");
    assert_canonical("gmd:aa:bb.gmd:cc < 100", "gmd:aa:bb.gmd:cc < 100");
    assert_canonical("\"a/b\".c = 1", "\"a/b\".c = 1");
}

#[test]
fn test_custom_wildcards_are_translated() {
    let filter = Filter::Like {
        expr: Expression::property("NAME"),
        pattern: "ab*c.".into(),
        wildcards: Wildcards {
            multi: '*',
            single: '.',
            escape: '!',
        },
        match_case: true,
    };
    assert_eq!(encode_filter(&filter), "NAME LIKE 'ab%c_'");
}

#[test]
fn test_empty_logical_operators() {
    assert_eq!(encode_filter(&Filter::And(vec![])), "INCLUDE");
    assert_eq!(encode_filter(&Filter::Or(vec![])), "EXCLUDE");
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_expression_parentheses() {
    let cases = vec![
        ("a * (b + c)", "a * (b + c)"),
        ("(a + b) * c", "(a + b) * c"),
        ("a - (b - c)", "a - (b - c)"),
        ("(a - b) - c", "a - b - c"),
        ("a / (b * c)", "a / (b * c)"),
        ("-5 + a", "-5 + a"),
        ("-a", "0 - a"),
        ("strConcat(a, 'x')", "strConcat(a, 'x')"),
        ("a ^ 2 + 1", "pow(a, 2) + 1"),
        ("a \\ (b % 3)", "div(a, IEEEremainder(b, 3))"),
    ];
    for (input, expected) in cases {
        let expr = to_expression(input, Language::Cql).unwrap();
        assert_eq!(encode_expression(&expr), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_geometry_literal_text() {
    let line = Geometry::LineString(vec![Coord::xy(1.0, 2.0), Coord::xy(10.5, 15.0)]);
    assert_eq!(encode_expression(&Expression::literal(line)), "LINESTRING(1 2, 10.5 15)");
}

// ============================================================================
// Filter Lists
// ============================================================================

#[test]
fn test_filter_list_encoding() {
    let filters = to_filter_list("a = 1;;b = 2", Language::Cql).unwrap();
    assert_eq!(encode_filter_list(&filters), "a = 1; INCLUDE; b = 2");
}

// ============================================================================
// Round Trips
// ============================================================================

fn property_strategy() -> impl Strategy<Value = Expression> {
    "[a-z][a-z0-9_]{0,6}".prop_map(|name| Expression::property(&name))
}

fn literal_strategy() -> impl Strategy<Value = Expression> {
    prop_oneof![
        any::<i64>().prop_map(Expression::literal),
        (-1.0e6..1.0e6f64).prop_map(Expression::literal),
        "[a-zA-Z0-9 ']{0,8}".prop_map(Expression::literal),
        any::<bool>().prop_map(Expression::literal),
    ]
}

fn comparison_strategy() -> impl Strategy<Value = Filter> {
    let ops = prop_oneof![
        Just(ComparisonOp::Equal),
        Just(ComparisonOp::NotEqual),
        Just(ComparisonOp::LessThan),
        Just(ComparisonOp::LessEqual),
        Just(ComparisonOp::GreaterThan),
        Just(ComparisonOp::GreaterEqual),
    ];
    (ops, property_strategy(), literal_strategy())
        .prop_map(|(op, left, right)| Filter::comparison(op, left, right))
}

fn filter_strategy() -> impl Strategy<Value = Filter> {
    comparison_strategy().prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Filter::And),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Filter::Or),
            inner.prop_map(Filter::not),
        ]
    })
}

proptest! {
    #[test]
    fn test_encoded_filters_parse_back(filter in filter_strategy()) {
        let text = encode_filter(&filter);
        let parsed = to_filter(&text, Language::Ecql);
        prop_assert!(parsed.is_ok(), "{} failed: {:?}", text, parsed);
        prop_assert_eq!(parsed.unwrap(), filter);
    }

    #[test]
    fn test_encoding_is_idempotent(filter in filter_strategy()) {
        let once = encode_filter(&filter);
        let twice = encode_filter(&to_filter(&once, Language::Ecql).unwrap());
        prop_assert_eq!(once, twice);
    }
}
