// tests/filter_tests.rs

use cql_lang::crs::Crs;
use cql_lang::geometry::{Coord, Envelope, Geometry};
use cql_lang::temporal::format_date_time;
use cql_lang::{
    ArithmeticOp, AttributePath, ComparisonOp, DistanceOp, ErrorKind, Expression, Filter, Language, SpatialOp,
    TemporalOp, Value, Wildcards, to_expression, to_filter, to_filter_list,
};

const FIRST_DATE: &str = "2006-11-30T01:30:00Z";
const LAST_DATE: &str = "2006-12-31T01:30:00Z";

fn cql(input: &str) -> Filter {
    to_filter(input, Language::Cql).unwrap()
}

fn ecql(input: &str) -> Filter {
    to_filter(input, Language::Ecql).unwrap()
}

fn prop(name: &str) -> Expression {
    Expression::property(name)
}

fn int(n: i64) -> Expression {
    Expression::literal(n)
}

fn is_true(expr: Expression) -> Filter {
    Filter::comparison(ComparisonOp::Equal, expr, Expression::literal(true))
}

fn date_time_of(expr: &Expression) -> String {
    match expr {
        Expression::Literal(Value::DateTime(z)) => format_date_time(z),
        other => panic!("Expected date-time literal, got {:?}", other),
    }
}

// ============================================================================
// Comparisons and logic
// ============================================================================

#[test]
fn test_simple_comparison() {
    assert_eq!(
        cql("ATTR1 < 10"),
        Filter::comparison(ComparisonOp::LessThan, prop("ATTR1"), int(10))
    );
    assert_eq!(
        cql("ATTR1 = 'abc'"),
        Filter::comparison(ComparisonOp::Equal, prop("ATTR1"), Expression::literal("abc"))
    );
    assert_eq!(
        cql("ATTR1 >= 1.5"),
        Filter::comparison(ComparisonOp::GreaterEqual, prop("ATTR1"), Expression::literal(1.5))
    );
}

#[test]
fn test_boolean_and_not_structure() {
    let expected = Filter::And(vec![
        Filter::comparison(ComparisonOp::LessThan, prop("ATTR3"), int(4)),
        Filter::not(Filter::And(vec![
            Filter::comparison(ComparisonOp::LessThan, prop("ATTR1"), int(10)),
            Filter::comparison(ComparisonOp::LessThan, prop("ATTR2"), int(2)),
        ])),
    ]);
    assert_eq!(cql("ATTR3 < 4 AND (NOT( ATTR1 < 10 AND ATTR2 < 2))"), expected);
}

#[test]
fn test_boolean_literal_operands() {
    assert_eq!(
        cql("ATTR1 = true"),
        Filter::comparison(ComparisonOp::Equal, prop("ATTR1"), Expression::literal(true))
    );
    assert_eq!(
        cql("ATTR1 <> FALSE"),
        Filter::comparison(ComparisonOp::NotEqual, prop("ATTR1"), Expression::literal(false))
    );
}

#[test]
fn test_include_exclude_folding() {
    let a = Filter::comparison(ComparisonOp::Equal, prop("a"), int(1));

    assert_eq!(cql("INCLUDE"), Filter::Include);
    assert_eq!(cql("a = 1 AND INCLUDE"), a);
    assert_eq!(cql("a = 1 AND EXCLUDE"), Filter::Exclude);
    assert_eq!(cql("a = 1 OR INCLUDE"), Filter::Include);
    assert_eq!(cql("a = 1 OR EXCLUDE"), a);
    assert_eq!(cql("NOT INCLUDE"), Filter::Exclude);
    assert_eq!(cql("NOT (EXCLUDE)"), Filter::Include);
    assert_eq!(cql("INCLUDE AND INCLUDE"), Filter::Include);
}

// ============================================================================
// Between, like, null
// ============================================================================

#[test]
fn test_between() {
    let between = Filter::Between {
        expr: prop("ATTR1"),
        low: int(10),
        high: int(20),
    };
    assert_eq!(cql("ATTR1 BETWEEN 10 AND 20"), between);
    assert_eq!(cql("ATTR1 NOT BETWEEN 10 AND 20"), Filter::not(between));
}

#[test]
fn test_like_carries_standard_wildcards() {
    let like = Filter::Like {
        expr: prop("ATTR1"),
        pattern: "abc%".into(),
        wildcards: Wildcards::STANDARD,
        match_case: true,
    };
    assert_eq!(cql("ATTR1 LIKE 'abc%'"), like);
    assert_eq!(cql("ATTR1 NOT LIKE 'abc%'"), Filter::not(like));
    assert!(matches!(
        ecql("ATTR1 ILIKE 'abc%'"),
        Filter::Like { match_case: false, .. }
    ));
}

#[test]
fn test_is_null() {
    assert_eq!(cql("ATTR1 IS NULL"), Filter::IsNull(prop("ATTR1")));
    assert_eq!(cql("ATTR1 IS NOT NULL"), Filter::not(Filter::IsNull(prop("ATTR1"))));
}

// ============================================================================
// Extended dialect lowerings
// ============================================================================

#[test]
fn test_existence_lowering() {
    let exists = is_true(Expression::function("PropertyExists", vec![prop("NAME")]));
    assert_eq!(ecql("NAME EXISTS"), exists);
    assert_eq!(ecql("NAME DOES-NOT-EXIST"), Filter::not(exists));
}

#[test]
fn test_in_lowers_to_or_of_equals() {
    let expected = Filter::Or(vec![
        Filter::comparison(ComparisonOp::Equal, prop("length"), int(4100001)),
        Filter::comparison(ComparisonOp::Equal, prop("length"), int(4100002)),
    ]);
    assert_eq!(ecql("length IN (4100001, 4100002)"), expected);
    assert_eq!(ecql("length NOT IN (4100001, 4100002)"), Filter::not(expected));
    assert_eq!(
        ecql("length IN (1)"),
        Filter::comparison(ComparisonOp::Equal, prop("length"), int(1))
    );
}

#[test]
fn test_feature_ids() {
    assert_eq!(
        ecql("IN ('river.1', 'river.2')"),
        Filter::Id(vec!["river.1".into(), "river.2".into()])
    );
}

#[test]
fn test_bare_function_becomes_equality_with_true() {
    assert_eq!(
        ecql("isValid(the_geom)"),
        is_true(Expression::function("isValid", vec![prop("the_geom")]))
    );
}

// ============================================================================
// Relate patterns
// ============================================================================

#[test]
fn test_relate_with_digit_pattern() {
    let line = Geometry::LineString(vec![Coord::xy(1.0, 2.0), Coord::xy(10.0, 15.0)]);
    let expected = is_true(Expression::function(
        "relatePattern",
        vec![
            prop("the_geom"),
            Expression::literal(line),
            Expression::literal("201000002"),
        ],
    ));
    assert_eq!(
        ecql("RELATE(the_geom, LINESTRING(1 2, 10 15), 201000002)"),
        expected
    );
}

#[test]
fn test_relate_with_symbol_pattern() {
    match ecql("RELATE(the_geom, POINT(1 2), T*F**FFF*)") {
        Filter::Comparison {
            left: Expression::Function { name, args },
            ..
        } => {
            assert_eq!(name, "relatePattern");
            assert_eq!(args[2], Expression::literal("T*F**FFF*"));
        }
        other => panic!("Expected relatePattern comparison, got {:?}", other),
    }
}

#[test]
fn test_relate_pattern_validation() {
    for input in [
        "RELATE(the_geom, POINT(1 2), 2010000)",
        "RELATE(the_geom, POINT(1 2), 2010000021)",
        "RELATE(the_geom, POINT(1 2), 301000002)",
        "RELATE(the_geom, POINT(1 2), T*X**FFF*)",
    ] {
        let err = to_filter(input, Language::Ecql).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic, "Failed for input: {}", input);
    }
}

#[test]
fn test_same_digits_are_an_integer_elsewhere() {
    assert_eq!(to_expression("201000002", Language::Cql).unwrap(), int(201000002));
}

// ============================================================================
// Spatial filters
// ============================================================================

#[test]
fn test_binary_spatial_operator() {
    assert_eq!(
        cql("INTERSECTS(the_geom, POINT(1 2))"),
        Filter::Spatial {
            op: SpatialOp::Intersects,
            property: prop("the_geom"),
            geometry: Expression::literal(Geometry::Point(Some(Coord::xy(1.0, 2.0)))),
        }
    );
}

#[test]
fn test_bbox() {
    assert_eq!(
        cql("BBOX(ATTR1, 10, -20.5, 30, 40, 'EPSG:4326')"),
        Filter::BBox {
            property: prop("ATTR1"),
            envelope: Envelope::new(10.0, -20.5, 30.0, 40.0).with_crs(Crs::new("EPSG", "4326")),
        }
    );
    assert!(matches!(
        cql("BBOX(ATTR1, 10, 20, 30, 40)"),
        Filter::BBox { envelope: Envelope { crs: None, .. }, .. }
    ));

    let err = to_filter("BBOX(ATTR1, 10, 20, 30, 40, 'not a crs')", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Semantic);
}

#[test]
fn test_distance_filters() {
    assert_eq!(
        cql("DWITHIN(ATTR1, POINT(1 2), 10, kilometers)"),
        Filter::Distance {
            op: DistanceOp::DWithin,
            property: prop("ATTR1"),
            geometry: Expression::literal(Geometry::Point(Some(Coord::xy(1.0, 2.0)))),
            distance: 10.0,
            units: "kilometers".into(),
        }
    );
    assert!(matches!(
        cql("BEYOND(ATTR1, POINT(1 2), 2.5, feet)"),
        Filter::Distance { op: DistanceOp::Beyond, distance, .. } if distance == 2.5
    ));
}

#[test]
fn test_spatial_routine_in_expression_is_unsupported() {
    let err = to_filter("a = INTERSECTS(g, POINT(1 2))", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_malformed_geometry_is_semantic() {
    let err = to_filter("INTERSECTS(g, POINT(1))", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Semantic);
}

// ============================================================================
// Temporal filters
// ============================================================================

#[test]
fn test_after_period_with_duration() {
    let input = format!("ATTR1 AFTER {}/P10Y10M10DT5H5M5S", FIRST_DATE);
    match cql(&input) {
        Filter::Temporal {
            op: TemporalOp::After,
            property,
            value,
        } => {
            assert_eq!(property, prop("ATTR1"));
            assert_eq!(date_time_of(&value), "2017-10-10T06:35:05Z");
        }
        other => panic!("Expected AFTER, got {:?}", other),
    }
}

#[test]
fn test_before_period_uses_begin() {
    let input = format!("ATTR1 BEFORE P30D/{}", LAST_DATE);
    match cql(&input) {
        Filter::Temporal {
            op: TemporalOp::Before,
            value,
            ..
        } => assert_eq!(date_time_of(&value), "2006-12-01T01:30:00Z"),
        other => panic!("Expected BEFORE, got {:?}", other),
    }
}

#[test]
fn test_during_keeps_period() {
    let input = format!("ATTR1 DURING {}/{}", FIRST_DATE, LAST_DATE);
    match cql(&input) {
        Filter::Temporal {
            op: TemporalOp::During,
            value: Expression::Literal(Value::Period(period)),
            ..
        } => assert_eq!(period.to_string(), format!("{}/{}", FIRST_DATE, LAST_DATE)),
        other => panic!("Expected DURING, got {:?}", other),
    }
}

#[test]
fn test_before_or_during_decomposes() {
    let input = format!("ATTR1 BEFORE OR DURING {}/{}", FIRST_DATE, LAST_DATE);
    match cql(&input) {
        Filter::Or(operands) => {
            assert_eq!(operands.len(), 2);
            match &operands[0] {
                Filter::Temporal {
                    op: TemporalOp::Before,
                    value,
                    ..
                } => assert_eq!(date_time_of(value), FIRST_DATE),
                other => panic!("Expected BEFORE, got {:?}", other),
            }
            assert!(matches!(operands[1], Filter::Temporal { op: TemporalOp::During, .. }));
        }
        other => panic!("Expected OR, got {:?}", other),
    }
}

#[test]
fn test_during_or_after_decomposes() {
    let input = format!("ATTR1 DURING OR AFTER {}/T5H", FIRST_DATE);
    match cql(&input) {
        Filter::Or(operands) => {
            assert!(matches!(operands[0], Filter::Temporal { op: TemporalOp::During, .. }));
            match &operands[1] {
                Filter::Temporal {
                    op: TemporalOp::After,
                    value,
                    ..
                } => assert_eq!(date_time_of(value), "2006-11-30T06:30:00Z"),
                other => panic!("Expected AFTER, got {:?}", other),
            }
        }
        other => panic!("Expected OR, got {:?}", other),
    }
}

#[test]
fn test_tequals_and_offsets() {
    match cql("ATTR1 TEQUALS 2006-11-30T01:30:00+02:00") {
        Filter::Temporal {
            op: TemporalOp::TEquals,
            value,
            ..
        } => assert_eq!(date_time_of(&value), "2006-11-30T01:30:00+02:00"),
        other => panic!("Expected TEQUALS, got {:?}", other),
    }
}

#[test]
fn test_date_without_time_in_temporal_predicate() {
    let err = to_filter("ATTR1 BEFORE 2006-11-30", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Semantic);
    assert!(err.message().contains("time component"));
}

#[test]
fn test_date_literal_in_comparison() {
    match cql("ATTR1 > 2006-11-30") {
        Filter::Comparison {
            right: Expression::Literal(Value::Date(date)),
            ..
        } => assert_eq!((date.year(), date.month(), date.day()), (2006, 11, 30)),
        other => panic!("Expected date comparison, got {:?}", other),
    }
}

// ============================================================================
// Expressions and attributes
// ============================================================================

#[test]
fn test_expression_precedence() {
    let expected = Expression::arithmetic(
        ArithmeticOp::Add,
        Expression::arithmetic(ArithmeticOp::Add, prop("a"), prop("b")),
        prop("x/y/z"),
    );
    assert_eq!(to_expression("a + b + x.y.z", Language::Cql).unwrap(), expected);
}

#[test]
fn test_compound_attribute_path() {
    match cql("gmd:aa:bb.gmd:cc.gmd:dd < 100") {
        Filter::Comparison { left, .. } => {
            assert_eq!(left.as_property().unwrap().to_string(), "gmd:aa:bb/gmd:cc/gmd:dd")
        }
        other => panic!("Expected comparison, got {:?}", other),
    }
}

#[test]
fn test_unary_minus() {
    assert_eq!(to_expression("-5", Language::Cql).unwrap(), int(-5));
    assert_eq!(
        to_expression("-9223372036854775808", Language::Cql).unwrap(),
        int(i64::MIN)
    );
    assert_eq!(
        to_expression("-a", Language::Cql).unwrap(),
        Expression::arithmetic(ArithmeticOp::Subtract, int(0), prop("a"))
    );
    assert_eq!(to_expression("-(5)", Language::Cql).unwrap(), int(-5));
}

#[test]
fn test_function_operators_lower_to_calls() {
    assert_eq!(
        to_expression("a ^ 2", Language::Cql).unwrap(),
        Expression::function("pow", vec![prop("a"), int(2)])
    );
    assert_eq!(
        to_expression("a \\ 2", Language::Cql).unwrap(),
        Expression::function("div", vec![prop("a"), int(2)])
    );
    assert_eq!(
        to_expression("a % 3", Language::Ecql).unwrap(),
        Expression::function("IEEEremainder", vec![prop("a"), int(3)])
    );
    // Same binding strength as `*`, left to right
    assert_eq!(
        to_expression("1 + a * b ^ 2", Language::Cql).unwrap(),
        Expression::arithmetic(
            ArithmeticOp::Add,
            int(1),
            Expression::function(
                "pow",
                vec![
                    Expression::arithmetic(ArithmeticOp::Multiply, prop("a"), prop("b")),
                    int(2)
                ]
            ),
        )
    );
}

#[test]
fn test_short_dates_stay_arithmetic() {
    assert_eq!(
        cql("x = 2000-1-1"),
        Filter::comparison(
            ComparisonOp::Equal,
            prop("x"),
            Expression::arithmetic(
                ArithmeticOp::Subtract,
                Expression::arithmetic(ArithmeticOp::Subtract, int(2000), int(1)),
                int(1),
            ),
        )
    );
}

#[test]
fn test_non_ascii_offset_is_an_error() {
    let err = to_filter("ATTR = 2006-11-30T01:30:00+\u{0662}\u{0663}", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lex);
}

#[test]
fn test_spaced_period_duration() {
    let spaced = cql("ATTR1 AFTER 2006-11-30T01:30:00Z / P1D");
    assert_eq!(spaced, cql("ATTR1 AFTER 2006-11-30T01:30:00Z/P1D"));
    match spaced {
        Filter::Temporal { value, .. } => {
            assert_eq!(date_time_of(&value), "2006-12-01T01:30:00Z")
        }
        other => panic!("Expected temporal filter, got {:?}", other),
    }
}

#[test]
fn test_long_arithmetic_chains_hit_the_nesting_limit() {
    let chain = format!("ATTR = 1{}", " + 1".repeat(3000));
    let err = to_filter(&chain, Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("nesting"));

    let product = format!("ATTR = 2{}", " * 2".repeat(3000));
    assert_eq!(to_filter(&product, Language::Cql).unwrap_err().kind(), ErrorKind::Syntax);

    let short = format!("ATTR = 1{}", " + 1".repeat(20));
    assert!(to_filter(&short, Language::Cql).is_ok());
}

#[test]
fn test_deep_geometry_collections_hit_the_nesting_limit() {
    let levels = 20_000;
    let input = format!(
        "INTERSECTS(the_geom, {}POINT(1 2){})",
        "GEOMETRYCOLLECTION(".repeat(levels),
        ")".repeat(levels)
    );
    let err = to_filter(&input, Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("nesting"));

    let shallow = "INTERSECTS(the_geom, GEOMETRYCOLLECTION(GEOMETRYCOLLECTION(POINT(1 2))))";
    assert!(to_filter(shallow, Language::Cql).is_ok());
}

#[test]
fn test_measured_geometry_is_refused() {
    let err = to_filter("INTERSECTS(the_geom, POINT M (1 2 3))", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Semantic);
    assert!(to_filter("INTERSECTS(the_geom, POINT Z (1 2 3))", Language::Cql).is_ok());
}

#[test]
fn test_slash_inside_quoted_segment() {
    match cql("\"a/b\".c = 1") {
        Filter::Comparison { left, .. } => {
            let path = left.as_property().unwrap();
            assert_eq!(path.segments(), ["a/b".to_string(), "c".to_string()]);
            assert_eq!(path.to_string(), "a\\/b/c");
            assert_eq!(&AttributePath::from_external(&path.to_string()), path);
        }
        other => panic!("Expected comparison, got {:?}", other),
    }
}

#[test]
fn test_integer_overflow_is_semantic() {
    let err = to_expression("9223372036854775808", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Semantic);
}

// ============================================================================
// Filter lists and errors
// ============================================================================

#[test]
fn test_filter_list() {
    let list = to_filter_list("a = 1; ; b = 2", Language::Cql).unwrap();
    assert_eq!(
        list,
        vec![
            Filter::comparison(ComparisonOp::Equal, prop("a"), int(1)),
            Filter::Include,
            Filter::comparison(ComparisonOp::Equal, prop("b"), int(2)),
        ]
    );
    assert_eq!(to_filter_list("", Language::Cql).unwrap(), vec![Filter::Include]);
}

#[test]
fn test_empty_filter_is_a_syntax_error() {
    let err = to_filter("", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_error_reports_position_and_fragment() {
    let err = to_filter("ATTR1 < 10 AND AND", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.position().map(|p| p.column), Some(16));
    assert!(err.to_string().contains("AND"));
}

#[test]
fn test_lex_errors_surface_as_cql_errors() {
    let err = to_filter("ATTR1 = 'open", Language::Cql).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lex);
}

#[test]
fn test_unknown_language() {
    let err = "cql3".parse::<Language>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownDialect);
}
