//! JSON rendering of filter trees.
//!
//! Mostly a debugging aid: it shows the exact shape the builder produced,
//! which the textual encoding deliberately normalizes away.
//!
//! # Examples
//!
//! ```
//! use cql_lang::{Language, output::to_json_string, to_filter};
//!
//! let filter = to_filter("ATTR1 < 10", Language::Cql).unwrap();
//! assert_eq!(
//!     to_json_string(&filter),
//!     r#"{"left":{"property":"ATTR1"},"op":"<","right":{"literal":10,"type":"integer"}}"#
//! );
//! ```

use serde_json::{Value as Json, json};

use crate::{
    filter::{Expression, Filter},
    value::Value,
};

pub fn to_json(filter: &Filter) -> Json {
    match filter {
        Filter::Include => json!({ "op": "include" }),
        Filter::Exclude => json!({ "op": "exclude" }),
        Filter::And(operands) => json!({
            "op": "and",
            "operands": operands.iter().map(to_json).collect::<Vec<_>>(),
        }),
        Filter::Or(operands) => json!({
            "op": "or",
            "operands": operands.iter().map(to_json).collect::<Vec<_>>(),
        }),
        Filter::Not(operand) => json!({ "op": "not", "operand": to_json(operand) }),
        Filter::Comparison { op, left, right } => json!({
            "op": op.symbol(),
            "left": expression_to_json(left),
            "right": expression_to_json(right),
        }),
        Filter::Between { expr, low, high } => json!({
            "op": "between",
            "expr": expression_to_json(expr),
            "low": expression_to_json(low),
            "high": expression_to_json(high),
        }),
        Filter::Like {
            expr,
            pattern,
            wildcards,
            match_case,
        } => json!({
            "op": "like",
            "expr": expression_to_json(expr),
            "pattern": pattern,
            "wildcards": {
                "multi": wildcards.multi.to_string(),
                "single": wildcards.single.to_string(),
                "escape": wildcards.escape.to_string(),
            },
            "matchCase": match_case,
        }),
        Filter::IsNull(expr) => json!({ "op": "isNull", "expr": expression_to_json(expr) }),
        Filter::Spatial {
            op,
            property,
            geometry,
        } => json!({
            "op": op.keyword().to_lowercase(),
            "property": expression_to_json(property),
            "geometry": expression_to_json(geometry),
        }),
        Filter::BBox { property, envelope } => json!({
            "op": "bbox",
            "property": expression_to_json(property),
            "envelope": [envelope.min_x, envelope.min_y, envelope.max_x, envelope.max_y],
            "crs": envelope.crs.as_ref().map(|crs| crs.to_string()),
        }),
        Filter::Distance {
            op,
            property,
            geometry,
            distance,
            units,
        } => json!({
            "op": op.keyword().to_lowercase(),
            "property": expression_to_json(property),
            "geometry": expression_to_json(geometry),
            "distance": distance,
            "units": units,
        }),
        Filter::Temporal {
            op,
            property,
            value,
        } => json!({
            "op": op.keyword().to_lowercase(),
            "property": expression_to_json(property),
            "value": expression_to_json(value),
        }),
        Filter::Id(ids) => json!({ "op": "id", "ids": ids }),
    }
}

pub fn expression_to_json(expr: &Expression) -> Json {
    match expr {
        Expression::Literal(value) => json!({
            "literal": literal_json(value),
            "type": value.type_name(),
        }),
        Expression::Property(path) => json!({ "property": path.to_string() }),
        Expression::Arithmetic { op, left, right } => json!({
            "op": op.symbol(),
            "left": expression_to_json(left),
            "right": expression_to_json(right),
        }),
        Expression::Function { name, args } => json!({
            "function": name,
            "args": args.iter().map(expression_to_json).collect::<Vec<_>>(),
        }),
    }
}

fn literal_json(value: &Value) -> Json {
    match value {
        Value::Boolean(b) => json!(b),
        Value::Integer(n) => json!(n),
        Value::Float(n) => json!(n),
        Value::String(s) => json!(s),
        other => json!(other.to_string()),
    }
}

/// Compact JSON text.
pub fn to_json_string(filter: &Filter) -> String {
    to_json(filter).to_string()
}

/// JSON text indented with two spaces.
pub fn to_json_pretty(filter: &Filter) -> String {
    format!("{:#}", to_json(filter))
}
