//! Filter-to-text encoding.
//!
//! Output is always in the standard dialect's syntax except for the forms
//! only the extended dialect has (`ILIKE`, feature-id `IN`). Re-parsing the
//! output gives back an equivalent filter; grouping is normalized to
//! `( ... )` and only emitted where precedence requires it.
//!
//! # Examples
//!
//! ```
//! use cql_lang::{encoder::CqlEncoder, Filter, Expression, ComparisonOp};
//!
//! let filter = Filter::comparison(
//!     ComparisonOp::LessThan,
//!     Expression::property("ATTR1"),
//!     Expression::literal(10i64),
//! );
//! assert_eq!(CqlEncoder::new().encode_filter(&filter), "ATTR1 < 10");
//! ```

use crate::{
    ast::{AttributePath, Keyword},
    filter::{Expression, Filter, Wildcards},
    geometry::Envelope,
    value::Value,
};

/// Binding strength of the logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Logical {
    Or,
    And,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CqlEncoder;

impl CqlEncoder {
    pub fn new() -> Self {
        CqlEncoder
    }

    pub fn encode_filter(&self, filter: &Filter) -> String {
        match filter {
            Filter::Include => "INCLUDE".to_string(),
            Filter::Exclude => "EXCLUDE".to_string(),
            Filter::And(operands) if operands.is_empty() => "INCLUDE".to_string(),
            Filter::Or(operands) if operands.is_empty() => "EXCLUDE".to_string(),
            Filter::And(operands) => self.logical(operands, Logical::And),
            Filter::Or(operands) => self.logical(operands, Logical::Or),
            Filter::Not(operand) => format!("NOT ({})", self.encode_filter(operand)),

            Filter::Comparison { op, left, right } => format!(
                "{} {} {}",
                self.encode_expression(left),
                op.symbol(),
                self.encode_expression(right)
            ),
            Filter::Between { expr, low, high } => format!(
                "{} BETWEEN {} AND {}",
                self.encode_expression(expr),
                self.encode_expression(low),
                self.encode_expression(high)
            ),
            Filter::Like {
                expr,
                pattern,
                wildcards,
                match_case,
            } => format!(
                "{} {} {}",
                self.encode_expression(expr),
                if *match_case { "LIKE" } else { "ILIKE" },
                quote(&standard_pattern(pattern, wildcards))
            ),
            Filter::IsNull(expr) => format!("{} IS NULL", self.encode_expression(expr)),

            Filter::Spatial {
                op,
                property,
                geometry,
            } => format!(
                "{}({}, {})",
                op.keyword(),
                self.encode_expression(property),
                self.encode_expression(geometry)
            ),
            Filter::BBox { property, envelope } => {
                format!("BBOX({}, {})", self.encode_expression(property), bbox_bounds(envelope))
            }
            Filter::Distance {
                op,
                property,
                geometry,
                distance,
                units,
            } => format!(
                "{}({}, {}, {:?}, {})",
                op.keyword(),
                self.encode_expression(property),
                self.encode_expression(geometry),
                distance,
                units_text(units)
            ),
            Filter::Temporal {
                op,
                property,
                value,
            } => format!(
                "{} {} {}",
                self.encode_expression(property),
                op.keyword(),
                self.encode_expression(value)
            ),
            Filter::Id(ids) => {
                let ids: Vec<String> = ids.iter().map(|id| quote(id)).collect();
                format!("IN ({})", ids.join(", "))
            }
        }
    }

    pub fn encode_filter_list(&self, filters: &[Filter]) -> String {
        filters
            .iter()
            .map(|filter| self.encode_filter(filter))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn logical(&self, operands: &[Filter], op: Logical) -> String {
        let keyword = match op {
            Logical::Or => " OR ",
            Logical::And => " AND ",
        };
        operands
            .iter()
            .map(|operand| {
                let text = self.encode_filter(operand);
                let nested = match operand {
                    Filter::And(children) if !children.is_empty() => Some(Logical::And),
                    Filter::Or(children) if !children.is_empty() => Some(Logical::Or),
                    _ => None,
                };
                match nested {
                    Some(inner) if inner <= op => format!("({})", text),
                    _ => text,
                }
            })
            .collect::<Vec<_>>()
            .join(keyword)
    }

    pub fn encode_expression(&self, expr: &Expression) -> String {
        match expr {
            Expression::Literal(value) => literal_text(value),
            Expression::Property(path) => path_text(path),
            Expression::Arithmetic { op, left, right } => {
                let mut left_text = self.encode_expression(left);
                if let Expression::Arithmetic { op: inner, .. } = left.as_ref() {
                    if inner.precedence() < op.precedence() {
                        left_text = format!("({})", left_text);
                    }
                }
                let mut right_text = self.encode_expression(right);
                if let Expression::Arithmetic { op: inner, .. } = right.as_ref() {
                    if inner.precedence() <= op.precedence() {
                        right_text = format!("({})", right_text);
                    }
                }
                format!("{} {} {}", left_text, op.symbol(), right_text)
            }
            Expression::Function { name, args } => {
                let args: Vec<String> = args.iter().map(|arg| self.encode_expression(arg)).collect();
                format!("{}({})", name, args.join(", "))
            }
        }
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        other => other.to_string(),
    }
}

fn is_plain_word(word: &str) -> bool {
    let mut chars = word.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    starts_well
        && word.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ':')
        && !word.ends_with(':')
        && Keyword::from_word(word).is_none()
}

fn path_text(path: &AttributePath) -> String {
    path.segments()
        .iter()
        .map(|segment| {
            if is_plain_word(segment) {
                segment.clone()
            } else {
                format!("\"{}\"", segment)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn units_text(units: &str) -> String {
    if !units.is_empty() && units.split(' ').all(is_plain_word) {
        units.to_string()
    } else {
        quote(units)
    }
}

fn bbox_bounds(envelope: &Envelope) -> String {
    let mut text = format!(
        "{:?}, {:?}, {:?}, {:?}",
        envelope.min_x, envelope.min_y, envelope.max_x, envelope.max_y
    );
    if let Some(crs) = &envelope.crs {
        text.push_str(", ");
        text.push_str(&quote(&crs.to_string()));
    }
    text
}

/// Rewrites a LIKE pattern to use `%`, `_` and `\`.
fn standard_pattern(pattern: &str, wildcards: &Wildcards) -> String {
    if *wildcards == Wildcards::STANDARD {
        return pattern.to_string();
    }

    let standard = Wildcards::STANDARD;
    let escape_literal = |c: char, out: &mut String| {
        if c == standard.multi || c == standard.single || c == standard.escape {
            out.push(standard.escape);
        }
        out.push(c);
    };

    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == wildcards.escape {
            if let Some(escaped) = chars.next() {
                escape_literal(escaped, &mut out);
            }
        } else if c == wildcards.multi {
            out.push(standard.multi);
        } else if c == wildcards.single {
            out.push(standard.single);
        } else {
            escape_literal(c, &mut out);
        }
    }
    out
}
