//! # Filter tree
//!
//! The default filter model produced by [`StandardFactory`](crate::factory::StandardFactory)
//! and consumed by the [`encoder`](crate::encoder) and the JSON
//! [`output`](crate::output). Callers with their own model implement
//! [`FilterFactory`](crate::factory::FilterFactory) instead.
//!
//! Node shapes follow the filter-encoding vocabulary: comparisons,
//! logical combinators, pattern matches, spatial and temporal operators,
//! each holding [`Expression`] operands.

use crate::{
    ast::{ArithmeticOp, AttributePath, ComparisonOp, DistanceOp, SpatialOp, TemporalOp},
    geometry::Envelope,
    value::Value,
};

/// Operand of a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Property(AttributePath),
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Function {
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Property reference from an external `/`-joined path.
    pub fn property(path: &str) -> Self {
        Expression::Property(AttributePath::from_external(path))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function {
            name: name.into(),
            args,
        }
    }

    pub fn arithmetic(op: ArithmeticOp, left: Expression, right: Expression) -> Self {
        Expression::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn as_property(&self) -> Option<&AttributePath> {
        match self {
            Expression::Property(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expression::Literal(value) => Some(value),
            _ => None,
        }
    }
}

/// Wildcard symbols of a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wildcards {
    /// Matches any run of characters
    pub multi: char,
    /// Matches exactly one character
    pub single: char,
    pub escape: char,
}

impl Wildcards {
    /// `%`, `_` and `\`, the symbols filter text uses.
    pub const STANDARD: Wildcards = Wildcards {
        multi: '%',
        single: '_',
        escape: '\\',
    };
}

impl Default for Wildcards {
    fn default() -> Self {
        Wildcards::STANDARD
    }
}

/// Filter node.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Always true
    Include,

    /// Always false
    Exclude,

    And(Vec<Filter>),

    Or(Vec<Filter>),

    Not(Box<Filter>),

    Comparison {
        op: ComparisonOp,
        left: Expression,
        right: Expression,
    },

    /// Inclusive range check
    Between {
        expr: Expression,
        low: Expression,
        high: Expression,
    },

    Like {
        expr: Expression,
        pattern: String,
        wildcards: Wildcards,
        match_case: bool,
    },

    IsNull(Expression),

    Spatial {
        op: SpatialOp,
        property: Expression,
        geometry: Expression,
    },

    BBox {
        property: Expression,
        envelope: Envelope,
    },

    /// Distance-buffer operator; the unit is carried verbatim
    Distance {
        op: DistanceOp,
        property: Expression,
        geometry: Expression,
        distance: f64,
        units: String,
    },

    Temporal {
        op: TemporalOp,
        property: Expression,
        value: Expression,
    },

    /// Feature identifiers
    Id(Vec<String>),
}

impl Filter {
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    pub fn comparison(op: ComparisonOp, left: Expression, right: Expression) -> Self {
        Filter::Comparison { op, left, right }
    }
}
