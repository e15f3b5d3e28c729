//! Construction of filter-tree nodes.
//!
//! The [`builder`](crate::builder) never creates filter nodes itself; every
//! node goes through a [`FilterFactory`]. [`StandardFactory`] builds this
//! crate's own [`Filter`] model. Other models plug in by implementing the
//! trait.

use crate::{
    ast::{ArithmeticOp, AttributePath, ComparisonOp, DistanceOp, SpatialOp, TemporalOp},
    filter::{Expression, Filter, Wildcards},
    geometry::Envelope,
    value::Value,
};

/// One constructor per filter-node kind.
pub trait FilterFactory {
    type Filter;
    type Expr: Clone;

    fn include(&self) -> Self::Filter;
    fn exclude(&self) -> Self::Filter;

    fn literal(&self, value: Value) -> Self::Expr;
    fn property(&self, path: &AttributePath) -> Self::Expr;
    fn arithmetic(&self, op: ArithmeticOp, left: Self::Expr, right: Self::Expr) -> Self::Expr;
    fn function(&self, name: &str, args: Vec<Self::Expr>) -> Self::Expr;

    fn and(&self, operands: Vec<Self::Filter>) -> Self::Filter;
    fn or(&self, operands: Vec<Self::Filter>) -> Self::Filter;
    fn not(&self, operand: Self::Filter) -> Self::Filter;

    fn comparison(&self, op: ComparisonOp, left: Self::Expr, right: Self::Expr) -> Self::Filter;
    fn between(&self, expr: Self::Expr, low: Self::Expr, high: Self::Expr) -> Self::Filter;
    fn like(
        &self,
        expr: Self::Expr,
        pattern: &str,
        wildcards: Wildcards,
        match_case: bool,
    ) -> Self::Filter;
    fn is_null(&self, expr: Self::Expr) -> Self::Filter;

    fn spatial(&self, op: SpatialOp, property: Self::Expr, geometry: Self::Expr) -> Self::Filter;
    fn bbox(&self, property: Self::Expr, envelope: Envelope) -> Self::Filter;
    fn distance(
        &self,
        op: DistanceOp,
        property: Self::Expr,
        geometry: Self::Expr,
        distance: f64,
        units: &str,
    ) -> Self::Filter;

    fn temporal(&self, op: TemporalOp, property: Self::Expr, value: Self::Expr) -> Self::Filter;

    fn ids(&self, ids: Vec<String>) -> Self::Filter;
}

/// Builds [`Filter`] / [`Expression`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFactory;

impl FilterFactory for StandardFactory {
    type Filter = Filter;
    type Expr = Expression;

    fn include(&self) -> Filter {
        Filter::Include
    }

    fn exclude(&self) -> Filter {
        Filter::Exclude
    }

    fn literal(&self, value: Value) -> Expression {
        Expression::Literal(value)
    }

    fn property(&self, path: &AttributePath) -> Expression {
        Expression::Property(path.clone())
    }

    fn arithmetic(&self, op: ArithmeticOp, left: Expression, right: Expression) -> Expression {
        Expression::arithmetic(op, left, right)
    }

    fn function(&self, name: &str, args: Vec<Expression>) -> Expression {
        Expression::function(name, args)
    }

    fn and(&self, operands: Vec<Filter>) -> Filter {
        Filter::And(operands)
    }

    fn or(&self, operands: Vec<Filter>) -> Filter {
        Filter::Or(operands)
    }

    fn not(&self, operand: Filter) -> Filter {
        Filter::not(operand)
    }

    fn comparison(&self, op: ComparisonOp, left: Expression, right: Expression) -> Filter {
        Filter::comparison(op, left, right)
    }

    fn between(&self, expr: Expression, low: Expression, high: Expression) -> Filter {
        Filter::Between { expr, low, high }
    }

    fn like(&self, expr: Expression, pattern: &str, wildcards: Wildcards, match_case: bool) -> Filter {
        Filter::Like {
            expr,
            pattern: pattern.to_string(),
            wildcards,
            match_case,
        }
    }

    fn is_null(&self, expr: Expression) -> Filter {
        Filter::IsNull(expr)
    }

    fn spatial(&self, op: SpatialOp, property: Expression, geometry: Expression) -> Filter {
        Filter::Spatial {
            op,
            property,
            geometry,
        }
    }

    fn bbox(&self, property: Expression, envelope: Envelope) -> Filter {
        Filter::BBox { property, envelope }
    }

    fn distance(
        &self,
        op: DistanceOp,
        property: Expression,
        geometry: Expression,
        distance: f64,
        units: &str,
    ) -> Filter {
        Filter::Distance {
            op,
            property,
            geometry,
            distance,
            units: units.to_string(),
        }
    }

    fn temporal(&self, op: TemporalOp, property: Expression, value: Expression) -> Filter {
        Filter::Temporal {
            op,
            property,
            value,
        }
    }

    fn ids(&self, ids: Vec<String>) -> Filter {
        Filter::Id(ids)
    }
}
