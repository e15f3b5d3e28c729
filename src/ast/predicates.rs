use crate::ast::{ComparisonOp, DistanceOp, Expr, Span, SpatialOp, TemporalPredicate};

/// One bound of a temporal period, raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalBound {
    DateTime { text: String, span: Span },
    /// Only valid in comparisons; rejected by the builder in temporal predicates
    Date { text: String, span: Span },
    Duration { text: String, span: Span },
}

impl TemporalBound {
    pub fn span(&self) -> Span {
        match self {
            TemporalBound::DateTime { span, .. }
            | TemporalBound::Date { span, .. }
            | TemporalBound::Duration { span, .. } => *span,
        }
    }
}

/// Right-hand side of a temporal predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalOperand {
    /// Single instant
    Instant(TemporalBound),
    /// `begin/end`, where either side may be a duration
    Period(TemporalBound, TemporalBound),
}

/// Predicate node: anything that evaluates to true or false.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `INCLUDE`, or an empty element of a filter list
    Include(Span),

    /// `EXCLUDE`
    Exclude(Span),

    /// Conjunction of two or more operands
    ///
    /// # Example
    /// ```text
    /// ATTR1 < 10 AND ATTR2 < 2
    /// ```
    And { operands: Vec<Predicate>, span: Span },

    /// Disjunction of two or more operands
    Or { operands: Vec<Predicate>, span: Span },

    /// Negation
    ///
    /// # Example
    /// ```text
    /// NOT (ATTR1 < 10)
    /// ```
    Not { operand: Box<Predicate>, span: Span },

    /// Binary comparison
    ///
    /// # Example
    /// ```text
    /// ATTR1 <> 'abc'
    /// ```
    Comparison {
        op: ComparisonOp,
        left: Expr,
        right: Expr,
        span: Span,
    },

    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: Expr,
        low: Expr,
        high: Expr,
        negated: bool,
        span: Span,
    },

    /// `expr [NOT] LIKE 'pattern'` or `ILIKE`
    Like {
        expr: Expr,
        pattern: String,
        negated: bool,
        case_insensitive: bool,
        span: Span,
    },

    /// `expr IS [NOT] NULL`
    IsNull {
        expr: Expr,
        negated: bool,
        span: Span,
    },

    /// `attr EXISTS` / `attr DOES-NOT-EXIST`
    Exists {
        attribute: Expr,
        negated: bool,
        span: Span,
    },

    /// `expr [NOT] IN (v1, v2, ...)`
    In {
        expr: Expr,
        values: Vec<Expr>,
        negated: bool,
        span: Span,
    },

    /// Feature-id filter `IN ('id1', 'id2')`
    Id { ids: Vec<Expr>, span: Span },

    /// `OP(property, geometry)`
    Spatial {
        op: SpatialOp,
        property: Expr,
        geometry: Expr,
        span: Span,
    },

    /// `BBOX(property, minX, minY, maxX, maxY [, 'srs'])`
    BBox {
        property: Expr,
        bounds: [Expr; 4],
        srs: Option<String>,
        span: Span,
    },

    /// `RELATE(property, geometry, pattern)`
    Relate {
        property: Expr,
        geometry: Expr,
        pattern: Expr,
        span: Span,
    },

    /// `DWITHIN(property, geometry, distance, units)` / `BEYOND(...)`
    Distance {
        op: DistanceOp,
        property: Expr,
        geometry: Expr,
        distance: Expr,
        units: String,
        span: Span,
    },

    /// `property BEFORE 2006-11-30T01:30:00Z` and friends
    Temporal {
        op: TemporalPredicate,
        property: Expr,
        operand: TemporalOperand,
        span: Span,
    },

    /// Boolean-valued expression in predicate position, e.g. `isValid(geom)`
    Expression { expr: Expr, span: Span },
}

impl Predicate {
    pub fn span(&self) -> Span {
        match self {
            Predicate::Include(span) | Predicate::Exclude(span) => *span,
            Predicate::And { span, .. }
            | Predicate::Or { span, .. }
            | Predicate::Not { span, .. }
            | Predicate::Comparison { span, .. }
            | Predicate::Between { span, .. }
            | Predicate::Like { span, .. }
            | Predicate::IsNull { span, .. }
            | Predicate::Exists { span, .. }
            | Predicate::In { span, .. }
            | Predicate::Id { span, .. }
            | Predicate::Spatial { span, .. }
            | Predicate::BBox { span, .. }
            | Predicate::Relate { span, .. }
            | Predicate::Distance { span, .. }
            | Predicate::Temporal { span, .. }
            | Predicate::Expression { span, .. } => *span,
        }
    }
}
