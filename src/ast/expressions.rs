use crate::ast::{ArithmeticOp, AttributePath, FunctionOp, Keyword, Span};

/// Literal as written in the source, before semantic resolution.
///
/// Numeric and temporal literals keep their raw text; the builder turns
/// them into typed values and reports overflow or malformed values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Digit run pending resolution
    ///
    /// Resolved to an integer everywhere except as the pattern argument
    /// of `RELATE`, where it is a DE-9IM intersection pattern. Relate
    /// patterns containing `T`, `F` or `*` are also carried here.
    NumericOrPattern(String),

    /// Decimal or exponential number
    Decimal(String),

    /// String literal, already unescaped
    String(String),

    /// `TRUE` / `FALSE`
    Boolean(bool),

    /// Calendar date (`2006-11-30`)
    Date(String),

    /// Date-time (`2006-11-30T01:30:00Z`)
    DateTime(String),
}

/// Expression node: the operands of predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 'abc'
    /// 2006-11-30T01:30:00Z
    /// ```
    Literal { value: Literal, span: Span },

    /// Attribute reference
    ///
    /// # Examples
    /// ```text
    /// ATTR1
    /// gmd:aa:bb.gmd:cc
    /// "first name"
    /// ```
    Attribute { path: AttributePath, span: Span },

    /// Unary minus
    Negate { operand: Box<Expr>, span: Span },

    /// Binary arithmetic
    ///
    /// # Example
    /// ```text
    /// a + b * 2
    /// ```
    Binary {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },

    /// Binary operator spelled as a symbol but built as a function call
    ///
    /// # Example
    /// ```text
    /// a ^ 2
    /// ```
    FunctionOperator {
        op: FunctionOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },

    /// Function call with positional arguments
    ///
    /// # Example
    /// ```text
    /// strConcat(A, '1')
    /// ```
    Function {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },

    /// Geometry literal, raw WKT text
    ///
    /// # Examples
    /// ```text
    /// POINT(1 2)
    /// ENVELOPE(-180, 180, 90, -90)
    /// ```
    Geometry { wkt: String, span: Span },

    /// Spatial operator invoked in expression position
    ///
    /// The grammar accepts it; the builder reports it as unsupported.
    ///
    /// # Example
    /// ```text
    /// a = INTERSECTS(geom, POINT(1 2))
    /// ```
    Routine {
        name: Keyword,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Attribute { span, .. }
            | Expr::Negate { span, .. }
            | Expr::Binary { span, .. }
            | Expr::FunctionOperator { span, .. }
            | Expr::Function { span, .. }
            | Expr::Geometry { span, .. }
            | Expr::Routine { span, .. } => *span,
        }
    }

    /// The attribute path, when this expression is a bare attribute.
    pub fn as_attribute(&self) -> Option<&AttributePath> {
        match self {
            Expr::Attribute { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Whether the expression may stand alone as a predicate (`f(x)`, `TRUE`).
    pub fn is_boolean_candidate(&self) -> bool {
        matches!(
            self,
            Expr::Function { .. }
                | Expr::Literal {
                    value: Literal::Boolean(_),
                    ..
                }
        )
    }
}
