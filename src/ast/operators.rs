/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equal (`=`)
    Equal,
    /// Not equal (`<>`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "<>",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterEqual => ">=",
        }
    }
}

/// Arithmetic operators, all left-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            ArithmeticOp::Add | ArithmeticOp::Subtract => 1,
            ArithmeticOp::Multiply | ArithmeticOp::Divide => 2,
        }
    }
}

/// Arithmetic operators with no filter-tree counterpart of their own.
///
/// They bind like `*` and `/`; the builder lowers each to a two-argument
/// function call (`a ^ 2` becomes `pow(a, 2)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionOp {
    /// Integer division (`\`)
    IntegerDivide,
    /// Exponentiation (`^`)
    Power,
    /// IEEE 754 remainder (`%`)
    Remainder,
}

impl FunctionOp {
    pub fn symbol(self) -> &'static str {
        match self {
            FunctionOp::IntegerDivide => "\\",
            FunctionOp::Power => "^",
            FunctionOp::Remainder => "%",
        }
    }

    /// Name of the function the operator lowers to.
    pub fn function_name(self) -> &'static str {
        match self {
            FunctionOp::IntegerDivide => "div",
            FunctionOp::Power => "pow",
            FunctionOp::Remainder => "IEEEremainder",
        }
    }
}

/// Binary spatial relationship between a property and a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialOp {
    Equals,
    Disjoint,
    Intersects,
    Touches,
    Crosses,
    Within,
    Contains,
    Overlaps,
}

impl SpatialOp {
    pub fn keyword(self) -> &'static str {
        match self {
            SpatialOp::Equals => "EQUALS",
            SpatialOp::Disjoint => "DISJOINT",
            SpatialOp::Intersects => "INTERSECTS",
            SpatialOp::Touches => "TOUCHES",
            SpatialOp::Crosses => "CROSSES",
            SpatialOp::Within => "WITHIN",
            SpatialOp::Contains => "CONTAINS",
            SpatialOp::Overlaps => "OVERLAPS",
        }
    }
}

/// Distance-buffer operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceOp {
    /// Within the given distance (`DWITHIN`)
    DWithin,
    /// Further than the given distance (`BEYOND`)
    Beyond,
}

impl DistanceOp {
    pub fn keyword(self) -> &'static str {
        match self {
            DistanceOp::DWithin => "DWITHIN",
            DistanceOp::Beyond => "BEYOND",
        }
    }
}

/// Temporal operators as they appear in the filter tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalOp {
    After,
    Before,
    During,
    TEquals,
}

impl TemporalOp {
    pub fn keyword(self) -> &'static str {
        match self {
            TemporalOp::After => "AFTER",
            TemporalOp::Before => "BEFORE",
            TemporalOp::During => "DURING",
            TemporalOp::TEquals => "TEQUALS",
        }
    }
}

/// Temporal predicate forms the grammar accepts.
///
/// The two compound forms have no filter-tree counterpart; the builder
/// decomposes them into an `OR` of simple temporal filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalPredicate {
    After,
    Before,
    During,
    TEquals,
    /// `BEFORE OR DURING`
    BeforeOrDuring,
    /// `DURING OR AFTER`
    DuringOrAfter,
}
