//! # CQL / ECQL - Abstract Syntax Tree
//!
//! This module defines the syntax tree produced by the [`Parser`](crate::parser::Parser)
//! for the OGC Common Query Language and its extended dialect. The tree is a
//! faithful, position-carrying picture of the source text; turning it into a
//! filter is the job of the [`builder`](crate::builder).
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens and the reserved-word table
//! - **[span]** - Source positions used for diagnostics
//! - **[path]** - Attribute paths (`a.b`, `gmd:aa:bb`)
//! - **[operators]** - Comparison, arithmetic, spatial and temporal operators
//! - **[expressions]** - Operand nodes (literals, attributes, arithmetic, calls)
//! - **[predicates]** - Predicate nodes (comparisons, boolean logic, spatial, temporal)
//!
//! ## Quick Start
//!
//! ```text
//! ATTR1 < 10 AND INTERSECTS(the_geom, POINT(1 2))
//! ```
//!
//! parses to an `And` predicate holding a `Comparison` and a `Spatial` node.
//!
//! ## Ownership
//!
//! Every node owns its children; there is no sharing between nodes or between
//! parses, and every node records the [`Span`] it was read from.
//!
//! ## Examples
//!
//! ### Temporal period
//!
//! ```text
//! ATTR1 DURING 2006-11-30T01:30:00Z/P10Y10M10DT5H5M5S
//! ```
//!
//! ### Compound attribute
//!
//! ```text
//! gmd:aa:bb.gmd:cc.gmd:dd < 100
//! ```
//!
//! ### Relate pattern
//!
//! ```text
//! RELATE(the_geom, LINESTRING(1 2, 10 15), T*F**FFF*)
//! ```
pub mod expressions;
pub mod operators;
pub mod path;
pub mod predicates;
pub mod span;
pub mod tokens;

pub use expressions::{Expr, Literal};
pub use operators::{
    ArithmeticOp, ComparisonOp, DistanceOp, FunctionOp, SpatialOp, TemporalOp, TemporalPredicate,
};
pub use path::AttributePath;
pub use predicates::{Predicate, TemporalBound, TemporalOperand};
pub use span::{Position, Span};
pub use tokens::{Keyword, SpannedToken, Token};
