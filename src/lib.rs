//! # cql-lang
//!
//! A compiler for the OGC Common Query Language (CQL) and its extended
//! dialect (ECQL): filter text in, filter tree out, and back again.
//!
//! ```
//! use cql_lang::{encode_filter, to_filter, Language};
//!
//! let filter = to_filter("ATTR1 < 10 AND ATTR2 LIKE 'abc%'", Language::Cql).unwrap();
//! assert_eq!(encode_filter(&filter), "ATTR1 < 10 AND ATTR2 LIKE 'abc%'");
//! ```
//!
//! Filters are built through a [`FilterFactory`], so callers can produce
//! their own filter model; [`StandardFactory`] builds this crate's
//! [`Filter`].

pub mod ast;
pub mod builder;
pub mod config;
pub mod crs;
pub mod dialect;
pub mod encoder;
pub mod error;
pub mod factory;
pub mod filter;
pub mod geometry;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod temporal;
pub mod value;

use tracing::debug;

pub use ast::{
    ArithmeticOp, AttributePath, ComparisonOp, DistanceOp, Position, SpatialOp, TemporalOp,
};
pub use builder::FilterBuilder;
pub use config::ParseOptions;
pub use dialect::{Dialect, Language};
pub use encoder::CqlEncoder;
pub use error::{CqlError, ErrorKind};
pub use factory::{FilterFactory, StandardFactory};
pub use filter::{Expression, Filter, Wildcards};
pub use lexer::{LexError, Lexer};
pub use parser::Parser;
pub use value::Value;

fn parser_for<'a>(text: &'a str, options: &ParseOptions) -> Result<Parser<'a>, CqlError> {
    let lexer = Lexer::with_dialect(text, options.language.dialect());
    Ok(Parser::new(lexer)?.with_max_depth(options.max_depth))
}

/// Parses a predicate and builds it with `factory`.
pub fn parse_filter<F: FilterFactory>(
    text: &str,
    language: Language,
    factory: &F,
) -> Result<F::Filter, CqlError> {
    parse_filter_with(text, &ParseOptions::from(language), factory)
}

pub fn parse_filter_with<F: FilterFactory>(
    text: &str,
    options: &ParseOptions,
    factory: &F,
) -> Result<F::Filter, CqlError> {
    debug!(language = %options.language, len = text.len(), "parsing filter");
    let predicate = parser_for(text, options)?.parse_filter()?;
    FilterBuilder::new(factory, text).build_filter(&predicate)
}

/// Parses an arithmetic expression and builds it with `factory`.
pub fn parse_expression<F: FilterFactory>(
    text: &str,
    language: Language,
    factory: &F,
) -> Result<F::Expr, CqlError> {
    parse_expression_with(text, &ParseOptions::from(language), factory)
}

pub fn parse_expression_with<F: FilterFactory>(
    text: &str,
    options: &ParseOptions,
    factory: &F,
) -> Result<F::Expr, CqlError> {
    debug!(language = %options.language, len = text.len(), "parsing expression");
    let expr = parser_for(text, options)?.parse_expression()?;
    FilterBuilder::new(factory, text).build_expression(&expr)
}

/// Parses `;`-separated predicates. Empty elements become `INCLUDE`.
pub fn parse_filter_list<F: FilterFactory>(
    text: &str,
    language: Language,
    factory: &F,
) -> Result<Vec<F::Filter>, CqlError> {
    parse_filter_list_with(text, &ParseOptions::from(language), factory)
}

pub fn parse_filter_list_with<F: FilterFactory>(
    text: &str,
    options: &ParseOptions,
    factory: &F,
) -> Result<Vec<F::Filter>, CqlError> {
    debug!(language = %options.language, len = text.len(), "parsing filter list");
    let predicates = parser_for(text, options)?.parse_filter_list()?;
    let builder = FilterBuilder::new(factory, text);
    predicates
        .iter()
        .map(|predicate| builder.build_filter(predicate))
        .collect()
}

/// [`parse_filter`] with the [`StandardFactory`].
pub fn to_filter(text: &str, language: Language) -> Result<Filter, CqlError> {
    parse_filter(text, language, &StandardFactory)
}

/// [`parse_expression`] with the [`StandardFactory`].
pub fn to_expression(text: &str, language: Language) -> Result<Expression, CqlError> {
    parse_expression(text, language, &StandardFactory)
}

/// [`parse_filter_list`] with the [`StandardFactory`].
pub fn to_filter_list(text: &str, language: Language) -> Result<Vec<Filter>, CqlError> {
    parse_filter_list(text, language, &StandardFactory)
}

pub fn encode_filter(filter: &Filter) -> String {
    CqlEncoder::new().encode_filter(filter)
}

pub fn encode_expression(expr: &Expression) -> String {
    CqlEncoder::new().encode_expression(expr)
}

/// Filters joined with `"; "`.
pub fn encode_filter_list(filters: &[Filter]) -> String {
    CqlEncoder::new().encode_filter_list(filters)
}
