//! Language variants and the keywords each one reserves.
//!
//! Both dialects share one grammar; they differ only in the data below.
//! Descriptors are `static` and immutable, so concurrent parses can read
//! them freely.

use std::{fmt, str::FromStr};

use crate::{ast::Keyword, error::CqlError};

/// Description of one language variant.
#[derive(Debug, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    /// Keywords added on top of [`BASE_KEYWORDS`]
    pub extensions: &'static [Keyword],
    /// `[...]` accepted as a grouping delimiter
    pub bracket_grouping: bool,
    /// Function calls and boolean literals accepted in predicate position
    pub expression_predicates: bool,
}

/// Keywords every dialect reserves.
pub const BASE_KEYWORDS: &[Keyword] = &[
    Keyword::And,
    Keyword::Or,
    Keyword::Not,
    Keyword::Between,
    Keyword::Like,
    Keyword::Is,
    Keyword::Null,
    Keyword::True,
    Keyword::False,
    Keyword::Include,
    Keyword::Exclude,
    Keyword::Equals,
    Keyword::Disjoint,
    Keyword::Intersects,
    Keyword::Touches,
    Keyword::Crosses,
    Keyword::Within,
    Keyword::Contains,
    Keyword::Overlaps,
    Keyword::BBox,
    Keyword::DWithin,
    Keyword::Beyond,
    Keyword::TEquals,
    Keyword::Before,
    Keyword::After,
    Keyword::During,
    Keyword::Point,
    Keyword::LineString,
    Keyword::Polygon,
    Keyword::MultiPoint,
    Keyword::MultiLineString,
    Keyword::MultiPolygon,
    Keyword::GeometryCollection,
    Keyword::Envelope,
];

/// OGC Common Query Language.
pub static CQL: Dialect = Dialect {
    name: "cql",
    extensions: &[],
    bracket_grouping: true,
    expression_predicates: false,
};

/// Extended CQL: relate patterns, existence checks, `ILIKE`, `IN`.
pub static ECQL: Dialect = Dialect {
    name: "ecql",
    extensions: &[
        Keyword::Relate,
        Keyword::Exists,
        Keyword::DoesNotExist,
        Keyword::ILike,
        Keyword::In,
    ],
    bracket_grouping: true,
    expression_predicates: true,
};

static REGISTRY: &[&Dialect] = &[&CQL, &ECQL];

impl Dialect {
    pub fn recognizes(&self, keyword: Keyword) -> bool {
        BASE_KEYWORDS.contains(&keyword) || self.extensions.contains(&keyword)
    }
}

/// Looks up a dialect by name, case-insensitively.
pub fn resolve(name: &str) -> Result<&'static Dialect, CqlError> {
    REGISTRY
        .iter()
        .find(|dialect| dialect.name.eq_ignore_ascii_case(name.trim()))
        .copied()
        .ok_or_else(|| CqlError::UnknownDialect(name.to_string()))
}

/// Selector for the builtin dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Cql,
    Ecql,
}

impl Language {
    pub fn dialect(self) -> &'static Dialect {
        match self {
            Language::Cql => &CQL,
            Language::Ecql => &ECQL,
        }
    }
}

impl FromStr for Language {
    type Err = CqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dialect = resolve(s)?;
        Ok(if std::ptr::eq(dialect, &ECQL) {
            Language::Ecql
        } else {
            Language::Cql
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dialect().name)
    }
}
