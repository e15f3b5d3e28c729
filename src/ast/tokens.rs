use std::fmt;

use crate::ast::Span;

/// Lexical tokens produced by the [`Lexer`](crate::lexer::Lexer).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Identifiers
    /// Bare attribute or function name
    ///
    /// Starts with a letter or underscore and may contain letters, digits,
    /// underscores and colons (namespace prefixes).
    ///
    /// # Examples
    /// ```text
    /// ATTR1
    /// the_geom
    /// gmd:MD_Metadata
    /// ```
    Identifier(String),

    /// Double-quoted identifier, quotes stripped
    ///
    /// Captures any character except `"` verbatim. A doubled quote is
    /// *not* an escape here, unlike string literals.
    ///
    /// # Examples
    /// ```text
    /// "first name"
    /// "12monkeys"
    /// ```
    QuotedIdentifier(String),

    // Literals
    /// Run of decimal digits
    ///
    /// Either an integer literal or (inside `RELATE`) a DE-9IM pattern;
    /// the lexer does not decide which.
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 201000002
    /// ```
    Digits(String),

    /// Decimal or exponential number, raw text
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e-7
    /// ```
    Decimal(String),

    /// Single-quoted string, quotes stripped and `''` unescaped
    ///
    /// # Examples
    /// ```text
    /// 'abc%'
    /// 'it''s'
    /// ```
    String(String),

    /// ISO-8601 calendar date without a time component
    ///
    /// # Example
    /// ```text
    /// 2006-11-30
    /// ```
    Date(String),

    /// ISO-8601 date-time with optional `Z` or numeric UTC offset
    ///
    /// # Examples
    /// ```text
    /// 2006-11-30T01:30:00Z
    /// 2006-11-30T01:30:00.123+02:00
    /// ```
    DateTime(String),

    /// ISO-8601 duration, only recognized next to a `/` period separator
    ///
    /// # Examples
    /// ```text
    /// P10Y10M10DT5H5M5S
    /// T5H
    /// ```
    Duration(String),

    /// Reserved word, matched case-insensitively
    Keyword(Keyword),

    // Comparison
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    /// `\`, integer division
    Backslash,
    /// `^`
    Caret,
    /// `%`
    Percent,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,

    /// End of input
    Eof,
}

impl Token {
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Token::Keyword(k) if *k == keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(s) | Token::Digits(s) | Token::Decimal(s) => f.write_str(s),
            Token::Date(s) | Token::DateTime(s) | Token::Duration(s) => f.write_str(s),
            Token::QuotedIdentifier(s) => write!(f, "\"{}\"", s),
            Token::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Keyword(k) => f.write_str(k.as_str()),
            Token::Eq => f.write_str("="),
            Token::NotEq => f.write_str("<>"),
            Token::Lt => f.write_str("<"),
            Token::LtEq => f.write_str("<="),
            Token::Gt => f.write_str(">"),
            Token::GtEq => f.write_str(">="),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Backslash => f.write_str("\\"),
            Token::Caret => f.write_str("^"),
            Token::Percent => f.write_str("%"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::Comma => f.write_str(","),
            Token::Dot => f.write_str("."),
            Token::Colon => f.write_str(":"),
            Token::Semicolon => f.write_str(";"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

/// A token together with the source range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Reserved words of the filter language.
///
/// Which of these a given input may use is decided by its
/// [`Dialect`](crate::dialect::Dialect); anything else lexes as an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Logical
    And,
    Or,
    Not,

    // Comparison predicates
    Between,
    Like,
    ILike,
    Is,
    Null,
    In,
    Exists,
    DoesNotExist,

    // Literals
    True,
    False,
    Include,
    Exclude,

    // Spatial operators
    Equals,
    Disjoint,
    Intersects,
    Touches,
    Crosses,
    Within,
    Contains,
    Overlaps,
    Relate,
    BBox,
    DWithin,
    Beyond,

    // Temporal operators
    TEquals,
    Before,
    After,
    During,

    // Geometry tags
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    Envelope,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("AND", Keyword::And),
    ("OR", Keyword::Or),
    ("NOT", Keyword::Not),
    ("BETWEEN", Keyword::Between),
    ("LIKE", Keyword::Like),
    ("ILIKE", Keyword::ILike),
    ("IS", Keyword::Is),
    ("NULL", Keyword::Null),
    ("IN", Keyword::In),
    ("EXISTS", Keyword::Exists),
    ("DOES-NOT-EXIST", Keyword::DoesNotExist),
    ("TRUE", Keyword::True),
    ("FALSE", Keyword::False),
    ("INCLUDE", Keyword::Include),
    ("EXCLUDE", Keyword::Exclude),
    ("EQUALS", Keyword::Equals),
    ("DISJOINT", Keyword::Disjoint),
    ("INTERSECTS", Keyword::Intersects),
    ("TOUCHES", Keyword::Touches),
    ("CROSSES", Keyword::Crosses),
    ("WITHIN", Keyword::Within),
    ("CONTAINS", Keyword::Contains),
    ("OVERLAPS", Keyword::Overlaps),
    ("RELATE", Keyword::Relate),
    ("BBOX", Keyword::BBox),
    ("DWITHIN", Keyword::DWithin),
    ("BEYOND", Keyword::Beyond),
    ("TEQUALS", Keyword::TEquals),
    ("BEFORE", Keyword::Before),
    ("AFTER", Keyword::After),
    ("DURING", Keyword::During),
    ("POINT", Keyword::Point),
    ("LINESTRING", Keyword::LineString),
    ("POLYGON", Keyword::Polygon),
    ("MULTIPOINT", Keyword::MultiPoint),
    ("MULTILINESTRING", Keyword::MultiLineString),
    ("MULTIPOLYGON", Keyword::MultiPolygon),
    ("GEOMETRYCOLLECTION", Keyword::GeometryCollection),
    ("ENVELOPE", Keyword::Envelope),
];

impl Keyword {
    /// Case-insensitive lookup of a reserved word.
    pub fn from_word(word: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(text, _)| text.eq_ignore_ascii_case(word))
            .map(|(_, keyword)| *keyword)
    }

    /// Canonical (upper-case) spelling.
    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| *keyword == self)
            .map(|(text, _)| *text)
            .unwrap_or("")
    }

    pub fn is_geometry_tag(self) -> bool {
        matches!(
            self,
            Keyword::Point
                | Keyword::LineString
                | Keyword::Polygon
                | Keyword::MultiPoint
                | Keyword::MultiLineString
                | Keyword::MultiPolygon
                | Keyword::GeometryCollection
                | Keyword::Envelope
        )
    }

    /// Operators written as `NAME(args)` that produce a spatial filter.
    pub fn is_spatial_operator(self) -> bool {
        matches!(
            self,
            Keyword::Equals
                | Keyword::Disjoint
                | Keyword::Intersects
                | Keyword::Touches
                | Keyword::Crosses
                | Keyword::Within
                | Keyword::Contains
                | Keyword::Overlaps
                | Keyword::Relate
                | Keyword::BBox
                | Keyword::DWithin
                | Keyword::Beyond
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
