use thiserror::Error as ThisError;

use crate::ast::Position;

/// Coarse classification of a [`CqlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Syntax,
    Semantic,
    Unsupported,
    UnknownDialect,
}

/// Every way turning text into a filter (or back) can fail.
///
/// All failures are terminal for the call that produced them; no partial
/// result is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum CqlError {
    /// Input the lexer cannot classify: stray characters, unterminated
    /// strings or quoted identifiers.
    #[error("lexical error at {position}: {message}")]
    Lex { message: String, position: Position },

    /// Grammar violation.
    #[error("syntax error at {position} near '{fragment}': {message}")]
    Syntax {
        message: String,
        fragment: String,
        position: Position,
    },

    /// Well-formed text whose meaning is invalid (bad relate pattern,
    /// CRS identifier, temporal literal, numeric overflow, ...).
    #[error("invalid filter at {position} near '{fragment}': {message}")]
    Semantic {
        message: String,
        fragment: String,
        position: Position,
    },

    /// Valid syntax that has no filter-tree lowering.
    #[error("unsupported construct at {position}: {construct} has no filter equivalent")]
    Unsupported { construct: String, position: Position },

    #[error("unknown dialect '{0}' (expected 'cql' or 'ecql')")]
    UnknownDialect(String),
}

impl CqlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CqlError::Lex { .. } => ErrorKind::Lex,
            CqlError::Syntax { .. } => ErrorKind::Syntax,
            CqlError::Semantic { .. } => ErrorKind::Semantic,
            CqlError::Unsupported { .. } => ErrorKind::Unsupported,
            CqlError::UnknownDialect(_) => ErrorKind::UnknownDialect,
        }
    }

    /// The human-readable part of the error, without position decoration.
    pub fn message(&self) -> String {
        match self {
            CqlError::Lex { message, .. }
            | CqlError::Syntax { message, .. }
            | CqlError::Semantic { message, .. } => message.clone(),
            CqlError::Unsupported { construct, .. } => {
                format!("{construct} has no filter equivalent")
            }
            CqlError::UnknownDialect(name) => format!("unknown dialect '{name}'"),
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            CqlError::Lex { position, .. }
            | CqlError::Syntax { position, .. }
            | CqlError::Semantic { position, .. }
            | CqlError::Unsupported { position, .. } => Some(*position),
            CqlError::UnknownDialect(_) => None,
        }
    }
}
