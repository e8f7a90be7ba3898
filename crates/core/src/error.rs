//! Fatal error taxonomy for reading a `.tdt` file.
//!
//! Only three conditions abort an import: an unrecognized character in the
//! source, a structural mismatch in the token stream, or a document that is
//! missing its `Tournament` root. Everything else is reported through
//! [`crate::diagnostics::Diagnostics`].

use serde::Serialize;

/// A byte that does not start any recognized token.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("unexpected character {ch:?} at offset {offset}")]
pub struct LexError {
    pub offset: usize,
    pub ch: char,
}

/// The token stream does not match the grammar.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("expected {expected}, found {found} at offset {offset}")]
pub struct ParseError {
    pub expected: String,
    pub found: String,
    pub offset: usize,
}

impl ParseError {
    pub fn new(expected: impl Into<String>, found: impl Into<String>, offset: usize) -> Self {
        ParseError {
            expected: expected.into(),
            found: found.into(),
            offset,
        }
    }
}

/// A required structural landmark is absent from the AST.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("mapping failed: {reason}")]
pub struct MappingError {
    pub reason: String,
}

impl MappingError {
    pub fn new(reason: impl Into<String>) -> Self {
        MappingError {
            reason: reason.into(),
        }
    }
}

/// Any fatal error raised while turning source text into tournament data.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TdtError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl TdtError {
    /// Serialize to a JSON object with a `kind` tag, for CLI error output.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": match self {
                TdtError::Lex(_) => "lex",
                TdtError::Parse(_) => "parse",
                TdtError::Mapping(_) => "mapping",
            },
            "message": self.to_string(),
        })
    }
}
