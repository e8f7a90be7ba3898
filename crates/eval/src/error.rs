//! Formula evaluation errors.

use serde::Serialize;
use thiserror::Error;

/// Why a formula could not produce a number.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvalError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("{name}() takes {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("formula has no result expression and never assigns 'points'")]
    NoResult,

    #[error("unknown formula key '{key}'")]
    UnknownFormula { key: String },
}

impl EvalError {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        EvalError::Syntax {
            message: message.into(),
            offset,
        }
    }
}
