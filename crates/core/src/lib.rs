//! tdt-core: Tournament Director `.tdt` reader.
//!
//! Turns the JavaScript-literal-like `.tdt` export into a typed tournament
//! record: source text -> tokens -> generic AST -> [`TournamentData`].
//!
//! # Public API
//!
//! - [`read_tournament()`] -- run lexer, parser and mapper
//! - [`parse_source()`] -- lexer and parser only
//! - [`Diagnostics`] -- injected collector for non-fatal findings
//! - [`TdtError`] -- fatal lex / parse / mapping errors
//! - Model types: [`TournamentData`], [`PlayerResult`], [`HistoryEvent`],
//!   [`Prize`], [`Financial`]

pub mod ast;
pub mod constructor;
pub mod diagnostics;
pub mod error;
pub mod history;
pub mod lexer;
pub mod mapper;
pub mod model;
pub mod parser;
pub mod read;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Entries, Node, Number};
pub use constructor::ConstructorKind;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{LexError, MappingError, ParseError, TdtError};
pub use model::{
    AddOn, BustOutRecord, Buyin, EliminationCredit, EliminationDetails, EmbeddedHitMode,
    FeeProfile, FileConfig, Financial, HistoryCategory, HistoryEvent, Level, Metadata,
    PlayerResult, Prize, Structure, TournamentData,
};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use read::{parse_source, read_tournament};
