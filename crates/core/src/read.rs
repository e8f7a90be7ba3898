//! Source text -> tournament data.
//!
//! Thin orchestrator over lexer, parser and mapper. Any fatal error stops
//! the chain immediately and no partial data is returned.

use crate::ast::Node;
use crate::diagnostics::Diagnostics;
use crate::error::TdtError;
use crate::lexer;
use crate::mapper;
use crate::model::TournamentData;
use crate::parser;

/// Lex and parse `.tdt` source into the generic AST.
pub fn parse_source(src: &str, diags: &mut Diagnostics) -> Result<Node, TdtError> {
    let tokens = lexer::lex(src, diags)?;
    let root = parser::parse(&tokens)?;
    Ok(root)
}

/// Lex, parse and map `.tdt` source into [`TournamentData`].
pub fn read_tournament(src: &str, diags: &mut Diagnostics) -> Result<TournamentData, TdtError> {
    let root = parse_source(src, diags)?;
    let data = mapper::map(&root, diags)?;
    Ok(data)
}
