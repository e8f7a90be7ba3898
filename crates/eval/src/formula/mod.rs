//! The points formula language: lexer, parser and interpreter.

pub mod ast;
pub mod interpreter;
pub mod lexer;
pub mod parser;

pub use interpreter::Env;
pub use parser::parse_program;
