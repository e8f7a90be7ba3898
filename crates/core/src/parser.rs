//! Recursive-descent parser from the token stream to the generic AST.
//! No semantic validation is done here -- that is the mapper's job.

use crate::ast::{Entries, Node, Number};
use crate::error::ParseError;
use crate::lexer::{Spanned, Token};

/// Deepest nesting of values below the root object.
pub const MAX_DEPTH: usize = 256;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn cur(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> &'a Token {
        self.cur().map(|s| &s.token).unwrap_or(&Token::Eof)
    }

    fn offset(&self) -> usize {
        self.cur()
            .or_else(|| self.tokens.last())
            .map(|s| s.offset)
            .unwrap_or(0)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn err(&self, expected: &str) -> ParseError {
        ParseError::new(expected, self.peek().describe(), self.offset())
    }

    fn expect(&mut self, want: Token, expected: &str) -> Result<(), ParseError> {
        if *self.peek() == want {
            self.advance();
            Ok(())
        } else {
            Err(self.err(expected))
        }
    }

    fn take_ident(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(w) = self.peek() {
            self.advance();
            Ok(w.clone())
        } else {
            Err(self.err("identifier"))
        }
    }

    // -- Productions ---------------------------------------------

    fn parse_document(&mut self) -> Result<Node, ParseError> {
        let root = self.parse_object()?;
        if *self.peek() != Token::Eof {
            return Err(self.err("end of input"));
        }
        Ok(root)
    }

    fn parse_object(&mut self) -> Result<Node, ParseError> {
        self.expect(Token::LBrace, "'{'")?;
        let mut entries = Entries::new();
        if *self.peek() == Token::RBrace {
            self.advance();
            return Ok(Node::Object { entries });
        }
        loop {
            let key = match self.peek() {
                Token::Str(s) | Token::Ident(s) => s.clone(),
                _ => return Err(self.err("object key")),
            };
            self.advance();
            self.expect(Token::Colon, "':'")?;
            let value = self.parse_value()?;
            entries.insert(key, value);
            match self.peek() {
                Token::Comma => self.advance(),
                Token::RBrace => {
                    self.advance();
                    return Ok(Node::Object { entries });
                }
                _ => return Err(self.err("',' or '}'")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Node, ParseError> {
        self.expect(Token::LBracket, "'['")?;
        let mut items = Vec::new();
        if *self.peek() == Token::RBracket {
            self.advance();
            return Ok(Node::Array { items });
        }
        loop {
            items.push(self.parse_value()?);
            match self.peek() {
                Token::Comma => self.advance(),
                Token::RBracket => {
                    self.advance();
                    return Ok(Node::Array { items });
                }
                _ => return Err(self.err("',' or ']'")),
            }
        }
    }

    /// Run a compound production one level deeper.
    fn nested(
        &mut self,
        production: fn(&mut Self) -> Result<Node, ParseError>,
    ) -> Result<Node, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.err(&format!("nesting at most {} levels deep", MAX_DEPTH)));
        }
        self.depth += 1;
        let node = production(self);
        self.depth -= 1;
        node
    }

    fn parse_value(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Token::LBrace => self.nested(Self::parse_object),
            Token::LBracket => self.nested(Self::parse_array),
            Token::Str(s) => {
                let value = s.clone();
                self.advance();
                Ok(Node::String { value })
            }
            Token::Int(n) => {
                let value = Number::Int(*n);
                self.advance();
                Ok(Node::Number { value })
            }
            Token::Float(s) => {
                let value = Number::Float(s.clone());
                self.advance();
                Ok(Node::Number { value })
            }
            Token::Bool(b) => {
                let value = *b;
                self.advance();
                Ok(Node::Bool { value })
            }
            Token::New => self.nested(Self::parse_new),
            Token::Ident(_) => self.nested(Self::parse_call),
            _ => Err(self.err("value")),
        }
    }

    /// `new Ident ('.' Ident)? '(' Value ')'`
    fn parse_new(&mut self) -> Result<Node, ParseError> {
        self.expect(Token::New, "'new'")?;
        let mut ctor = self.take_ident()?;
        if *self.peek() == Token::Dot {
            self.advance();
            let inner = self.take_ident()?;
            ctor = format!("{}.{}", ctor, inner);
        }
        self.expect(Token::LParen, "'('")?;
        let arg = self.parse_value()?;
        self.expect(Token::RParen, "')'")?;
        Ok(Node::New {
            ctor,
            arg: Box::new(arg),
        })
    }

    /// `Ident '.' Ident '(' Value ')'` -- a bare identifier is never a value.
    fn parse_call(&mut self) -> Result<Node, ParseError> {
        let object = self.take_ident()?;
        if *self.peek() != Token::Dot {
            return Err(self.err("'.' after identifier in value position"));
        }
        self.advance();
        let method = self.take_ident()?;
        self.expect(Token::LParen, "'('")?;
        let arg = self.parse_value()?;
        self.expect(Token::RParen, "')'")?;
        Ok(Node::Call {
            object,
            method,
            arg: Box::new(arg),
        })
    }
}

/// Parse a full token stream. The root is always an Object and must be
/// followed by end of input.
pub fn parse(tokens: &[Spanned]) -> Result<Node, ParseError> {
    Parser::new(tokens).parse_document()
}
