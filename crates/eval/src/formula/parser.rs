//! Recursive-descent formula parser.
//!
//! program   = statement (';' statement)* ';'?
//! statement = 'assign' '(' STRING ',' expr ')' | expr
//! expr      = or
//! or        = and ('||' and)*
//! and       = equality ('&&' equality)*
//! equality  = compare (('==' | '!=') compare)*
//! compare   = additive (('<' | '<=' | '>' | '>=') additive)*
//! additive  = term (('+' | '-') term)*
//! term      = unary (('*' | '/') unary)*
//! unary     = ('-' | '!' | '+') unary | primary
//! primary   = NUMBER | IDENT | IDENT '(' args? ')' | '(' expr ')'

use super::ast::{BinaryOp, Expr, Program, Stmt, UnaryOp};
use super::lexer::{tokenize, Tok, Token};
use crate::error::EvalError;

pub fn parse_program(src: &str) -> Result<Program, EvalError> {
    let tokens = tokenize(src)?;
    let mut p = Parser {
        tokens: &tokens,
        pos: 0,
    };
    p.program()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn cur(&self) -> &Tok {
        self.tokens
            .get(self.pos)
            .map(|t| &t.tok)
            .unwrap_or(&Tok::Eof)
    }

    fn peek(&self, ahead: usize) -> &Tok {
        self.tokens
            .get(self.pos + ahead)
            .map(|t| &t.tok)
            .unwrap_or(&Tok::Eof)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.offset)
            .unwrap_or(0)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn err(&self, expected: &str) -> EvalError {
        EvalError::syntax(
            format!("expected {}, found {}", expected, self.cur().describe()),
            self.offset(),
        )
    }

    fn expect(&mut self, tok: Tok, what: &str) -> Result<(), EvalError> {
        if *self.cur() == tok {
            self.advance();
            Ok(())
        } else {
            Err(self.err(what))
        }
    }

    // ── Statements ─────────────────────────────────────────────

    fn program(&mut self) -> Result<Program, EvalError> {
        let mut statements = Vec::new();
        loop {
            while *self.cur() == Tok::Semi {
                self.advance();
            }
            if *self.cur() == Tok::Eof {
                break;
            }
            statements.push(self.statement()?);
            match self.cur() {
                Tok::Semi => self.advance(),
                Tok::Eof => break,
                _ => return Err(self.err("';' or end of formula")),
            }
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, EvalError> {
        let is_assign =
            matches!(self.cur(), Tok::Ident(w) if w == "assign") && *self.peek(1) == Tok::LParen;
        if !is_assign {
            return Ok(Stmt::Expr(self.expr()?));
        }
        self.advance();
        self.advance();
        let name = match self.cur() {
            Tok::Str(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Err(self.err("variable name string")),
        };
        self.advance();
        self.expect(Tok::Comma, "','")?;
        let expr = self.expr()?;
        self.expect(Tok::RParen, "')'")?;
        Ok(Stmt::Assign { name, expr })
    }

    // ── Expressions ────────────────────────────────────────────

    fn expr(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(0)
    }

    /// Left-associative binary operators, loosest level first.
    fn binary_level(&mut self, level: usize) -> Result<Expr, EvalError> {
        const LEVELS: &[&[(Tok, BinaryOp)]] = &[
            &[(Tok::OrOr, BinaryOp::Or)],
            &[(Tok::AndAnd, BinaryOp::And)],
            &[(Tok::EqEq, BinaryOp::Eq), (Tok::NotEq, BinaryOp::Ne)],
            &[
                (Tok::Lt, BinaryOp::Lt),
                (Tok::Le, BinaryOp::Le),
                (Tok::Gt, BinaryOp::Gt),
                (Tok::Ge, BinaryOp::Ge),
            ],
            &[(Tok::Plus, BinaryOp::Add), (Tok::Minus, BinaryOp::Sub)],
            &[(Tok::Star, BinaryOp::Mul), (Tok::Slash, BinaryOp::Div)],
        ];
        let Some(ops) = LEVELS.get(level) else {
            return self.unary();
        };
        let mut lhs = self.binary_level(level + 1)?;
        while let Some(op) = ops
            .iter()
            .find(|(tok, _)| tok == self.cur())
            .map(|(_, op)| *op)
        {
            self.advance();
            let rhs = self.binary_level(level + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.cur() {
            Tok::Minus => Some(UnaryOp::Neg),
            Tok::Bang => Some(UnaryOp::Not),
            Tok::Plus => {
                self.advance();
                return self.unary();
            }
            _ => None,
        };
        match op {
            Some(op) => {
                self.advance();
                let expr = self.unary()?;
                Ok(Expr::Unary {
                    op,
                    expr: Box::new(expr),
                })
            }
            None => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.cur().clone() {
            Tok::Num(n) => {
                self.advance();
                Ok(Expr::Num(n))
            }
            Tok::LParen => {
                self.advance();
                let e = self.expr()?;
                self.expect(Tok::RParen, "')'")?;
                Ok(e)
            }
            Tok::Ident(name) => {
                let at = self.offset();
                self.advance();
                if *self.cur() != Tok::LParen {
                    return Ok(Expr::Var(name));
                }
                if name == "assign" {
                    return Err(EvalError::syntax(
                        "assign() is only allowed as a statement",
                        at,
                    ));
                }
                self.advance();
                let mut args = Vec::new();
                if *self.cur() != Tok::RParen {
                    loop {
                        args.push(self.expr()?);
                        if *self.cur() == Tok::Comma {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(Tok::RParen, "',' or ')'")?;
                Ok(Expr::Call { name, args })
            }
            _ => Err(self.err("value")),
        }
    }
}
