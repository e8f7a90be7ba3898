//! Formula tokenizer.

use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Num(f64),
    Ident(String),
    Str(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    Semi,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    Bang,
    AndAnd,
    OrOr,
    Eof,
}

impl Tok {
    pub fn describe(&self) -> String {
        match self {
            Tok::Num(n) => format!("number {}", n),
            Tok::Ident(s) => format!("identifier '{}'", s),
            Tok::Str(s) => format!("string {:?}", s),
            Tok::Eof => "end of formula".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Tok::Plus => "+",
            Tok::Minus => "-",
            Tok::Star => "*",
            Tok::Slash => "/",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::Comma => ",",
            Tok::Semi => ";",
            Tok::Lt => "<",
            Tok::Le => "<=",
            Tok::Gt => ">",
            Tok::Ge => ">=",
            Tok::EqEq => "==",
            Tok::NotEq => "!=",
            Tok::Bang => "!",
            Tok::AndAnd => "&&",
            Tok::OrOr => "||",
            _ => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub offset: usize,
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let at = |i: usize| chars.get(i).map(|&(_, c)| c);
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(&(offset, c)) = chars.get(pos) {
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && at(pos + 1).is_some_and(|d| d.is_ascii_digit())) {
            let start = pos;
            while at(pos).is_some_and(|d| d.is_ascii_digit() || d == '.') {
                pos += 1;
            }
            let text: String = chars[start..pos].iter().map(|&(_, ch)| ch).collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| EvalError::syntax(format!("malformed number '{}'", text), offset))?;
            tokens.push(Token {
                tok: Tok::Num(value),
                offset,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = pos;
            while at(pos).is_some_and(|d| d.is_ascii_alphanumeric() || d == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().map(|&(_, ch)| ch).collect();
            tokens.push(Token {
                tok: Tok::Ident(word),
                offset,
            });
            continue;
        }

        if c == '"' || c == '\'' {
            pos += 1;
            let start = pos;
            while at(pos).is_some_and(|d| d != c) {
                pos += 1;
            }
            if at(pos).is_none() {
                return Err(EvalError::syntax("unterminated string", offset));
            }
            let text: String = chars[start..pos].iter().map(|&(_, ch)| ch).collect();
            pos += 1;
            tokens.push(Token {
                tok: Tok::Str(text),
                offset,
            });
            continue;
        }

        let two = at(pos + 1);
        let (tok, width) = match (c, two) {
            ('<', Some('=')) => (Tok::Le, 2),
            ('>', Some('=')) => (Tok::Ge, 2),
            ('=', Some('=')) => (Tok::EqEq, 2),
            ('!', Some('=')) => (Tok::NotEq, 2),
            ('&', Some('&')) => (Tok::AndAnd, 2),
            ('|', Some('|')) => (Tok::OrOr, 2),
            ('<', _) => (Tok::Lt, 1),
            ('>', _) => (Tok::Gt, 1),
            ('!', _) => (Tok::Bang, 1),
            ('+', _) => (Tok::Plus, 1),
            ('-', _) => (Tok::Minus, 1),
            ('*', _) => (Tok::Star, 1),
            ('/', _) => (Tok::Slash, 1),
            ('(', _) => (Tok::LParen, 1),
            (')', _) => (Tok::RParen, 1),
            (',', _) => (Tok::Comma, 1),
            (';', _) => (Tok::Semi, 1),
            _ => {
                return Err(EvalError::syntax(
                    format!("unexpected character {:?}", c),
                    offset,
                ))
            }
        };
        tokens.push(Token { tok, offset });
        pos += width;
    }

    tokens.push(Token {
        tok: Tok::Eof,
        offset: src.len(),
    });
    Ok(tokens)
}
