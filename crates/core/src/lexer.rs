use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::LexError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers (keywords are split off below)
    Ident(String),
    /// `new`
    New,
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Integer literal
    Int(i64),
    /// Decimal literal, kept as normalized text to preserve exact representation
    Float(String),
    /// `true` / `false`; `None` is the `null` sentinel
    Bool(Option<bool>),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Dot,
    // End of input
    Eof,
}

impl Token {
    /// Short human-readable description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(w) => format!("identifier '{}'", w),
            Token::New => "'new'".to_string(),
            Token::Str(s) => format!("string {:?}", s),
            Token::Int(n) => format!("number {}", n),
            Token::Float(s) => format!("number {}", s),
            Token::Bool(Some(b)) => format!("'{}'", b),
            Token::Bool(None) => "'null'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    /// Byte offset of the first character of the token.
    pub offset: usize,
}

/// Tokenize `.tdt` source text.
///
/// Whitespace and comments are dropped. An unterminated string absorbs the
/// rest of the input; that case is recorded in `diags` rather than failing.
pub fn lex(src: &str, diags: &mut Diagnostics) -> Result<Vec<Spanned>, LexError> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let len = chars.len();
    let at = |i: usize| chars.get(i).map(|&(_, c)| c);
    let mut pos = 0usize;

    while pos < len {
        let (offset, c) = chars[pos];

        // Line comment
        if c == '/' && at(pos + 1) == Some('/') {
            while pos < len && chars[pos].1 != '\n' {
                pos += 1;
            }
            continue;
        }

        // Block comment; an unclosed one runs to end of input
        if c == '/' && at(pos + 1) == Some('*') {
            pos += 2;
            while pos < len && !(chars[pos].1 == '*' && at(pos + 1) == Some('/')) {
                pos += 1;
            }
            pos = (pos + 2).min(len);
            continue;
        }

        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            pos += 1;
            continue;
        }

        // String literal
        if c == '"' {
            pos += 1;
            let mut s = String::new();
            let mut terminated = false;
            while pos < len {
                let sc = chars[pos].1;
                if sc == '"' {
                    pos += 1;
                    terminated = true;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    match at(pos) {
                        Some('"') => s.push('"'),
                        Some('\\') => s.push('\\'),
                        Some('n') => s.push('\n'),
                        Some('r') => s.push('\r'),
                        Some('t') => s.push('\t'),
                        Some(other) => {
                            s.push('\\');
                            s.push(other);
                        }
                        None => {
                            s.push('\\');
                            break;
                        }
                    }
                    pos += 1;
                    continue;
                }
                s.push(sc);
                pos += 1;
            }
            if !terminated {
                diags.warn(
                    DiagnosticKind::Lexer,
                    format!(
                        "unterminated string starting at offset {} absorbed to end of input",
                        offset
                    ),
                );
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                offset,
            });
            continue;
        }

        // Number: optional '-', digits, optional '.' + digits; leading-dot allowed
        let starts_number = c.is_ascii_digit()
            || (c == '.' && at(pos + 1).is_some_and(|n| n.is_ascii_digit()))
            || (c == '-'
                && (at(pos + 1).is_some_and(|n| n.is_ascii_digit())
                    || (at(pos + 1) == Some('.')
                        && at(pos + 2).is_some_and(|n| n.is_ascii_digit()))));
        if starts_number {
            let mut text = String::new();
            if c == '-' {
                text.push('-');
                pos += 1;
            }
            while let Some(d) = at(pos).filter(|d| d.is_ascii_digit()) {
                text.push(d);
                pos += 1;
            }
            let is_float = at(pos) == Some('.') && at(pos + 1).is_some_and(|n| n.is_ascii_digit());
            if is_float {
                if text.is_empty() || text == "-" {
                    text.push('0');
                }
                text.push('.');
                pos += 1;
                while let Some(d) = at(pos).filter(|d| d.is_ascii_digit()) {
                    text.push(d);
                    pos += 1;
                }
                tokens.push(Spanned {
                    token: Token::Float(text),
                    offset,
                });
            } else {
                // Out-of-range integers degrade to decimal text rather than failing
                let token = match text.parse::<i64>() {
                    Ok(n) => Token::Int(n),
                    Err(_) => Token::Float(text),
                };
                tokens.push(Spanned { token, offset });
            }
            continue;
        }

        let punct = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '.' => Some(Token::Dot),
            _ => None,
        };
        if let Some(token) = punct {
            tokens.push(Spanned { token, offset });
            pos += 1;
            continue;
        }

        // Identifier / keyword
        if c.is_ascii_alphabetic() || c == '_' {
            let start = pos;
            while at(pos).is_some_and(|n| n.is_ascii_alphanumeric() || n == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().map(|&(_, ch)| ch).collect();
            let token = match word.as_str() {
                "new" => Token::New,
                "true" => Token::Bool(Some(true)),
                "false" => Token::Bool(Some(false)),
                "null" => Token::Bool(None),
                _ => Token::Ident(word),
            };
            tokens.push(Spanned { token, offset });
            continue;
        }

        return Err(LexError { offset, ch: c });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        offset: src.len(),
    });
    Ok(tokens)
}
