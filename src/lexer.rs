//! Hand-written scanner turning source text into a flat token stream.
//!
//! Recognition follows a fixed priority: whitespace and `#` line comments
//! are skipped first, then identifiers/keywords, then numbers, then
//! strings, then one- and two-character operators and punctuation.
//! Anything else becomes a [`TokenKind::Error`] token rather than a hard
//! failure, so the parser can decide how to recover.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use crate::diagnostics::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // literals
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // keywords
    Let,
    Fn,
    If,
    Else,
    While,
    Return,
    True,
    False,
    KwInt,
    KwFloat,
    KwString,
    KwBool,
    KwVoid,

    // operators
    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    BangEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,

    // punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Semicolon,

    Eof,
    /// A lexical failure; carries the same message that would otherwise
    /// have been attached to a [`crate::diagnostics::LexError`].
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("let", TokenKind::Let),
        ("fn", TokenKind::Fn),
        ("if", TokenKind::If),
        ("else", TokenKind::Else),
        ("while", TokenKind::While),
        ("return", TokenKind::Return),
        ("true", TokenKind::True),
        ("false", TokenKind::False),
        ("int", TokenKind::KwInt),
        ("float", TokenKind::KwFloat),
        ("string", TokenKind::KwString),
        ("bool", TokenKind::KwBool),
        ("void", TokenKind::KwVoid),
    ])
});

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Scans the whole source up front, always ending with one `Eof`
    /// token (or, on allocation-free paths, exactly one `Error` token
    /// where the original would have failed).
    pub fn tokenize(source: &'a str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(c) = c {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\r') | Some('\t') | Some('\n') => {
                    self.advance();
                }
                Some('#') => {
                    while !matches!(self.peek(), Some('\n') | None) {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn identifier(&mut self, first: char, start: Span) -> Token {
        let mut lexeme = String::from(first);
        while let Some(c) = self.peek() {
            if is_alphanumeric(c) {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = KEYWORDS
            .get(lexeme.as_str())
            .cloned()
            .unwrap_or(TokenKind::Ident(lexeme));
        Token { kind, span: start }
    }

    fn number(&mut self, first: char, start: Span) -> Token {
        let mut lexeme = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.peek() == Some('.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if matches!(lookahead.next(), Some(c) if c.is_ascii_digit()) {
                is_float = true;
                lexeme.push('.');
                self.advance();
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        lexeme.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        let kind = if is_float {
            TokenKind::Float(lexeme.parse().unwrap_or(0.0))
        } else {
            TokenKind::Int(lexeme.parse().unwrap_or(0))
        };
        Token { kind, span: start }
    }

    fn string(&mut self, start: Span) -> Token {
        let mut value = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    return Token {
                        kind: TokenKind::Str(value),
                        span: start,
                    };
                }
                Some('\n') | None => {
                    return Token {
                        kind: TokenKind::Error("unterminated string".into()),
                        span: start,
                    };
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let start = Span::new(self.line, self.column);

        let c = match self.advance() {
            Some(c) => c,
            None => {
                return Token {
                    kind: TokenKind::Eof,
                    span: start,
                }
            }
        };

        if is_alpha(c) {
            return self.identifier(c, start);
        }
        if c.is_ascii_digit() {
            return self.number(c, start);
        }
        if c == '"' {
            return self.string(start);
        }

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => {
                if self.matches('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.matches('=') {
                    TokenKind::BangEq
                } else {
                    TokenKind::Error("unexpected character '!'".into())
                }
            }
            '>' => {
                if self.matches('=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            '<' => {
                if self.matches('=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            other => TokenKind::Error(format!("unexpected character '{other}'")),
        };

        Token { kind, span: start }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        assert_eq!(
            kinds("let x fn"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("x".into()),
                TokenKind::Fn,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn scans_int_and_float_literals() {
        assert_eq!(
            kinds("42 3.14 7."),
            vec![
                TokenKind::Int(42),
                TokenKind::Float(3.14),
                TokenKind::Int(7),
                TokenKind::Error("unexpected character '.'".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn scans_string_literal() {
        assert_eq!(
            kinds(r#""hello""#),
            vec![TokenKind::Str("hello".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_an_error_token() {
        assert_eq!(
            kinds("\"oops"),
            vec![
                TokenKind::Error("unterminated string".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn comments_are_skipped_to_end_of_line() {
        assert_eq!(
            kinds("let # this is a comment\nx"),
            vec![TokenKind::Let, TokenKind::Ident("x".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn two_char_operators_are_preferred_over_one_char() {
        assert_eq!(
            kinds("== != <= >= = < >"),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::Eq,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lone_bang_is_an_error() {
        assert_eq!(
            kinds("!"),
            vec![
                TokenKind::Error("unexpected character '!'".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn percent_is_never_produced() {
        assert_eq!(
            kinds("%"),
            vec![
                TokenKind::Error("unexpected character '%'".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = Lexer::tokenize("let\nx");
        assert_eq!(tokens[0].span, Span::new(1, 1));
        assert_eq!(tokens[1].span, Span::new(2, 1));
    }
}
