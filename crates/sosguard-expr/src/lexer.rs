//! Tokenizer for expression text, generated with logos.
//!
//! Words (`and`, `lt`, `true`, function names, ...) are lexed as a single
//! [`TokenKind::Word`] and classified by the grammar, which keeps keyword
//! matching case-insensitive in one place.

use crate::error::ExprError;
use logos::Logos;
use std::ops::Range;

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum TokenKind {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,
    #[regex(r"[0-9]+\.[0-9]+")]
    Float,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"'[^']*'")]
    Str,
    #[regex(r"@[A-Za-z0-9._:/-]+")]
    Variable,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("**")]
    StarStar,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<>")]
    LtGt,
}

/// One token with its source text and byte span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Range<usize>,
}

/// Split `source` into lexemes, failing on the first unrecognised character.
pub fn tokenize(source: &str) -> Result<Vec<Lexeme<'_>>, ExprError> {
    let mut lexer = TokenKind::lexer(source);
    let mut out = Vec::new();
    while let Some(next) = lexer.next() {
        let span = lexer.span();
        match next {
            // A closed `/* */` is skipped as a whole, so `/*` here never ends.
            Ok(TokenKind::Slash) if source[span.end..].starts_with('*') => {
                return Err(ExprError::Parse {
                    offset: span.start,
                    fragment: fragment_at(source, span.start),
                    message: "unterminated comment".to_string(),
                });
            }
            Ok(kind) => out.push(Lexeme {
                kind,
                text: lexer.slice(),
                span,
            }),
            Err(()) => {
                let message = if source[span.start..].starts_with('\'') {
                    "unterminated string literal"
                } else {
                    "unexpected character"
                };
                return Err(ExprError::Parse {
                    offset: span.start,
                    fragment: fragment_at(source, span.start),
                    message: message.to_string(),
                });
            }
        }
    }
    Ok(out)
}

/// A short excerpt of `source` starting at `offset`, for error messages.
pub(crate) fn fragment_at(source: &str, offset: usize) -> String {
    let rest = source.get(offset..).unwrap_or_default();
    if rest.is_empty() {
        return "<end of input>".to_string();
    }
    rest.chars().take(24).collect()
}
