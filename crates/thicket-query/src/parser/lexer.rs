//! Lexer for the query language.
//!
//! Tokens carry spans only; text is sliced from the source when a tree node
//! is built. Consecutive unrecognized characters coalesce into one
//! `Garbage` token so malformed input does not flood the diagnostics.

use std::ops::Range;

use logos::Logos;
use rowan::TextRange;

use super::cst::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

fn text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes `source`, splitting string literals into quote, content and
/// quote tokens.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(SyntaxKind::Garbage, text_range(start..end)));
                }
                let span = lexer.span();
                if kind == SyntaxKind::StringLiteral {
                    split_string_literal(span, &mut tokens);
                } else {
                    tokens.push(Token::new(kind, text_range(span)));
                }
            }
            Some(Err(())) => {
                error_start.get_or_insert(lexer.span().start);
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(
                        SyntaxKind::Garbage,
                        text_range(start..source.len()),
                    ));
                }
                break;
            }
        }
    }

    tokens
}

fn split_string_literal(span: Range<usize>, tokens: &mut Vec<Token>) {
    let (start, end) = (span.start, span.end);
    tokens.push(Token::new(SyntaxKind::DoubleQuote, text_range(start..start + 1)));
    if end - start > 2 {
        tokens.push(Token::new(SyntaxKind::StrVal, text_range(start + 1..end - 1)));
    }
    tokens.push(Token::new(SyntaxKind::DoubleQuote, text_range(end - 1..end)));
}

#[inline]
pub fn token_text<'q>(source: &'q str, token: &Token) -> &'q str {
    &source[Range::<usize>::from(token.span)]
}

/// Decodes the escapes of a string literal body: `\n`, `\t`, `\r`, `\0`,
/// and `\` before any other character yields that character.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
