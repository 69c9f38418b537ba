use thicket_core::language::{SYMBOL_END, SYMBOL_ERROR};
use thicket_core::{Language, Range};

use crate::input::{InputAdapter, InputEncoding};
use crate::lexer::{Lexer, Token};

/// Lexes `text` to the end in a fixed parse state.
fn lex_all(language: &Language, text: &str, state: u16) -> Vec<Token> {
    let mut input = text;
    let ranges = [Range::WHOLE];
    let mut adapter = InputAdapter::new(&mut input, InputEncoding::Utf8, &ranges);
    let lexer = Lexer::new(language);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex(&mut adapter, state);
        tokens.push(token);
        if token.symbol == SYMBOL_END {
            return tokens;
        }
    }
}

fn names(language: &Language, tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| language.symbol_name(t.symbol).unwrap().to_owned())
        .collect()
}

#[test]
fn longest_match_wins() {
    let language = thicket_langs::list();
    let tokens = lex_all(&language, "nullable", 1);

    assert_eq!(names(&language, &tokens), ["identifier", "end"]);
    assert!(!tokens[0].lex_ambiguous);
}

#[test]
fn keyword_wins_tie_and_is_ambiguous() {
    let language = thicket_langs::list();
    let tokens = lex_all(&language, "null", 1);

    assert_eq!(names(&language, &tokens), ["null", "end"]);
    assert!(tokens[0].lex_ambiguous);
}

#[test]
fn skipped_text_becomes_padding() {
    let language = thicket_langs::list();
    let tokens = lex_all(&language, "  [ 1 ]\n", 1);

    assert_eq!(names(&language, &tokens), ["[", "number", "]", "end"]);
    let paddings: Vec<_> = tokens.iter().map(|t| t.padding.bytes).collect();
    assert_eq!(paddings, [2, 1, 1, 1]);
    assert_eq!(tokens[3].padding.extent.row, 1);
}

#[test]
fn lookahead_counts_examined_bytes() {
    let language = thicket_langs::arithmetic();
    let tokens = lex_all(&language, "12.x", 1);

    // `12.` is a prefix of a decimal, so the lexer read the `x` before
    // settling on `12`.
    assert_eq!(tokens[0].size.bytes, 2);
    assert_eq!(tokens[0].lookahead_bytes, 2);
}

#[test]
fn unrecognized_characters_form_one_error_token() {
    let language = thicket_langs::arithmetic();
    let tokens = lex_all(&language, "1 $$ 2", 1);

    let symbols: Vec<_> = tokens.iter().map(|t| t.symbol).collect();
    assert_eq!(symbols[1], SYMBOL_ERROR);
    assert_eq!(tokens[1].padding.bytes, 1);
    assert_eq!(tokens[1].size.bytes, 2);
    assert_eq!(names(&language, &tokens), ["number", "ERROR", "number", "end"]);
}

#[test]
fn comments_are_tokens() {
    let language = thicket_langs::arithmetic();
    let tokens = lex_all(&language, "# hi\n1", 1);

    assert_eq!(names(&language, &tokens), ["comment", "number", "end"]);
    assert_eq!(tokens[0].size.bytes, 4);
}
