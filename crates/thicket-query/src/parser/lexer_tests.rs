use super::cst::SyntaxKind;
use super::lexer::{lex, token_text, unescape};

fn dump(source: &str) -> String {
    lex(source)
        .iter()
        .filter(|t| t.kind != SyntaxKind::Whitespace)
        .map(|t| format!("{:?} {:?}", t.kind, token_text(source, t)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn punctuation_and_names() {
    insta::assert_snapshot!(dump("(expression left: (_) @lhs)"), @r#"
    ParenOpen "("
    Id "expression"
    Id "left"
    Colon ":"
    ParenOpen "("
    Underscore "_"
    ParenClose ")"
    At "@"
    Id "lhs"
    ParenClose ")"
    "#);
}

#[test]
fn string_literal_splits_into_quotes_and_content() {
    insta::assert_snapshot!(dump(r#""+" """#), @r#"
    DoubleQuote "\""
    StrVal "+"
    DoubleQuote "\""
    DoubleQuote "\""
    DoubleQuote "\""
    "#);
}

#[test]
fn keywords_predicates_and_quantifiers() {
    insta::assert_snapshot!(dump("(ERROR) (MISSING) (#eq? @a b) (x)* (y)+ (z)? . !f"), @r##"
    ParenOpen "("
    KwError "ERROR"
    ParenClose ")"
    ParenOpen "("
    KwMissing "MISSING"
    ParenClose ")"
    ParenOpen "("
    PredicateName "#eq?"
    At "@"
    Id "a"
    Id "b"
    ParenClose ")"
    ParenOpen "("
    Id "x"
    ParenClose ")"
    Star "*"
    ParenOpen "("
    Id "y"
    ParenClose ")"
    Plus "+"
    ParenOpen "("
    Id "z"
    ParenClose ")"
    Question "?"
    Dot "."
    Negation "!"
    Id "f"
    "##);
}

#[test]
fn comments_are_trivia() {
    let tokens = lex("; leading\n(a) ; trailing");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [
            SyntaxKind::Comment,
            SyntaxKind::Whitespace,
            SyntaxKind::ParenOpen,
            SyntaxKind::Id,
            SyntaxKind::ParenClose,
            SyntaxKind::Whitespace,
            SyntaxKind::Comment,
        ]
    );
    assert!(kinds[0].is_trivia());
}

#[test]
fn unknown_characters_coalesce_into_garbage() {
    insta::assert_snapshot!(dump("(a) %%$ (b)"), @r#"
    ParenOpen "("
    Id "a"
    ParenClose ")"
    Garbage "%%$"
    ParenOpen "("
    Id "b"
    ParenClose ")"
    "#);
}

#[test]
fn unterminated_string_is_garbage() {
    let tokens = lex("\"abc");
    assert_eq!(tokens[0].kind, SyntaxKind::Garbage);
    assert!(token_text("\"abc", &tokens[0]).starts_with('"'));
}

#[test]
fn capture_names_keep_dots_and_hyphens() {
    insta::assert_snapshot!(dump("@function.name @not-eq"), @r#"
    At "@"
    Id "function.name"
    At "@"
    Id "not-eq"
    "#);
}

#[test]
fn unescape_sequences() {
    assert_eq!(unescape(r"a\nb"), "a\nb");
    assert_eq!(unescape(r"\t\r\0"), "\t\r\0");
    assert_eq!(unescape(r#"\"q\""#), "\"q\"");
    assert_eq!(unescape(r"\\"), "\\");
    assert_eq!(unescape(r"trailing\"), "trailing\\");
}
