use super::*;
use crate::{LanguageBuilder, SymbolType};

fn sample() -> LanguageBuilder {
    let mut b = LanguageBuilder::new("sample").version(1, 2, 3);
    let word = b.token("word", SymbolType::Regular, "[a-z]+");
    let dot = b.literal(".");
    let null = b.keyword("null", "null");
    b.skip(" +");
    let sentence = b.rule("sentence", SymbolType::Regular);
    let value = b.rule("_value", SymbolType::Supertype);
    let helper = b.rule("_helper", SymbolType::Auxiliary);
    b.supertype(value, &[word, null]);
    let subject = b.field("subject");
    b.production(sentence, &[word, dot], &[(0, subject)]);
    b.production(value, &[word], &[]);
    b.production(helper, &[null], &[]);
    b.state(1).shift(word, 2).goto(sentence, 4);
    b.state(2).shift(dot, 3);
    b.state(3).reduce(&[SYMBOL_END], 0);
    b.state(4).accept();
    b
}

#[test]
fn builds_symbol_table() {
    let language = sample().build().unwrap();

    assert_eq!(language.name(), "sample");
    assert_eq!(language.symbol_count(), 7);
    assert_eq!(language.symbol_name(0), Some("end"));
    assert_eq!(language.symbol_name(SYMBOL_ERROR), Some("ERROR"));
    assert_eq!(language.symbol_name(42), None);
    assert_eq!(language.semantic_version().unwrap().to_string(), "1.2.3");
}

#[test]
fn symbol_lookup_by_name_and_kind() {
    let language = sample().build().unwrap();

    assert_eq!(language.symbol_for_name("word", true), Some(1));
    assert_eq!(language.symbol_for_name("word", false), None);
    assert_eq!(language.symbol_for_name(".", false), Some(2));
    assert_eq!(language.symbol_for_name("ERROR", true), Some(SYMBOL_ERROR));
    // supertypes are addressable, plain hidden rules are not
    assert_eq!(language.symbol_for_name("_value", true), Some(5));
    assert_eq!(language.symbol_for_name("_helper", false), None);
}

#[test]
fn symbol_types() {
    let language = sample().build().unwrap();

    assert_eq!(language.symbol_type(1), SymbolType::Regular);
    assert_eq!(language.symbol_type(2), SymbolType::Anonymous);
    assert_eq!(language.symbol_type(5), SymbolType::Supertype);
    assert_eq!(language.symbol_type(6), SymbolType::Auxiliary);
    assert!(language.is_terminal(1));
    assert!(!language.is_terminal(4));
    assert_eq!(language.subtypes(5), &[1, 3]);
    assert_eq!(language.supertypes().collect::<Vec<_>>(), [5]);
}

#[test]
fn fields() {
    let language = sample().build().unwrap();
    let subject = language.field_id_for_name("subject").unwrap();

    assert_eq!(subject.get(), 1);
    assert_eq!(language.field_name_for_id(subject), Some("subject"));
    assert_eq!(language.field_id_for_name("object"), None);
    assert_eq!(language.field_count(), 1);
    assert_eq!(language.production(0).unwrap().field_for_child(0), Some(subject));
}

#[test]
fn actions_and_gotos() {
    let language = sample().build().unwrap();

    assert_eq!(language.action(1, 1), Some(ParseAction::Shift { state: 2 }));
    assert_eq!(language.action(1, 2), None);
    assert_eq!(
        language.action(3, SYMBOL_END),
        Some(ParseAction::Reduce { production: 0 })
    );
    assert_eq!(language.action(4, SYMBOL_END), Some(ParseAction::Accept));
    assert_eq!(language.goto(1, 4), Some(4));
    assert_eq!(language.next_state(1, 1), 2);
    assert_eq!(language.next_state(2, 1), ERROR_STATE);
    assert_eq!(language.next_state(1, 4), 4);
}

#[test]
fn tokens_compile_into_one_automaton() {
    let language = sample().build().unwrap();
    let tokens = language.tokens();

    let mut state = tokens.start();
    for &byte in b"null" {
        state = tokens.next(state, byte);
    }
    // `word` (rule 0) and `null` (rule 2) both accept "null"
    assert_eq!(tokens.accepting_rules(state).collect::<Vec<_>>(), [0, 2]);

    let dead = tokens.next(state, b'!');
    assert!(tokens.is_dead(dead));
}

#[test]
fn rejects_dangling_state() {
    let mut b = sample();
    b.state(2).shift(1, 99);

    let err = b.build().unwrap_err();
    insta::assert_snapshot!(err, @"invalid language table: state 2 refers to unknown state 99");
}

#[test]
fn rejects_invalid_token_pattern() {
    let mut b = LanguageBuilder::new("broken");
    b.token("bad", SymbolType::Regular, "(unclosed");

    let err = b.build().unwrap_err();
    assert!(matches!(
        err,
        LanguageError::InvalidTokenPattern { ref pattern, .. } if pattern == "(unclosed"
    ));
}
