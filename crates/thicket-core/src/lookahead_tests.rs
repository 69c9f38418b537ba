use crate::language::ERROR_STATE;
use crate::{Language, LanguageBuilder, LookaheadIterator, SymbolType};

/// `assignment: identifier "=" number`, with `#` comments as extras.
fn assignment_language() -> Language {
    let mut b = LanguageBuilder::new("assignment");
    let identifier = b.token("identifier", SymbolType::Regular, "[a-z]+");
    let eq = b.literal("=");
    let number = b.token("number", SymbolType::Regular, "[0-9]+");
    let comment = b.token("comment", SymbolType::Regular, "#[^\n]*");
    b.skip(r"[ \t\n]+");
    b.extra(comment);
    let assignment = b.rule("assignment", SymbolType::Regular);
    let p = b.production(assignment, &[identifier, eq, number], &[]);

    b.state(1).shift(identifier, 2).goto(assignment, 3);
    b.state(2).shift(eq, 4);
    b.state(3).accept();
    b.state(4).shift(number, 5);
    b.state(5).reduce(&[0], p);
    b.build().unwrap()
}

#[test]
fn lists_terminals_then_nonterminals() {
    let language = assignment_language();
    let iter = LookaheadIterator::new(&language, 1).unwrap();

    let names: Vec<_> = iter
        .map(|symbol| language.symbol_name(symbol).unwrap().to_owned())
        .collect();
    assert_eq!(names, ["identifier", "comment", "assignment"]);
}

#[test]
fn accepting_state_offers_end() {
    let language = assignment_language();
    let mut iter = LookaheadIterator::new(&language, 3).unwrap();

    let names: Vec<_> = iter.iter_names().collect();
    assert_eq!(names, ["end", "comment"]);
}

#[test]
fn error_state_is_empty() {
    let language = assignment_language();
    let mut iter = LookaheadIterator::new(&language, ERROR_STATE).unwrap();

    assert_eq!(iter.next(), None);
    assert_eq!(iter.current_symbol(), None);
}

#[test]
fn out_of_range_state() {
    let language = assignment_language();

    assert!(LookaheadIterator::new(&language, 99).is_none());
}

#[test]
fn reset_state_reuses_iterator() {
    let language = assignment_language();
    let mut iter = LookaheadIterator::new(&language, 2).unwrap();

    assert_eq!(iter.next(), language.symbol_for_name("=", false));
    assert_eq!(iter.current_symbol_name(), Some("="));

    assert!(iter.reset_state(4));
    assert_eq!(iter.state(), 4);
    let names: Vec<_> = iter.iter_names().collect();
    assert_eq!(names, ["number", "comment"]);

    assert!(!iter.reset_state(42));
}

#[test]
fn reset_switches_language() {
    let first = assignment_language();
    let second = assignment_language();
    let mut iter = LookaheadIterator::new(&first, 1).unwrap();

    assert!(iter.reset(&second, 5));
    assert!(iter.language().ptr_eq(&second));
    let names: Vec<_> = iter.iter_names().collect();
    assert_eq!(names, ["end", "comment"]);
}
