use indoc::indoc;

use crate::{CaptureQuantifier, DiagnosticKind, Query, QueryBuilder, QueryErrorKind};

const HIGHLIGHTS: &str = indoc! {r#"
    ; operands
    (expression left: (number) @number.left)
    (expression right: (_) @operand) @binary
    [(number) (parenthesized_expression)] @atom

    ((number) @literal
      (#set! kind "int"))
"#};

fn highlights() -> Query {
    Query::new(&thicket_langs::arithmetic(), HIGHLIGHTS).unwrap()
}

#[test]
fn capture_table() {
    let query = highlights();

    let names: Vec<_> = query.capture_names().collect();
    assert_eq!(names, ["number.left", "operand", "binary", "atom", "literal"]);
    assert_eq!(query.capture_names().len(), 5);
    assert_eq!(query.capture_index_for_name("binary"), Some(2));
    assert_eq!(query.capture_index_for_name("missing"), None);
    assert_eq!(query.capture_name(4), Some("literal"));
    assert_eq!(query.capture_name(5), None);
}

#[test]
fn pattern_table() {
    let query = highlights();
    assert_eq!(query.pattern_count(), 4);

    let starts: Vec<_> = (0..query.pattern_count())
        .map(|i| &HIGHLIGHTS[query.start_byte_for_pattern(i)..query.end_byte_for_pattern(i)])
        .collect();
    insta::assert_debug_snapshot!(starts, @r#"
    [
        "(expression left: (number) @number.left)",
        "(expression right: (_) @operand) @binary",
        "[(number) (parenthesized_expression)] @atom",
        "((number) @literal\n  (#set! kind \"int\"))",
    ]
    "#);
}

#[test]
fn rooted_and_non_local_patterns() {
    let query = Query::new(
        &thicket_langs::arithmetic(),
        r#"(number) [(number) (expression)] ((number) "+") (number)+"#,
    )
    .unwrap();

    let rooted: Vec<_> = (0..4).map(|i| query.is_pattern_rooted(i)).collect();
    assert_eq!(rooted, [true, true, false, false]);
    let non_local: Vec<_> = (0..4).map(|i| query.is_pattern_non_local(i)).collect();
    assert_eq!(non_local, [false, false, true, true]);
}

#[test]
fn per_pattern_quantifiers() {
    let query = highlights();
    assert_eq!(
        query.capture_quantifiers(1),
        [
            CaptureQuantifier::Zero,
            CaptureQuantifier::One,
            CaptureQuantifier::One,
            CaptureQuantifier::Zero,
            CaptureQuantifier::Zero,
        ]
    );
}

#[test]
fn string_table() {
    let query = highlights();
    let strings: Vec<_> = (0..query.string_count() as u32)
        .map(|id| query.string_value(id).unwrap())
        .collect();
    assert_eq!(strings, ["set!", "kind", "int"]);
    assert_eq!(query.string_value(3), None);
    assert!(query.predicates_for_pattern(0).is_empty());
    assert_eq!(query.predicates_for_pattern(3).len(), 4);
}

#[test]
fn patterns_without_predicates_have_no_properties() {
    let query = highlights();
    assert!(query.property_settings(0).is_empty());
    assert!(query.property_predicates(0).is_empty());
    assert!(query.general_predicates(0).is_empty());
    assert_eq!(query.property_settings(3).len(), 1);
}

#[test]
#[should_panic]
fn pattern_index_out_of_range_panics() {
    highlights().start_byte_for_pattern(10);
}

#[test]
fn empty_query() {
    let query = Query::new(&thicket_langs::arithmetic(), "; nothing here\n").unwrap();
    assert_eq!(query.pattern_count(), 0);
    assert_eq!(query.capture_names().len(), 0);
}

#[test]
fn builder_recursion_fuel() {
    let language = thicket_langs::arithmetic();
    let source = "(expression (expression (expression (number))))";

    assert!(QueryBuilder::new(&language).build(source).is_ok());

    let err = QueryBuilder::new(&language)
        .recursion_fuel(2)
        .build(source)
        .unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::Syntax);
    let kinds: Vec<_> = err.diagnostics().iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, [DiagnosticKind::NestingTooDeep]);
}

#[test]
fn query_error_is_std_error() {
    let err = Query::new(&thicket_langs::arithmetic(), "(foo)").unwrap_err();
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert_eq!(
        boxed.to_string(),
        "invalid node type at 0:1: `foo` is not a valid node type"
    );
}

#[test]
fn clones_are_independent() {
    let query = highlights();
    let mut clone = query.clone();
    clone.disable_pattern(0);
    clone.disable_capture("atom");

    assert!(!query.is_pattern_disabled(0));
    assert!(clone.is_pattern_disabled(0));
    assert!(clone.is_capture_disabled(3));
    assert!(!query.is_capture_disabled(3));
}
