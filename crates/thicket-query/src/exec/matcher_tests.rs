use thicket_core::Language;
use thicket_syntax::{Parser, Tree};

use super::matcher::find_matches;
use crate::DEFAULT_RECURSION_FUEL;
use crate::compile::compile;

fn parse(language: &Language, text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(language).unwrap();
    parser.parse(text, None).unwrap()
}

/// Every match of the first pattern at the root, one line per match.
fn run(language: &Language, query: &str, text: &str) -> Vec<String> {
    let compiled = compile(language, query, DEFAULT_RECURSION_FUEL).unwrap();
    let tree = parse(language, text);

    find_matches(&compiled.patterns[0].steps, &[(None, tree.root_node())], 0)
        .iter()
        .map(|state| {
            state
                .captures
                .iter()
                .map(|&(id, node)| {
                    let name = compiled.captures.try_resolve(id).unwrap();
                    format!("@{name}={}", &text[node.byte_range()])
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn list(query: &str, text: &str) -> Vec<String> {
    run(&thicket_langs::list(), query, text)
}

fn arithmetic(query: &str, text: &str) -> Vec<String> {
    run(&thicket_langs::arithmetic(), query, text)
}

const ITEMS: &str = "[1, a, 2, null]";

#[test]
fn children_match_anywhere() {
    assert_eq!(
        list("(document (list (number) @n))", ITEMS),
        ["@n=1", "@n=2"]
    );
}

#[test]
fn leading_anchor_takes_first_named_child() {
    assert_eq!(list("(document (list . (_) @first))", ITEMS), ["@first=1"]);
}

#[test]
fn trailing_anchor_takes_last_named_child() {
    assert_eq!(list("(document (list (_) @last .))", ITEMS), ["@last=null"]);
}

#[test]
fn trailing_anchor_skips_anonymous_nodes() {
    assert_eq!(
        list("(document (list _ @any .))", ITEMS),
        ["@any=null", "@any=]"]
    );
}

#[test]
fn inner_anchor_needs_adjacent_named_siblings() {
    assert_eq!(
        list("(document (list (number) @a . (_) @b))", ITEMS),
        ["@a=1 @b=a", "@a=2 @b=null"]
    );
}

#[test]
fn alternation_tries_branches_in_order() {
    assert_eq!(
        list("(document (list [(number) (null)] @v))", ITEMS),
        ["@v=1", "@v=2", "@v=null"]
    );
}

#[test]
fn identical_solutions_are_reported_once() {
    assert_eq!(
        list("(document (list [(number) (number)] @n))", ITEMS),
        ["@n=1", "@n=2"]
    );
}

#[test]
fn star_is_greedy() {
    assert_eq!(
        list("(document (list (number)* @ns (null) @z))", ITEMS),
        ["@ns=1 @ns=2 @z=null"]
    );
}

#[test]
fn plus_needs_one() {
    assert_eq!(
        list("(document (list (identifier)+ @ids (number) @after))", ITEMS),
        ["@ids=a @after=2"]
    );
    assert!(list("(document (list (identifier)+ @ids))", "[1, 2]").is_empty());
}

#[test]
fn optional_present_and_absent() {
    assert_eq!(
        list("(document (list (identifier)? @maybe (null) @z))", ITEMS),
        ["@maybe=a @z=null"]
    );
    assert_eq!(
        list("(document (list (identifier)? @maybe (null) @z))", "[1, null]"),
        ["@z=null"]
    );
}

#[test]
fn grouped_sequence_repeats() {
    assert_eq!(
        list(r#"(document (list ((number) @n "," )+))"#, "[1, 2, 3]"),
        ["@n=1 @n=2"]
    );
}

#[test]
fn fields_must_match() {
    assert_eq!(
        arithmetic("(expression left: (number) @l right: (expression))", "1 + 2 * 3"),
        ["@l=1"]
    );
    assert!(arithmetic("(expression right: (number) @r)", "1 + 2 * 3").is_empty());
}

#[test]
fn anonymous_field_values() {
    assert_eq!(
        arithmetic(r#"(expression operator: "+" @op)"#, "1 + 2"),
        ["@op=+"]
    );
    assert!(arithmetic(r#"(expression operator: "-")"#, "1 + 2").is_empty());
}

#[test]
fn negated_fields() {
    assert_eq!(list("(document (list !element) @l)", "[]"), ["@l=[]"]);
    assert!(list("(document (list !element) @l)", "[1]").is_empty());
}

#[test]
fn supertype_matches_any_subtype() {
    assert_eq!(
        arithmetic("(expression left: (_operand) @l right: (_operand) @r)", "1 + 2 * 3"),
        ["@l=1 @r=2 * 3"]
    );
}

#[test]
fn missing_and_error_nodes() {
    assert_eq!(
        arithmetic("(expression right: (MISSING number) @m)", "1 +"),
        ["@m="]
    );
    assert!(arithmetic(r#"(expression (MISSING "+"))"#, "1 +").is_empty());
    assert_eq!(arithmetic("(expression (ERROR) @e)", "1 + @"), ["@e=@"]);
}

#[test]
fn pattern_must_start_at_the_node() {
    let compiled = compile(
        &thicket_langs::arithmetic(),
        "(number)",
        DEFAULT_RECURSION_FUEL,
    )
    .unwrap();
    let tree = parse(&thicket_langs::arithmetic(), "1 + 2");
    let siblings: Vec<_> = tree.root_node().children_with_fields().collect();

    assert_eq!(find_matches(&compiled.patterns[0].steps, &siblings, 0).len(), 1);
    assert!(find_matches(&compiled.patterns[0].steps, &siblings, 1).is_empty());
}
