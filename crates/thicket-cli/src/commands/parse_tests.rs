use thicket_syntax::{Parser, Tree};

use super::parse::syntax_errors;

fn parse(text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    parser.parse(text, None).unwrap()
}

#[test]
fn clean_tree_has_no_errors() {
    assert!(syntax_errors(parse("1 + 2").root_node()).is_empty());
}

#[test]
fn missing_token_is_reported() {
    assert_eq!(syntax_errors(parse("1 +").root_node()), ["MISSING number at 0:3"]);
}

#[test]
fn error_node_is_reported() {
    let errors = syntax_errors(parse("1 + @").root_node());
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], "ERROR at 0:4-0:5");
    assert!(errors[1].starts_with("MISSING number"));
}
