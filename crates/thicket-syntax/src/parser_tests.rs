use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};

use indoc::indoc;
use thicket_core::{InputEdit, LanguageBuilder, LanguageError, Point, Range, SymbolType};

use crate::input::{InputEncoding, ReadFn};
use crate::{IncludedRangesError, LogType, ParseOptions, ParseState, Parser, Tree};

fn parse_arithmetic(text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    parser.parse(text, None).unwrap()
}

fn parse_list(text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::list()).unwrap();
    parser.parse(text, None).unwrap()
}

#[test]
fn parses_binary_expression() {
    let tree = parse_arithmetic("1+2");
    let root = tree.root_node();

    assert_eq!(root.kind(), "expression");
    assert_eq!(root.byte_range(), 0..3);
    assert_eq!(root.child_count(), 3);
    assert_eq!(root.named_child_count(), 2);
    assert_eq!(root.named_child(0).unwrap().byte_range(), 0..1);
    assert_eq!(root.named_child(1).unwrap().byte_range(), 2..3);

    let operator = root.child_by_field_name("operator").unwrap();
    assert_eq!(operator.kind(), "+");
    assert_eq!(operator.byte_range(), 1..2);
    assert!(!root.has_error());
}

#[test]
fn multiplication_binds_tighter() {
    let tree = parse_arithmetic("1 + 2 * 3");

    insta::assert_snapshot!(tree, @"(expression left: (number) right: (expression left: (number) right: (number)))");
}

#[test]
fn subtraction_associates_left() {
    let tree = parse_arithmetic("1 - 2 - 3");

    insta::assert_snapshot!(tree, @"(expression left: (expression left: (number) right: (number)) right: (number))");
}

#[test]
fn parentheses_group() {
    let tree = parse_arithmetic("(1 + 2) * 3");

    insta::assert_snapshot!(tree, @"(expression left: (parenthesized_expression (expression left: (number) right: (number))) right: (number))");
}

#[test]
fn comments_are_extras() {
    let tree = parse_arithmetic(indoc! {"
        # leading
        1 + # inner
        2
    "});

    insta::assert_snapshot!(tree, @"(expression (comment) left: (number) (comment) right: (number))");
    let comment = tree.root_node().child(0).unwrap();
    assert!(comment.is_extra());
    assert_eq!(comment.end_position(), Point::new(0, 9));
}

#[test]
fn parsing_is_deterministic() {
    let text = "(1 + 2) * 3 / 4 - 5";
    assert_eq!(parse_arithmetic(text).to_string(), parse_arithmetic(text).to_string());
}

#[test]
fn inserts_missing_operand() {
    let tree = parse_arithmetic("1 +");
    let root = tree.root_node();

    insta::assert_snapshot!(tree, @"(expression left: (number) right: (MISSING number))");
    let missing = root.child_by_field_name("right").unwrap();
    assert!(missing.is_missing());
    assert_eq!(missing.byte_range(), 3..3);
    assert!(root.has_error());
}

#[test]
fn inserts_missing_operator() {
    let tree = parse_arithmetic("1 2");

    insta::assert_snapshot!(tree, @r#"(expression left: (number) operator: (MISSING "+") right: (number))"#);
}

#[test]
fn unrecognized_characters_become_error() {
    let tree = parse_arithmetic("1 + @");

    insta::assert_snapshot!(tree, @"(expression left: (number) (ERROR) right: (MISSING number))");
    let error = tree.root_node().named_child(1).unwrap();
    assert!(error.is_error());
    assert_eq!(error.byte_range(), 4..5);
}

#[test]
fn unexpected_token_is_skipped() {
    let tree = parse_arithmetic("1 + 2)");

    insta::assert_snapshot!(tree, @"(expression left: (number) right: (number) (ERROR))");
    assert!(tree.root_node().has_error());
}

#[test]
fn incomplete_input_yields_error_root() {
    let tree = parse_arithmetic("1");

    insta::assert_snapshot!(tree, @"(ERROR (number))");
    assert!(tree.root_node().is_error());
}

#[test]
fn list_fields_pass_through_hidden_rules() {
    let tree = parse_list("[1, foo, null, [], [2]]");

    insta::assert_snapshot!(tree, @"(document (list element: (number) element: (identifier) element: (null) element: (list) element: (list element: (number))))");
}

#[test]
fn keyword_prefix_is_identifier() {
    let tree = parse_list("[nullable]");

    insta::assert_snapshot!(tree, @"(document (list element: (identifier)))");
}

#[test]
fn reparse_after_edit_reuses_untouched_nodes() {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    let mut tree = parser.parse("1+2", None).unwrap();
    let left_id = tree.root_node().named_child(0).unwrap().id();
    let right_id = tree.root_node().named_child(1).unwrap().id();

    tree.edit(&InputEdit {
        start_byte: 1,
        old_end_byte: 2,
        new_end_byte: 2,
        start_position: Point::new(0, 1),
        old_end_position: Point::new(0, 2),
        new_end_position: Point::new(0, 2),
    });
    let new_tree = parser.parse("1-2", Some(&tree)).unwrap();

    let root = new_tree.root_node();
    assert_eq!(root.child_by_field_name("operator").unwrap().kind(), "-");
    // The lexer looked at the `+` after `1`, but lexing `1` again gives the same token.
    assert_eq!(root.named_child(0).unwrap().id(), left_id);
    assert_eq!(root.named_child(1).unwrap().id(), right_id);
    assert!(!root.named_child(0).unwrap().has_changes());
    assert_eq!(new_tree.to_string(), parse_arithmetic("1-2").to_string());

    let ranges: Vec<Range> = tree.changed_ranges(&new_tree).collect();
    assert_eq!(ranges, [Range::new(1, 2, Point::new(0, 1), Point::new(0, 2))]);
}

#[test]
fn reparse_relexes_token_whose_lookahead_changed() {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::list()).unwrap();
    let mut tree = parser.parse("[null,x]", None).unwrap();
    let keyword_id = tree.root_node().named_child(0).unwrap().named_child(0).unwrap().id();

    // `,` -> `a`: the keyword now continues into an identifier.
    tree.edit(&InputEdit {
        start_byte: 5,
        old_end_byte: 6,
        new_end_byte: 6,
        start_position: Point::new(0, 5),
        old_end_position: Point::new(0, 6),
        new_end_position: Point::new(0, 6),
    });
    let new_tree = parser.parse("[nullax]", Some(&tree)).unwrap();

    insta::assert_snapshot!(new_tree, @"(document (list element: (identifier)))");
    let element = new_tree.root_node().named_child(0).unwrap().named_child(0).unwrap();
    assert_ne!(element.id(), keyword_id);
    assert_eq!(element.byte_range(), 1..7);
}

#[test]
fn reparse_matches_fresh_parse_after_insertion() {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    let mut tree = parser.parse("1 + 2", None).unwrap();

    // Append ` * 3`: the `+` expression must be rebuilt around the product.
    tree.edit(&InputEdit {
        start_byte: 5,
        old_end_byte: 5,
        new_end_byte: 9,
        start_position: Point::new(0, 5),
        old_end_position: Point::new(0, 5),
        new_end_position: Point::new(0, 9),
    });
    let new_tree = parser.parse("1 + 2 * 3", Some(&tree)).unwrap();

    assert_eq!(new_tree.to_string(), parse_arithmetic("1 + 2 * 3").to_string());
}

#[test]
fn reparse_without_edits_reuses_root_children() {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::list()).unwrap();
    let tree = parser.parse("[1, 2]", None).unwrap();
    let list_id = tree.root_node().named_child(0).unwrap().id();

    let new_tree = parser.parse("[1, 2]", Some(&tree)).unwrap();

    assert_eq!(new_tree.root_node().named_child(0).unwrap().id(), list_id);
    assert_eq!(tree.changed_ranges(&new_tree).len(), 0);
}

#[test]
fn utf16_matches_utf8_with_doubled_offsets() {
    let units: Vec<u16> = "1 + 23".encode_utf16().collect();
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    let tree = parser.parse_utf16_le(&units, None).unwrap();

    assert_eq!(tree.to_string(), parse_arithmetic("1 + 23").to_string());
    let right = tree.root_node().child_by_field_name("right").unwrap();
    assert_eq!(right.byte_range(), 8..12);
    assert_eq!(String::from_utf16_lossy(right.utf16_text(&units)), "23");
}

#[test]
fn one_byte_chunks_match_contiguous_input() {
    let text = "# ünïcode\n[1, [2]]";
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::list()).unwrap();
    let mut input = ReadFn(|offset: usize, _: Point| {
        text.as_bytes().get(offset..offset + 1).unwrap_or_default().to_vec()
    });
    let tree = parser
        .parse_with(&mut input, InputEncoding::Utf8, None, ParseOptions::new())
        .unwrap();

    assert_eq!(tree.to_string(), parse_list(text).to_string());
    assert_eq!(tree.root_node().child(0).unwrap().byte_range(), 0..11);
}

#[test]
fn progress_callback_sees_each_token() {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    let mut offsets = Vec::new();
    let mut record = |state: &ParseState| {
        offsets.push((state.current_byte_offset(), state.has_error()));
        ControlFlow::Continue(())
    };
    let mut input = "1+2".as_bytes();
    let tree = parser.parse_with(
        &mut input,
        InputEncoding::Utf8,
        None,
        ParseOptions::new().progress_callback(&mut record),
    );

    assert!(tree.is_some());
    assert_eq!(offsets, [(0, false), (1, false), (2, false), (3, false)]);
}

#[test]
fn cancelled_parse_resumes() {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    let mut calls = 0;
    let mut cancel_second = |_: &ParseState| {
        calls += 1;
        if calls == 2 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    };
    let mut input = "1+2".as_bytes();
    let cancelled = parser.parse_with(
        &mut input,
        InputEncoding::Utf8,
        None,
        ParseOptions::new().progress_callback(&mut cancel_second),
    );
    assert!(cancelled.is_none());

    let resumed = parser.parse("1+2", None).unwrap();
    assert_eq!(resumed.to_string(), parse_arithmetic("1+2").to_string());
}

#[test]
fn reset_discards_cancelled_parse() {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    let mut stop_late = |state: &ParseState| {
        if state.current_byte_offset() >= 2 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    };
    let mut input = "1+2".as_bytes();
    let options = ParseOptions::new().progress_callback(&mut stop_late);
    assert!(parser.parse_with(&mut input, InputEncoding::Utf8, None, options).is_none());

    parser.reset();
    let tree = parser.parse("3*4", None).unwrap();
    assert_eq!(tree.to_string(), parse_arithmetic("3*4").to_string());
}

#[test]
fn no_language_no_tree() {
    let mut parser = Parser::new();
    assert!(parser.parse("1", None).is_none());
    assert!(parser.language().is_none());
}

#[test]
fn rejects_incompatible_language() {
    let mut b = LanguageBuilder::new("ancient").abi_version(1);
    let word = b.token("word", SymbolType::Regular, "[a-z]+");
    let root = b.rule("root", SymbolType::Regular);
    let production = b.production(root, &[word], &[]);
    b.state(1).shift(word, 2).goto(root, 3);
    b.state(2).reduce(&[0], production);
    b.state(3).accept();
    let language = b.build().unwrap();

    let mut parser = Parser::new();
    let err = parser.set_language(&language).unwrap_err();
    assert!(matches!(err, LanguageError::IncompatibleVersion { version: 1, .. }));
    assert!(parser.language().is_none());
}

#[test]
fn included_ranges_hide_the_gaps() {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    let ranges = [
        Range::new(0, 3, Point::new(0, 0), Point::new(0, 3)),
        Range::new(5, 7, Point::new(0, 5), Point::new(0, 7)),
    ];
    parser.set_included_ranges(&ranges).unwrap();
    let tree = parser.parse("1+2@@*3", None).unwrap();

    insta::assert_snapshot!(tree, @"(expression left: (number) right: (expression left: (number) right: (number)))");
    assert!(!tree.root_node().has_error());
    let inner = tree.root_node().child_by_field_name("right").unwrap();
    assert_eq!(inner.named_child(0).unwrap().byte_range(), 2..3);
    assert_eq!(tree.included_ranges(), ranges);
}

#[test]
fn rejects_malformed_included_ranges() {
    let mut parser = Parser::new();
    let p = |b| Point::new(0, b);

    let inverted = [Range::new(5, 3, p(5), p(3))];
    assert_eq!(
        parser.set_included_ranges(&inverted),
        Err(IncludedRangesError::Inverted { index: 0 })
    );

    let overlapping = [Range::new(0, 5, p(0), p(5)), Range::new(3, 8, p(3), p(8))];
    assert_eq!(
        parser.set_included_ranges(&overlapping),
        Err(IncludedRangesError::Unordered { index: 1 })
    );
    assert!(parser.included_ranges().is_empty());
}

#[test]
fn logger_receives_parse_and_lex_events() {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    parser.set_logger(Some(Box::new(move |kind, message| {
        sink.lock().unwrap().push((kind, message.to_owned()));
    })));
    assert!(parser.logger().is_some());

    parser.parse("1+2", None).unwrap();

    let lines = lines.lock().unwrap();
    assert!(lines.contains(&(
        LogType::Lex,
        "lexed_lookahead symbol:number position:0 size:1".to_owned()
    )));
    assert!(lines.contains(&(LogType::Parse, "accept symbol:expression".to_owned())));
    assert!(
        lines
            .iter()
            .any(|(kind, line)| *kind == LogType::Parse && line.starts_with("reduce symbol:expression"))
    );
}

#[test]
fn trees_and_parsers_cross_threads() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<Parser>();
    assert_send::<Tree>();
    assert_sync::<Tree>();
}

#[test]
fn deeply_nested_tree_is_walked_edited_and_dropped() {
    let depth = 50_000;
    let text = format!("{}1+2{} + 3", "(".repeat(depth), ")".repeat(depth));
    let mut tree = parse_arithmetic(&text);
    let root = tree.root_node();
    assert!(!root.has_error());

    let innermost = root.descendant_for_byte_range(depth, depth + 3).unwrap();
    assert_eq!(innermost.kind(), "expression");
    assert_eq!(innermost.parent().unwrap().kind(), "parenthesized_expression");

    let sexp = root.to_sexp();
    assert!(sexp.starts_with("(expression left: (parenthesized_expression (parenthesized_expression"));
    assert!(sexp.ends_with(" right: (number))"));

    // Every level starts at byte 0, so the edit reaches all of them.
    tree.edit(&InputEdit {
        start_byte: 0,
        old_end_byte: 0,
        new_end_byte: 2,
        start_position: Point::new(0, 0),
        old_end_position: Point::new(0, 0),
        new_end_position: Point::new(0, 2),
    });
    assert_eq!(tree.root_node().end_byte(), text.len() + 2);

    drop(tree);
}
