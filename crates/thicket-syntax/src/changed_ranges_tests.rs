use thicket_core::{InputEdit, Point, Range};

use crate::{Parser, Tree};

fn parser() -> Parser {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    parser
}

/// Applies a single-line replacement of `old[start..old_end]` and reparses.
fn reparse(parser: &mut Parser, tree: &mut Tree, start: usize, old_end: usize, new_text: &str) -> Tree {
    let old_len = tree.root_node().end_byte();
    let inserted = new_text.len() + (old_end - start) - old_len;
    tree.edit(&InputEdit {
        start_byte: start,
        old_end_byte: old_end,
        new_end_byte: start + inserted,
        start_position: Point::new(0, start),
        old_end_position: Point::new(0, old_end),
        new_end_position: Point::new(0, start + inserted),
    });
    parser.parse(new_text, Some(tree)).unwrap()
}

#[test]
fn unedited_trees_have_no_changes() {
    let mut parser = parser();
    let tree = parser.parse("1 + 2 * 3", None).unwrap();
    let new_tree = parser.parse("1 + 2 * 3", Some(&tree)).unwrap();

    assert_eq!(tree.changed_ranges(&new_tree).len(), 0);
}

#[test]
fn text_only_changes_are_not_reported() {
    let mut parser = parser();
    let mut tree = parser.parse("1 + 2", None).unwrap();

    let new_tree = reparse(&mut parser, &mut tree, 4, 5, "1 + 3");

    assert_eq!(tree.changed_ranges(&new_tree).len(), 0);
}

#[test]
fn operator_swap_reports_operator() {
    let mut parser = parser();
    let mut tree = parser.parse("1+2", None).unwrap();

    let new_tree = reparse(&mut parser, &mut tree, 1, 2, "1-2");

    let ranges: Vec<Range> = tree.changed_ranges(&new_tree).collect();
    assert_eq!(ranges, [Range::new(1, 2, Point::new(0, 1), Point::new(0, 2))]);
}

#[test]
fn nested_expression_reports_its_span() {
    let mut parser = parser();
    let mut tree = parser.parse("1 + 2", None).unwrap();

    // `2` becomes the left operand of a product.
    let new_tree = reparse(&mut parser, &mut tree, 5, 5, "1 + 2 * 3");

    let ranges: Vec<Range> = tree.changed_ranges(&new_tree).collect();
    assert_eq!(ranges, [Range::new(4, 9, Point::new(0, 4), Point::new(0, 9))]);
}

#[test]
fn removed_expression_reports_remaining_span() {
    let mut parser = parser();
    let mut tree = parser.parse("1 + 2 * 3", None).unwrap();

    let new_tree = reparse(&mut parser, &mut tree, 5, 9, "1 + 2");

    let ranges: Vec<Range> = tree.changed_ranges(&new_tree).collect();
    assert_eq!(ranges, [Range::new(4, 5, Point::new(0, 4), Point::new(0, 5))]);
}
