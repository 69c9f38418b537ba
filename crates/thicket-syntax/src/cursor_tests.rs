use thicket_core::Point;

use crate::{Node, Parser, Tree, TreeCursor};

fn parse_list(text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::list()).unwrap();
    parser.parse(text, None).unwrap()
}

fn preorder_by_cursor(cursor: &mut TreeCursor<'_>) -> Vec<String> {
    let mut out = Vec::new();
    loop {
        out.push(cursor.node().kind().to_owned());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return out;
            }
        }
    }
}

fn preorder_by_children(node: Node<'_>, out: &mut Vec<String>) {
    out.push(node.kind().to_owned());
    for child in node.children() {
        preorder_by_children(child, out);
    }
}

#[test]
fn cursor_walk_matches_child_lists() {
    let tree = parse_list("[1, [a, null], # c\n []]");

    let by_cursor = preorder_by_cursor(&mut tree.walk());
    let mut by_children = Vec::new();
    preorder_by_children(tree.root_node(), &mut by_children);

    assert_eq!(by_cursor, by_children);
    insta::assert_snapshot!(by_cursor.join(" "), @"document list [ number , list [ identifier , null ] , comment list [ ] ]");
}

#[test]
fn failed_moves_keep_position() {
    let tree = parse_list("[1]");
    let mut cursor = tree.walk();

    assert!(!cursor.goto_parent());
    assert!(!cursor.goto_next_sibling());
    assert!(!cursor.goto_previous_sibling());
    assert_eq!(cursor.node(), tree.root_node());

    assert!(cursor.goto_first_child());
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind(), "[");
    assert!(!cursor.goto_first_child());
    assert!(!cursor.goto_previous_sibling());
    assert_eq!(cursor.node().kind(), "[");
}

#[test]
fn last_child_and_previous_sibling() {
    let tree = parse_list("[1, 2]");
    let mut cursor = tree.walk();
    cursor.goto_first_child();

    assert!(cursor.goto_last_child());
    assert_eq!(cursor.node().kind(), "]");
    let mut kinds = vec![cursor.node().kind()];
    while cursor.goto_previous_sibling() {
        kinds.push(cursor.node().kind());
    }
    assert_eq!(kinds, ["]", "number", ",", "number", "["]);
}

#[test]
fn field_names_on_cursor() {
    let tree = parse_list("[1, 2]");
    let mut cursor = tree.walk();
    cursor.goto_first_child();
    cursor.goto_first_child();

    let mut fields = Vec::new();
    loop {
        fields.push((cursor.node().kind(), cursor.field_name()));
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    assert_eq!(
        fields,
        [
            ("[", None),
            ("number", Some("element")),
            (",", None),
            ("number", Some("element")),
            ("]", None),
        ]
    );
    assert_eq!(cursor.depth(), 2);
}

#[test]
fn goto_descendant_uses_preorder_index() {
    let tree = parse_list("[1, [2]]");
    let mut cursor = tree.walk();
    let mut indexed = Vec::new();
    loop {
        indexed.push((cursor.descendant_index(), cursor.node()));
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break;
            }
        }
        if cursor.node() == tree.root_node() {
            break;
        }
    }

    for (index, node) in &indexed {
        let mut jump = tree.walk();
        jump.goto_descendant(*index);
        assert_eq!(jump.node(), *node, "descendant {index}");
    }
    assert_eq!(indexed.len(), tree.root_node().descendant_count());
}

#[test]
fn goto_first_child_for_byte_and_point() {
    let tree = parse_list("[1, 22, 3]");
    let mut cursor = tree.walk();
    cursor.goto_first_child();

    let mut by_byte = cursor.clone();
    assert_eq!(by_byte.goto_first_child_for_byte(5), Some(3));
    assert_eq!(by_byte.node().byte_range(), 4..6);

    let mut by_point = cursor.clone();
    assert_eq!(by_point.goto_first_child_for_point(Point::new(0, 8)), Some(5));
    assert_eq!(by_point.node().kind(), "number");

    assert_eq!(cursor.goto_first_child_for_byte(100), None);
    assert_eq!(cursor.node().kind(), "list");
}

#[test]
fn copies_are_independent() {
    let tree = parse_list("[1, 2]");
    let mut cursor = tree.walk();
    cursor.goto_first_child();
    let copy = cursor.clone();

    cursor.goto_first_child();
    assert_eq!(copy.node().kind(), "list");
    assert_eq!(cursor.node().kind(), "[");

    let mut other = tree.walk();
    other.reset_to(&cursor);
    assert_eq!(other.node(), cursor.node());

    let list = copy.node();
    cursor.reset(list);
    assert!(!cursor.goto_parent());
    assert_eq!(cursor.node(), list);
}
