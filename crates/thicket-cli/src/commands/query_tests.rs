use thicket_query::{Query, QueryCursor};
use thicket_syntax::{Parser, Tree};

use super::query::{QueryReport, collect, format_report};

fn parse(text: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(&thicket_langs::arithmetic()).unwrap();
    parser.parse(text, None).unwrap()
}

fn report(cursor: &mut QueryCursor, query: &str, source: &str, by_capture: bool) -> QueryReport {
    let query = Query::new(&thicket_langs::arithmetic(), query).unwrap();
    let tree = parse(source);
    collect(cursor, &query, tree.root_node(), source, by_capture)
}

#[test]
fn text_output() {
    let report = report(&mut QueryCursor::new(), "(number) @n", "1 + 2 * 3", false);

    insta::assert_snapshot!(format_report(&report), @r"
    pattern: 0
      @n (number) 0:0-0:1 `1`
    pattern: 0
      @n (number) 0:4-0:5 `2`
    pattern: 0
      @n (number) 0:8-0:9 `3`
    ");
}

#[test]
fn matches_keep_every_capture() {
    let report = report(
        &mut QueryCursor::new(),
        "(expression left: (number) @l right: (number) @r)",
        "1 + 2",
        false,
    );

    assert_eq!(report.matches.len(), 1);
    let names: Vec<_> = report.matches[0].captures.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["l", "r"]);
}

#[test]
fn captures_are_listed_one_per_entry() {
    let report = report(
        &mut QueryCursor::new(),
        "[(number) (expression)] @x",
        "1 + 2",
        true,
    );

    let texts: Vec<_> = report
        .matches
        .iter()
        .map(|m| {
            assert_eq!(m.captures.len(), 1);
            m.captures[0].text.as_str()
        })
        .collect();
    assert_eq!(texts, ["1 + 2", "1", "2"]);
}

#[test]
fn json_output() {
    let report = report(&mut QueryCursor::new(), "(number) @n", "1\n+ 2", false);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["exceeded_match_limit"], false);
    assert_eq!(json["matches"][1]["pattern"], 0);
    assert_eq!(json["matches"][1]["captures"][0]["name"], "n");
    assert_eq!(json["matches"][1]["captures"][0]["kind"], "number");
    assert_eq!(json["matches"][1]["captures"][0]["text"], "2");
    assert_eq!(
        json["matches"][1]["captures"][0]["start"],
        serde_json::json!({ "row": 1, "column": 2 })
    );
}

#[test]
fn match_limit_is_reported() {
    let mut cursor = QueryCursor::new();
    cursor.set_match_limit(1);
    let report = report(&mut cursor, "(expression) @e", "1+2+3", false);

    assert!(report.exceeded_match_limit);
}

#[test]
fn byte_range_narrows_output() {
    let mut cursor = QueryCursor::new();
    cursor.set_byte_range(4..5);
    let report = report(&mut cursor, "(number) @n", "1 + 2 * 3", false);

    let texts: Vec<_> = report.matches.iter().map(|m| m.captures[0].text.as_str()).collect();
    assert_eq!(texts, ["2"]);
}
