//! Tests for CLI dispatch logic.

use std::path::PathBuf;

use super::args::parse_byte_range;
use super::*;
use crate::cli::commands::{
    check_command, langs_command, lookahead_command, parse_command, query_command,
};

#[test]
fn parse_params_extracts_all_fields() {
    let m = parse_command()
        .try_get_matches_from(["parse", "expr.calc", "-l", "list", "--trace"])
        .unwrap();
    let params = ParseParams::from_matches(&m);

    assert_eq!(params.source_path, Some(PathBuf::from("expr.calc")));
    assert_eq!(params.source_text, None);
    assert_eq!(params.lang.as_deref(), Some("list"));
    assert!(params.trace);
}

#[test]
fn parse_accepts_inline_source() {
    let m = parse_command()
        .try_get_matches_from(["parse", "-s", "1 + 2", "-l", "calc"])
        .unwrap();
    let params = ParseParams::from_matches(&m);

    assert_eq!(params.source_path, None);
    assert_eq!(params.source_text.as_deref(), Some("1 + 2"));
    assert!(!params.trace);
}

#[test]
fn query_takes_two_positionals() {
    let m = query_command()
        .try_get_matches_from(["query", "q.scm", "expr.calc"])
        .unwrap();
    let params = QueryParams::from_matches(&m);

    assert_eq!(params.query_path, Some(PathBuf::from("q.scm")));
    assert_eq!(params.source_path, Some(PathBuf::from("expr.calc")));
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn query_shifts_positional_with_inline_query() {
    let m = query_command()
        .try_get_matches_from(["query", "-q", "(number) @n", "expr.calc"])
        .unwrap();
    let params = QueryParams::from_matches(&m);

    assert_eq!(params.query_path, None);
    assert_eq!(params.query_text.as_deref(), Some("(number) @n"));
    assert_eq!(params.source_path, Some(PathBuf::from("expr.calc")));
}

#[test]
fn query_no_shift_with_both_positionals() {
    let m = query_command()
        .try_get_matches_from(["query", "-q", "(number) @n", "a.calc", "b.calc"])
        .unwrap();
    let params = QueryParams::from_matches(&m);

    assert_eq!(params.query_path, Some(PathBuf::from("a.calc")));
    assert_eq!(params.source_path, Some(PathBuf::from("b.calc")));
}

#[test]
fn query_params_extracts_cursor_settings() {
    let m = query_command()
        .try_get_matches_from([
            "query",
            "q.scm",
            "expr.calc",
            "--json",
            "--captures",
            "--match-limit",
            "8",
            "--byte-range",
            "2:10",
            "--max-start-depth",
            "1",
            "--color",
            "never",
        ])
        .unwrap();
    let params = QueryParams::from_matches(&m);

    assert!(params.json);
    assert!(params.captures);
    assert_eq!(params.match_limit, Some(8));
    assert_eq!(params.byte_range, Some(2..10));
    assert_eq!(params.max_start_depth, Some(1));
    assert_eq!(params.color, ColorChoice::Never);
}

#[test]
fn query_rejects_bad_byte_range() {
    let result = query_command().try_get_matches_from(["query", "q", "s", "--byte-range", "9:2"]);
    assert!(result.is_err());
}

#[test]
fn byte_range_parsing() {
    assert_eq!(parse_byte_range("0:5"), Ok(0..5));
    assert_eq!(parse_byte_range("3:3"), Ok(3..3));
    assert_eq!(parse_byte_range("5"), Err("expected START:END, got '5'".to_string()));
    assert_eq!(parse_byte_range("a:5"), Err("invalid start offset 'a'".to_string()));
    assert_eq!(
        parse_byte_range("5:1"),
        Err("range end 1 is before start 5".to_string())
    );
}

#[test]
fn check_params_extracts_all_fields() {
    let m = check_command()
        .try_get_matches_from(["check", "q.scm", "-l", "list", "--color", "always"])
        .unwrap();
    let params = CheckParams::from_matches(&m);

    assert_eq!(params.query_path, Some(PathBuf::from("q.scm")));
    assert_eq!(params.query_text, None);
    assert_eq!(params.lang.as_deref(), Some("list"));
    assert_eq!(params.color, ColorChoice::Always);
}

#[test]
fn check_rejects_unknown_color() {
    let result = check_command().try_get_matches_from(["check", "q.scm", "--color", "sometimes"]);
    assert!(result.is_err());
}

#[test]
fn lookahead_params() {
    let m = lookahead_command()
        .try_get_matches_from(["lookahead", "calc", "3"])
        .unwrap();
    let params = LookaheadParams::from_matches(&m);

    assert_eq!(params.lang, "calc");
    assert_eq!(params.state, 3);
}

#[test]
fn lookahead_requires_numeric_state() {
    assert!(lookahead_command().try_get_matches_from(["lookahead", "calc"]).is_err());
    assert!(
        lookahead_command()
            .try_get_matches_from(["lookahead", "calc", "x"])
            .is_err()
    );
}

#[test]
fn langs_takes_no_arguments() {
    assert!(langs_command().try_get_matches_from(["langs"]).is_ok());
    assert!(langs_command().try_get_matches_from(["langs", "extra"]).is_err());
}

#[test]
fn cli_lists_every_subcommand() {
    let cli = build_cli();
    let names: Vec<_> = cli.get_subcommands().map(|c| c.get_name()).collect();
    assert_eq!(names, ["parse", "query", "check", "lookahead", "langs"]);
    cli.debug_assert();
}

#[test]
fn forced_colors() {
    assert!(ColorChoice::Always.should_colorize());
    assert!(!ColorChoice::Never.should_colorize());
}
