use std::fmt::Write as _;
use std::ops::Range;
use std::path::PathBuf;

use serde::Serialize;
use thicket_core::Point;
use thicket_query::{Query, QueryCapture, QueryCursor};
use thicket_syntax::{Node, Parser};

use super::input::require_text;
use super::lang_resolver::require_lang;

pub struct QueryArgs {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub lang: Option<String>,
    pub json: bool,
    pub captures: bool,
    pub match_limit: Option<u32>,
    pub byte_range: Option<Range<usize>>,
    pub max_start_depth: Option<u32>,
    pub color: bool,
}

/// One match, or one capture when listing captures.
#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub pattern: usize,
    pub captures: Vec<CaptureReport>,
}

#[derive(Debug, Serialize)]
pub struct CaptureReport {
    pub name: String,
    pub kind: String,
    pub start: Point,
    pub end: Point,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub matches: Vec<MatchReport>,
    pub exceeded_match_limit: bool,
}

pub fn run(args: QueryArgs) {
    let query_source = require_text(
        args.query_path.as_deref(),
        args.query_text.as_deref(),
        "query",
    );
    let source = require_text(
        args.source_path.as_deref(),
        args.source_text.as_deref(),
        "source",
    );
    let language = require_lang(args.lang.as_deref(), args.source_path.as_deref(), "query");

    let query = match Query::new(&language, &query_source.text) {
        Ok(query) => query,
        Err(e) => {
            eprint!(
                "{}",
                e.diagnostics()
                    .printer(&query_source.text)
                    .path(&query_source.name)
                    .colored(args.color)
                    .render()
            );
            std::process::exit(1);
        }
    };

    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&language) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    let Some(tree) = parser.parse(&source.text, None) else {
        eprintln!("error: parsing was cancelled");
        std::process::exit(1);
    };

    let mut cursor = QueryCursor::new();
    if let Some(limit) = args.match_limit {
        cursor.set_match_limit(limit);
    }
    if let Some(range) = args.byte_range {
        cursor.set_byte_range(range);
    }
    cursor.set_max_start_depth(args.max_start_depth);

    let report = collect(&mut cursor, &query, tree.root_node(), &source.text, args.captures);

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", format_report(&report));
    }

    if report.exceeded_match_limit {
        eprintln!("warning: match limit exceeded; some matches were dropped");
    }
}

/// Runs the query and gathers what to print.
pub fn collect(
    cursor: &mut QueryCursor,
    query: &Query,
    root: Node<'_>,
    source: &str,
    by_capture: bool,
) -> QueryReport {
    if by_capture {
        let mut captures = cursor.captures(query, root, source);
        let matches = captures
            .by_ref()
            .map(|(m, i)| MatchReport {
                pattern: m.pattern_index,
                captures: vec![capture_report(query, source, &m.captures[i])],
            })
            .collect();
        QueryReport {
            matches,
            exceeded_match_limit: captures.did_exceed_match_limit(),
        }
    } else {
        let mut matches = cursor.matches(query, root, source);
        let reports = matches
            .by_ref()
            .map(|m| MatchReport {
                pattern: m.pattern_index,
                captures: m
                    .captures
                    .iter()
                    .map(|c| capture_report(query, source, c))
                    .collect(),
            })
            .collect();
        QueryReport {
            matches: reports,
            exceeded_match_limit: matches.did_exceed_match_limit(),
        }
    }
}

fn capture_report(query: &Query, source: &str, capture: &QueryCapture<'_>) -> CaptureReport {
    let node = capture.node;
    CaptureReport {
        name: query.capture_name(capture.index).unwrap_or_default().to_string(),
        kind: node.kind().to_string(),
        start: node.start_position(),
        end: node.end_position(),
        text: node.utf8_text(source.as_bytes()).unwrap_or_default().to_string(),
    }
}

pub fn format_report(report: &QueryReport) -> String {
    let mut out = String::new();
    for m in &report.matches {
        let _ = writeln!(out, "pattern: {}", m.pattern);
        for c in &m.captures {
            let _ = writeln!(
                out,
                "  @{} ({}) {}:{}-{}:{} `{}`",
                c.name, c.kind, c.start.row, c.start.column, c.end.row, c.end.column, c.text
            );
        }
    }
    out
}
