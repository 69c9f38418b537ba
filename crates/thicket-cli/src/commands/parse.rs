use std::path::PathBuf;

use thicket_syntax::{LogType, Node, Parser};

use super::input::require_text;
use super::lang_resolver::require_lang;

pub struct ParseArgs {
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub lang: Option<String>,
    pub trace: bool,
}

pub fn run(args: ParseArgs) {
    let source = require_text(
        args.source_path.as_deref(),
        args.source_text.as_deref(),
        "source",
    );
    let language = require_lang(args.lang.as_deref(), args.source_path.as_deref(), "parse");

    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&language) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    if args.trace {
        parser.set_logger(Some(Box::new(|kind: LogType, message: &str| {
            let tag = match kind {
                LogType::Parse => "parse",
                LogType::Lex => "lex",
            };
            eprintln!("{tag}: {message}");
        })));
    }

    let Some(tree) = parser.parse(&source.text, None) else {
        eprintln!("error: parsing was cancelled");
        std::process::exit(1);
    };

    let root = tree.root_node();
    println!("{}", root.to_sexp());

    let errors = syntax_errors(root);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{}: {error}", source.name);
        }
        std::process::exit(1);
    }
}

/// ERROR and MISSING nodes in document order, one line each.
pub fn syntax_errors(root: Node<'_>) -> Vec<String> {
    let mut out = Vec::new();
    if !root.has_error() {
        return out;
    }

    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let start = node.start_position();
        let end = node.end_position();
        if node.is_error() {
            out.push(format!(
                "ERROR at {}:{}-{}:{}",
                start.row, start.column, end.row, end.column
            ));
        } else if node.is_missing() {
            out.push(format!("MISSING {} at {}:{}", node.kind(), start.row, start.column));
        }

        // Error nodes are reported whole; only descend where an error is still hidden.
        if !node.is_error() && node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return out;
            }
        }
    }
}
