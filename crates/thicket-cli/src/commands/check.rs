use std::path::PathBuf;

use thicket_query::Query;

use super::input::require_text;
use super::lang_resolver::require_lang;

pub struct CheckArgs {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub lang: Option<String>,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let query = require_text(
        args.query_path.as_deref(),
        args.query_text.as_deref(),
        "query",
    );
    // Query files carry no language extension of their own.
    let language = require_lang(args.lang.as_deref(), None, "check");

    if let Err(e) = Query::new(&language, &query.text) {
        eprint!(
            "{}",
            e.diagnostics()
                .printer(&query.text)
                .path(&query.name)
                .colored(args.color)
                .render()
        );
        std::process::exit(1);
    }

    // Silent on success (like cargo check)
}
