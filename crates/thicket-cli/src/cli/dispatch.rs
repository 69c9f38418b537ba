//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! - `*Params` structs are populated from clap matches
//! - `Into<*Args>` impls bridge dispatch to the command handlers
//! - `-q` shifts a lone positional from query to source for `query`

use std::ops::Range;
use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::lookahead::LookaheadArgs;
use crate::commands::parse::ParseArgs;
use crate::commands::query::QueryArgs;

pub struct ParseParams {
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub lang: Option<String>,
    pub trace: bool,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source_path: m.get_one::<PathBuf>("source_path").cloned(),
            source_text: m.get_one::<String>("source_text").cloned(),
            lang: m.get_one::<String>("lang").cloned(),
            trace: m.get_flag("trace"),
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        Self {
            source_path: p.source_path,
            source_text: p.source_text,
            lang: p.lang,
            trace: p.trace,
        }
    }
}

pub struct QueryParams {
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
    pub color: ColorChoice,
}

impl QueryParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let query_text = m.get_one::<String>("query_text").cloned();
        let (query_path, source_path) = shift_positional_to_source(
            query_text.is_some(),
            m.get_one::<PathBuf>("query_path").cloned(),
            m.get_one::<PathBuf>("source_path").cloned(),
        );

        Self {
            query_path,
            query_text,
            source_path,
            source_text: m.get_one::<String>("source_text").cloned(),
            lang: m.get_one::<String>("lang").cloned(),
            json: m.get_flag("json"),
            captures: m.get_flag("captures"),
            match_limit: m.get_one::<u32>("match_limit").copied(),
            byte_range: m.get_one::<Range<usize>>("byte_range").cloned(),
            max_start_depth: m.get_one::<u32>("max_start_depth").copied(),
            color: parse_color(m),
        }
    }
}

impl From<QueryParams> for QueryArgs {
    fn from(p: QueryParams) -> Self {
        Self {
            query_path: p.query_path,
            query_text: p.query_text,
            source_path: p.source_path,
            source_text: p.source_text,
            lang: p.lang,
            json: p.json,
            captures: p.captures,
            match_limit: p.match_limit,
            byte_range: p.byte_range,
            max_start_depth: p.max_start_depth,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub lang: Option<String>,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            query_path: m.get_one::<PathBuf>("query_path").cloned(),
            query_text: m.get_one::<String>("query_text").cloned(),
            lang: m.get_one::<String>("lang").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            query_path: p.query_path,
            query_text: p.query_text,
            lang: p.lang,
            color: p.color.should_colorize(),
        }
    }
}

pub struct LookaheadParams {
    pub lang: String,
    pub state: u16,
}

impl LookaheadParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            lang: m
                .get_one::<String>("lang")
                .cloned()
                .unwrap_or_else(|| unreachable!("clap requires LANG")),
            state: m
                .get_one::<u16>("state")
                .copied()
                .unwrap_or_else(|| unreachable!("clap requires STATE")),
        }
    }
}

impl From<LookaheadParams> for LookaheadArgs {
    fn from(p: LookaheadParams) -> Self {
        Self {
            lang: p.lang,
            state: p.state,
        }
    }
}

pub struct LangsParams;

impl LangsParams {
    pub fn from_matches(_m: &ArgMatches) -> Self {
        Self
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// When -q is used with a single positional arg, shift it from query to source.
/// This enables: `thicket query -q '(number) @n' expr.calc`
fn shift_positional_to_source(
    has_query_text: bool,
    query_path: Option<PathBuf>,
    source_path: Option<PathBuf>,
) -> (Option<PathBuf>, Option<PathBuf>) {
    if has_query_text && query_path.is_some() && source_path.is_none() {
        return (None, query_path);
    }
    (query_path, source_path)
}
