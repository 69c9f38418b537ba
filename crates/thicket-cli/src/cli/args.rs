//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so the same definition can be
//! composed into several commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Query file (positional). `-` reads stdin.
pub fn query_path_arg() -> Arg {
    Arg::new("query_path")
        .value_name("QUERY")
        .value_parser(value_parser!(PathBuf))
        .help("Query file (use \"-\" for stdin)")
}

/// Inline query text (-q/--query).
pub fn query_text_arg() -> Arg {
    Arg::new("query_text")
        .short('q')
        .long("query")
        .value_name("TEXT")
        .help("Inline query text")
}

/// Source file to parse (positional). `-` reads stdin.
pub fn source_path_arg() -> Arg {
    Arg::new("source_path")
        .value_name("SOURCE")
        .value_parser(value_parser!(PathBuf))
        .help("Source file to parse (use \"-\" for stdin)")
}

/// Inline source text (-s/--source).
pub fn source_text_arg() -> Arg {
    Arg::new("source_text")
        .short('s')
        .long("source")
        .value_name("TEXT")
        .help("Inline source text")
}

/// Language flag (-l/--lang).
pub fn lang_arg() -> Arg {
    Arg::new("lang")
        .short('l')
        .long("lang")
        .value_name("LANG")
        .help("Language (inferred from extension if not specified)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Print parser log lines to stderr (--trace).
pub fn trace_arg() -> Arg {
    Arg::new("trace")
        .long("trace")
        .action(ArgAction::SetTrue)
        .help("Print parser and lexer events to stderr")
}

/// Machine-readable output (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output matches as JSON")
}

/// Report captures in document order instead of matches (--captures).
pub fn captures_arg() -> Arg {
    Arg::new("captures")
        .long("captures")
        .action(ArgAction::SetTrue)
        .help("List captures in document order instead of matches")
}

/// In-progress match cap (--match-limit).
pub fn match_limit_arg() -> Arg {
    Arg::new("match_limit")
        .long("match-limit")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Maximum number of in-progress matches")
}

/// Restrict match starts to a byte range (--byte-range START:END).
pub fn byte_range_arg() -> Arg {
    Arg::new("byte_range")
        .long("byte-range")
        .value_name("START:END")
        .value_parser(parse_byte_range)
        .help("Only report matches intersecting this byte range")
}

/// Maximum depth of match start nodes (--max-start-depth).
pub fn max_start_depth_arg() -> Arg {
    Arg::new("max_start_depth")
        .long("max-start-depth")
        .value_name("DEPTH")
        .value_parser(value_parser!(u32))
        .help("Only start matches at nodes this deep or shallower")
}

/// Parse state to inspect (positional).
pub fn state_arg() -> Arg {
    Arg::new("state")
        .value_name("STATE")
        .required(true)
        .value_parser(value_parser!(u16))
        .help("Parse state id")
}

/// Language name (positional, required).
pub fn lang_name_arg() -> Arg {
    Arg::new("lang")
        .value_name("LANG")
        .required(true)
        .help("Language name")
}

pub(super) fn parse_byte_range(s: &str) -> Result<std::ops::Range<usize>, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{s}'"))?;
    let start: usize = start
        .parse()
        .map_err(|_| format!("invalid start offset '{start}'"))?;
    let end: usize = end
        .parse()
        .map_err(|_| format!("invalid end offset '{end}'"))?;
    if end < start {
        return Err(format!("range end {end} is before start {start}"));
    }
    Ok(start..end)
}
