//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("thicket")
        .about("Incremental parsing and structural queries")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(parse_command())
        .subcommand(query_command())
        .subcommand(check_command())
        .subcommand(lookahead_command())
        .subcommand(langs_command())
}

/// Parse a source file and print its syntax tree.
pub fn parse_command() -> Command {
    Command::new("parse")
        .about("Parse a source file and print its syntax tree")
        .override_usage(
            "\
  thicket parse <SOURCE> [-l <LANG>]
  thicket parse -s <TEXT> -l <LANG>",
        )
        .after_help(
            r#"EXAMPLES:
  thicket parse expr.calc              # language from extension
  thicket parse -s '1 + 2' -l calc     # inline source
  thicket parse expr.calc --trace      # show parser actions"#,
        )
        .arg(source_path_arg())
        .arg(source_text_arg())
        .arg(lang_arg())
        .arg(trace_arg())
}

/// Run a query against a source file.
pub fn query_command() -> Command {
    Command::new("query")
        .about("Run a query against a source file")
        .override_usage(
            "\
  thicket query <QUERY> <SOURCE> [-l <LANG>]
  thicket query -q <TEXT> <SOURCE> [-l <LANG>]
  thicket query <QUERY> -s <TEXT> -l <LANG>",
        )
        .after_help(
            r#"EXAMPLES:
  thicket query numbers.scm expr.calc
  thicket query -q '(number) @n' expr.calc --json
  thicket query -q '(number) @n' -s '1 + 2' -l calc --captures"#,
        )
        .arg(query_path_arg())
        .arg(source_path_arg())
        .arg(query_text_arg())
        .arg(source_text_arg())
        .arg(lang_arg())
        .arg(json_arg())
        .arg(captures_arg())
        .arg(match_limit_arg())
        .arg(byte_range_arg())
        .arg(max_start_depth_arg())
        .arg(color_arg())
}

/// Validate a query against a language.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate a query against a language")
        .override_usage(
            "\
  thicket check <QUERY> -l <LANG>
  thicket check -q <TEXT> -l <LANG>",
        )
        .after_help(
            r#"EXAMPLES:
  thicket check numbers.scm -l calc
  thicket check -q '(list (number) @n)' -l list"#,
        )
        .arg(query_path_arg())
        .arg(query_text_arg())
        .arg(lang_arg())
        .arg(color_arg())
}

/// List the symbols valid in a parse state.
pub fn lookahead_command() -> Command {
    Command::new("lookahead")
        .about("List the symbols valid in a parse state")
        .after_help(
            r#"EXAMPLES:
  thicket lookahead calc 1"#,
        )
        .arg(lang_name_arg())
        .arg(state_arg())
}

/// List supported languages.
pub fn langs_command() -> Command {
    Command::new("langs").about("List supported languages")
}
