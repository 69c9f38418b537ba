mod cli;
mod commands;

use cli::{CheckParams, LangsParams, LookaheadParams, ParseParams, QueryParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("parse", m)) => {
            let params = ParseParams::from_matches(m);
            commands::parse::run(params.into());
        }
        Some(("query", m)) => {
            let params = QueryParams::from_matches(m);
            commands::query::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("lookahead", m)) => {
            let params = LookaheadParams::from_matches(m);
            commands::lookahead::run(params.into());
        }
        Some(("langs", m)) => {
            let _params = LangsParams::from_matches(m);
            commands::langs::run();
        }
        _ => unreachable!("clap should have caught this"),
    }
}
