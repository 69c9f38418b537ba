use thicket_core::LookaheadIterator;

use super::lang_resolver::require_lang;

pub struct LookaheadArgs {
    pub lang: String,
    pub state: u16,
}

pub fn run(args: LookaheadArgs) {
    let language = require_lang(Some(&args.lang), None, "lookahead");

    let Some(mut lookahead) = LookaheadIterator::new(&language, args.state) else {
        eprintln!(
            "error: state {} is out of range for '{}' ({} states)",
            args.state,
            language.name(),
            language.state_count()
        );
        std::process::exit(1);
    };

    for name in lookahead.iter_names() {
        println!("{name}");
    }
}
