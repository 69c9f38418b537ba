//! Error recovery.
//!
//! When the lookahead has no action, recovery tries, in order:
//!
//! 1. inserting a zero-width MISSING token that lets the lookahead shift,
//! 2. at end of input, wrapping everything parsed so far in an ERROR root,
//! 3. skipping the lookahead into an ERROR node, merged with an ERROR node
//!    directly before it.
//!
//! ERROR nodes are extras, so later reductions step over them the way they
//! step over comments.

use thicket_core::language::{ERROR_STATE, ParseAction, SYMBOL_END, SYMBOL_ERROR};
use thicket_core::{Language, Length, StateId, Symbol};

use super::{LogType, Parser, log, symbol_label};
use crate::subtree::Subtree;

/// Bound on reductions while simulating one token, for tables whose
/// empty productions could reduce forever.
const MAX_SIMULATED_STEPS: usize = 1024;

pub(super) enum Outcome {
    /// A token was inserted; the lookahead should be tried again.
    Retry(Subtree),
    /// The lookahead was absorbed into the stack.
    Consumed,
    /// Input ended; this is the root.
    Finished(Subtree),
}

impl Parser {
    pub(super) fn recover(&mut self, language: &Language, lookahead: Subtree) -> Outcome {
        let position = self.stack.position().bytes;
        if lookahead.symbol != SYMBOL_ERROR
            && self.last_missing != Some(position)
            && let Some(missing) = self.find_missing(language, lookahead.symbol)
        {
            self.insert_missing(language, missing, &lookahead);
            self.last_missing = Some(position);
            return Outcome::Retry(lookahead);
        }

        if lookahead.symbol == SYMBOL_END {
            return Outcome::Finished(self.wrap_in_error(language, lookahead));
        }

        self.skip(language, lookahead);
        Outcome::Consumed
    }

    /// The lowest terminal whose insertion lets `lookahead` be shifted.
    fn find_missing(&self, language: &Language, lookahead: Symbol) -> Option<Symbol> {
        let states = self.stack.structural_states();
        (1..language.symbol_count())
            .filter_map(|s| Symbol::try_from(s).ok())
            .filter(|&s| language.is_terminal(s) && !language.is_extra(s))
            .find(|&candidate| {
                let mut states = states.clone();
                simulate(language, &mut states, candidate)
                    && simulate(language, &mut states, lookahead)
            })
    }

    fn insert_missing(&mut self, language: &Language, symbol: Symbol, lookahead: &Subtree) {
        for _ in 0..MAX_SIMULATED_STEPS {
            let state = self.stack.state();
            match language.action(state, symbol) {
                Some(ParseAction::Shift { state: next }) => {
                    log!(self, Parse, "insert_missing symbol:{}", language.symbol_name(symbol).unwrap_or("?"));
                    let leaf = Subtree::missing_leaf(symbol, Length::ZERO, state, language);
                    self.stack.push(next, leaf);
                    return;
                }
                Some(ParseAction::Reduce { production }) => self.reduce(language, production, lookahead),
                _ => return,
            }
        }
    }

    fn wrap_in_error(&mut self, language: &Language, end: Subtree) -> Subtree {
        log!(self, Parse, "recover_eof");
        let mut children = self.stack.drain();
        children.push(end);
        Subtree::node(SYMBOL_ERROR, children, None, ERROR_STATE, language)
    }

    fn skip(&mut self, language: &Language, mut lookahead: Subtree) {
        let state = self.stack.state();
        log!(self, Parse, "skip_token symbol:{}", symbol_label(language, &lookahead));

        if lookahead.symbol == SYMBOL_ERROR && lookahead.is_leaf() {
            lookahead.set_extra();
            self.stack.push(state, lookahead);
            return;
        }

        let merge = self
            .stack
            .top()
            .is_some_and(|top| top.subtree.symbol == SYMBOL_ERROR && !top.subtree.is_leaf());
        let node = if merge {
            let previous = self.stack.ensure_pop().subtree;
            let mut children = previous.children.clone();
            children.push(lookahead);
            Subtree::error_node(children, previous.parse_state, language)
        } else {
            Subtree::error_node(vec![lookahead], state, language)
        };
        self.stack.push(state, node);
    }
}

/// Runs `symbol` through the table on a copy of the structural states.
/// True if it would be shifted or accepted.
fn simulate(language: &Language, states: &mut Vec<StateId>, symbol: Symbol) -> bool {
    for _ in 0..MAX_SIMULATED_STEPS {
        let Some(&state) = states.last() else {
            return false;
        };
        match language.action(state, symbol) {
            Some(ParseAction::Shift { state: next }) => {
                states.push(next);
                return true;
            }
            Some(ParseAction::ShiftExtra | ParseAction::Accept) => return true,
            Some(ParseAction::Reduce { production }) => {
                let Some(production) = language.production(production) else {
                    return false;
                };
                let count = production.children.len();
                if count >= states.len() {
                    return false;
                }
                states.truncate(states.len() - count);
                let Some(next) = states.last().and_then(|&s| language.goto(s, production.lhs)) else {
                    return false;
                };
                states.push(next);
            }
            None => return false,
        }
    }
    false
}
