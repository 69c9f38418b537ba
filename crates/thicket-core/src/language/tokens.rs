//! Compiled token automaton.
//!
//! All lex rules are compiled into one anchored multi-pattern DFA. The lexer
//! drives it byte by byte so it can stop as soon as no rule can extend the
//! current token, which is also how far the token's lookahead reaches.

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::util::primitives::StateID;
use regex_automata::{Anchored, Input, MatchKind};

use super::LanguageError;
use super::table::LexRule;

/// Opaque automaton state handed back to the lexer between bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LexState(StateID);

pub struct TokenDfa {
    dfa: dense::DFA<Vec<u32>>,
    start: StateID,
}

impl TokenDfa {
    pub(crate) fn build(rules: &[LexRule]) -> Result<Self, LanguageError> {
        let patterns: Vec<&str> = rules.iter().map(|r| r.pattern.as_str()).collect();
        let dfa = dense::DFA::builder()
            .configure(
                dense::DFA::config()
                    .match_kind(MatchKind::All)
                    .start_kind(StartKind::Anchored),
            )
            .build_many(&patterns)
            .map_err(|e| LanguageError::InvalidTokenPattern {
                pattern: first_invalid(rules).unwrap_or_default(),
                message: e.to_string(),
            })?;
        let start = dfa
            .start_state_forward(&Input::new("").anchored(Anchored::Yes))
            .map_err(|e| LanguageError::InvalidTokenPattern {
                pattern: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { dfa, start })
    }

    #[inline]
    pub fn start(&self) -> LexState {
        LexState(self.start)
    }

    #[inline]
    pub fn next(&self, state: LexState, byte: u8) -> LexState {
        LexState(self.dfa.next_state(state.0, byte))
    }

    /// True when no rule can match any extension of the bytes seen so far.
    #[inline]
    pub fn is_dead(&self, state: LexState) -> bool {
        self.dfa.is_dead_state(state.0) || self.dfa.is_quit_state(state.0)
    }

    /// Indices of the rules whose match ends exactly at the current byte.
    pub fn accepting_rules(&self, state: LexState) -> impl Iterator<Item = usize> + '_ {
        let eoi = self.dfa.next_eoi_state(state.0);
        let count = if self.dfa.is_match_state(eoi) {
            self.dfa.match_len(eoi)
        } else {
            0
        };
        (0..count).map(move |i| self.dfa.match_pattern(eoi, i).as_usize())
    }
}

impl std::fmt::Debug for TokenDfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDfa")
            .field("patterns", &self.dfa.pattern_len())
            .finish()
    }
}

/// Finds the first rule that fails to compile on its own, for error reporting.
fn first_invalid(rules: &[LexRule]) -> Option<String> {
    rules
        .iter()
        .find(|rule| regex_syntax::parse(&rule.pattern).is_err())
        .map(|rule| rule.pattern.clone())
}
