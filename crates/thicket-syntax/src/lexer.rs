//! Tokenization driven by the language's token automaton.
//!
//! The lexer decodes characters through the [`InputAdapter`] and feeds their
//! UTF-8 encoding to the DFA, so token rules are written against UTF-8 no
//! matter how the document is encoded.

use thicket_core::language::{SYMBOL_END, SYMBOL_ERROR};
use thicket_core::{Language, Length, StateId, Symbol};

use crate::input::InputAdapter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub symbol: Symbol,
    pub padding: Length,
    pub size: Length,
    pub lookahead_bytes: usize,
    pub lex_ambiguous: bool,
}

/// Outcome of running the automaton from one position.
struct Scan {
    /// End of the longest match and the rules matching there.
    longest: Option<(Length, Vec<usize>)>,
    /// Byte just past the last character the automaton consumed.
    examined_end: usize,
}

pub(crate) struct Lexer<'l> {
    language: &'l Language,
}

impl<'l> Lexer<'l> {
    pub fn new(language: &'l Language) -> Self {
        Self { language }
    }

    /// Lexes the next token at the adapter's position. Skipped text becomes
    /// the token's padding. Characters no rule matches are gathered into a
    /// single ERROR token.
    pub fn lex(&self, input: &mut InputAdapter<'_>, state: StateId) -> Token {
        let start = input.position();
        loop {
            let token_start = input.position();
            if input.is_eof() {
                return Token {
                    symbol: SYMBOL_END,
                    padding: token_start - start,
                    size: Length::ZERO,
                    lookahead_bytes: 1,
                    lex_ambiguous: false,
                };
            }

            let scan = self.scan(input);
            let Some((end, rules)) = scan.longest else {
                let end = self.skip_unrecognized(input);
                return Token {
                    symbol: SYMBOL_ERROR,
                    padding: token_start - start,
                    size: end - token_start,
                    lookahead_bytes: 1,
                    lex_ambiguous: false,
                };
            };

            let (rule, ambiguous) = self.choose(&rules, state);
            input.seek(end);
            let Some(symbol) = self.language.lex_rules()[rule].symbol else {
                continue;
            };
            return Token {
                symbol,
                padding: token_start - start,
                size: end - token_start,
                lookahead_bytes: scan.examined_end.saturating_sub(end.bytes).max(1),
                lex_ambiguous: ambiguous,
            };
        }
    }

    fn scan(&self, input: &mut InputAdapter<'_>) -> Scan {
        let dfa = self.language.tokens();
        let mut state = dfa.start();
        let mut longest = None;
        let mut buf = [0u8; 4];

        while let Some(c) = input.lookahead() {
            let next_byte = input.position().bytes + input.lookahead_size();
            for &byte in c.encode_utf8(&mut buf).as_bytes() {
                state = dfa.next(state, byte);
            }
            if dfa.is_dead(state) {
                return Scan {
                    longest,
                    examined_end: next_byte,
                };
            }
            input.advance();
            let mut rules: Vec<usize> = dfa.accepting_rules(state).collect();
            rules.sort_unstable();
            if !rules.is_empty() {
                longest = Some((input.mark_end(), rules));
            }
        }

        Scan {
            longest,
            examined_end: input.position().bytes,
        }
    }

    /// Picks among rules matching the same text: a rule whose token is valid
    /// in `state` wins, then the earliest rule. Reports whether more than one
    /// distinct token matched.
    fn choose(&self, rules: &[usize], state: StateId) -> (usize, bool) {
        let lex_rules = self.language.lex_rules();
        let valid = |&&rule: &&usize| {
            lex_rules[rule]
                .symbol
                .is_none_or(|symbol| self.language.action(state, symbol).is_some())
        };
        let chosen = rules
            .iter()
            .find(valid)
            .or_else(|| rules.first())
            .copied()
            .unwrap_or_default();

        let first_symbol = lex_rules[chosen].symbol;
        let ambiguous = rules
            .iter()
            .any(|&rule| lex_rules[rule].symbol != first_symbol);
        (chosen, ambiguous)
    }

    /// Consumes characters until some rule can match again.
    fn skip_unrecognized(&self, input: &mut InputAdapter<'_>) -> Length {
        input.advance();
        while !input.is_eof() {
            let position = input.position();
            let matched = self.scan(input).longest.is_some();
            input.seek(position);
            if matched {
                break;
            }
            input.advance();
        }
        input.mark_end()
    }
}
