//! Enumeration of the symbols valid in a parse state.

use crate::language::ERROR_STATE;
use crate::{Language, StateId, Symbol};

/// Yields every symbol that is legal next in a given state: terminals with
/// an action (extras included) followed by non-terminals with a goto.
///
/// The iterator can be repointed at another state or language without
/// giving up its buffer.
#[derive(Debug, Clone)]
pub struct LookaheadIterator {
    language: Language,
    state: StateId,
    symbols: Vec<Symbol>,
    next: usize,
}

impl LookaheadIterator {
    /// Returns `None` if `state` is out of range for `language`.
    pub fn new(language: &Language, state: StateId) -> Option<Self> {
        let mut iter = Self {
            language: language.clone(),
            state,
            symbols: Vec::new(),
            next: 0,
        };
        iter.fill().then_some(iter)
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    /// The symbol most recently yielded.
    pub fn current_symbol(&self) -> Option<Symbol> {
        self.next.checked_sub(1).map(|i| self.symbols[i])
    }

    pub fn current_symbol_name(&self) -> Option<&str> {
        self.current_symbol()
            .and_then(|symbol| self.language.symbol_name(symbol))
    }

    /// Restarts on `state` of the current language.
    pub fn reset_state(&mut self, state: StateId) -> bool {
        self.state = state;
        self.fill()
    }

    /// Restarts on `state` of another language.
    pub fn reset(&mut self, language: &Language, state: StateId) -> bool {
        self.language = language.clone();
        self.reset_state(state)
    }

    /// Remaining symbol names.
    pub fn iter_names(&mut self) -> impl Iterator<Item = &str> + '_ {
        let start = self.next;
        self.next = self.symbols.len();
        let language = &self.language;
        self.symbols[start..]
            .iter()
            .filter_map(move |&symbol| language.symbol_name(symbol))
    }

    fn fill(&mut self) -> bool {
        self.symbols.clear();
        self.next = 0;
        let Some(state) = self.language.parse_state(self.state) else {
            return false;
        };

        self.symbols
            .extend(state.actions.iter().map(|&(symbol, _)| symbol));
        if self.state != ERROR_STATE {
            self.symbols.extend_from_slice(self.language.extras());
        }
        self.symbols.sort_unstable();
        self.symbols.dedup();

        let terminals = self.symbols.len();
        self.symbols
            .extend(state.gotos.iter().map(|&(symbol, _)| symbol));
        self.symbols[terminals..].sort_unstable();
        true
    }
}

impl Iterator for LookaheadIterator {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        let symbol = *self.symbols.get(self.next)?;
        self.next += 1;
        Some(symbol)
    }
}
