//! Incremental construction of language tables.

use std::num::NonZeroU16;

use super::table::{
    FieldEntry, LanguageTable, LexRule, ParseAction, ParseState, Production, SemanticVersion,
    SymbolInfo, SymbolMetadata, SymbolType,
};
use super::{LANGUAGE_VERSION, Language, LanguageError, SYMBOL_END};
use crate::{FieldId, StateId, Symbol};

/// Builds a [`Language`] from hand-written LR tables.
///
/// Symbol 0 (`end`) and the error state 0 are created up front; the first
/// state allocated by [`LanguageBuilder::state`] is the start state unless
/// [`LanguageBuilder::start_state`] says otherwise.
#[derive(Debug)]
pub struct LanguageBuilder {
    table: LanguageTable,
}

impl LanguageBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: LanguageTable {
                name: name.into(),
                abi_version: LANGUAGE_VERSION,
                version: None,
                symbols: vec![SymbolInfo {
                    name: "end".to_owned(),
                    metadata: SymbolMetadata::default(),
                    terminal: true,
                }],
                fields: Vec::new(),
                supertypes: Vec::new(),
                productions: Vec::new(),
                states: vec![ParseState::default()],
                start_state: 1,
                lex_rules: Vec::new(),
                extras: Vec::new(),
            },
        }
    }

    pub fn version(mut self, major: u8, minor: u8, patch: u8) -> Self {
        self.table.version = Some(SemanticVersion {
            major,
            minor,
            patch,
        });
        self
    }

    pub fn abi_version(mut self, version: u32) -> Self {
        self.table.abi_version = version;
        self
    }

    fn add_symbol(&mut self, name: &str, ty: SymbolType, terminal: bool) -> Symbol {
        let id = self.table.symbols.len() as Symbol;
        self.table.symbols.push(SymbolInfo {
            name: name.to_owned(),
            metadata: ty.into(),
            terminal,
        });
        id
    }

    /// A token matched by a regular expression.
    pub fn token(&mut self, name: &str, ty: SymbolType, pattern: &str) -> Symbol {
        let symbol = self.add_symbol(name, ty, true);
        self.table.lex_rules.push(LexRule {
            pattern: pattern.to_owned(),
            symbol: Some(symbol),
        });
        symbol
    }

    /// An anonymous token whose name is the literal text it matches.
    pub fn literal(&mut self, text: &str) -> Symbol {
        self.token(text, SymbolType::Anonymous, &regex_syntax::escape(text))
    }

    /// A named token matching fixed text, e.g. a keyword.
    pub fn keyword(&mut self, name: &str, text: &str) -> Symbol {
        self.token(name, SymbolType::Regular, &regex_syntax::escape(text))
    }

    /// Text that is consumed as padding before the next token.
    pub fn skip(&mut self, pattern: &str) {
        self.table.lex_rules.push(LexRule {
            pattern: pattern.to_owned(),
            symbol: None,
        });
    }

    /// A non-terminal produced by reductions.
    pub fn rule(&mut self, name: &str, ty: SymbolType) -> Symbol {
        self.add_symbol(name, ty, false)
    }

    /// Declares a token that may appear anywhere between other symbols.
    pub fn extra(&mut self, symbol: Symbol) {
        if !self.table.extras.contains(&symbol) {
            self.table.extras.push(symbol);
        }
    }

    pub fn supertype(&mut self, supertype: Symbol, subtypes: &[Symbol]) {
        self.table.supertypes.push((supertype, subtypes.to_vec()));
    }

    pub fn field(&mut self, name: &str) -> FieldId {
        if let Some(i) = self.table.fields.iter().position(|f| f == name) {
            return field_id(i);
        }
        self.table.fields.push(name.to_owned());
        field_id(self.table.fields.len() - 1)
    }

    /// Adds a production; `fields` pairs structural child indices with fields.
    pub fn production(&mut self, lhs: Symbol, children: &[Symbol], fields: &[(u8, FieldId)]) -> u16 {
        let id = self.table.productions.len() as u16;
        self.table.productions.push(Production {
            lhs,
            children: children.to_vec(),
            fields: fields
                .iter()
                .map(|&(child_index, field)| FieldEntry { child_index, field })
                .collect(),
        });
        id
    }

    pub fn start_state(mut self, state: StateId) -> Self {
        self.table.start_state = state;
        self
    }

    /// Opens state `id` for editing, allocating it and any gaps below it.
    pub fn state(&mut self, id: StateId) -> StateBuilder<'_> {
        let index = id as usize;
        if self.table.states.len() <= index {
            self.table.states.resize_with(index + 1, ParseState::default);
        }
        StateBuilder {
            state: &mut self.table.states[index],
        }
    }

    pub fn build(mut self) -> Result<Language, LanguageError> {
        for state in &mut self.table.states {
            state.actions.sort_by_key(|&(symbol, _)| symbol);
            state.gotos.sort_by_key(|&(symbol, _)| symbol);
        }
        Language::from_table(self.table)
    }

    pub fn into_table(self) -> LanguageTable {
        self.table
    }
}

/// Editing handle for one parse state.
pub struct StateBuilder<'a> {
    state: &'a mut ParseState,
}

impl StateBuilder<'_> {
    fn set(&mut self, symbol: Symbol, action: ParseAction) {
        match self.state.actions.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = action,
            None => self.state.actions.push((symbol, action)),
        }
    }

    pub fn shift(mut self, symbol: Symbol, state: StateId) -> Self {
        self.set(symbol, ParseAction::Shift { state });
        self
    }

    pub fn shift_extra(mut self, symbol: Symbol) -> Self {
        self.set(symbol, ParseAction::ShiftExtra);
        self
    }

    /// Reduces `production` on each of the given lookaheads.
    pub fn reduce(mut self, lookaheads: &[Symbol], production: u16) -> Self {
        for &symbol in lookaheads {
            self.set(symbol, ParseAction::Reduce { production });
        }
        self
    }

    pub fn accept(mut self) -> Self {
        self.set(SYMBOL_END, ParseAction::Accept);
        self
    }

    pub fn goto(self, symbol: Symbol, state: StateId) -> Self {
        match self.state.gotos.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = state,
            None => self.state.gotos.push((symbol, state)),
        }
        self
    }
}

fn field_id(index: usize) -> FieldId {
    NonZeroU16::new(index as u16 + 1).unwrap_or(NonZeroU16::MIN)
}
