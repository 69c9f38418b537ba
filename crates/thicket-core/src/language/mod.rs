//! Language tables.
//!
//! A [`Language`] is an immutable, cheaply clonable handle to everything the
//! parser needs for one grammar: symbol and field names, the LR automaton,
//! token rules and supertype relations. Tables are written by hand with
//! [`LanguageBuilder`] or loaded from their binary form.

mod binary;
mod builder;
mod error;
mod table;
mod tokens;

#[cfg(test)]
mod builder_tests;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use binary::{HEADER_SIZE, MAGIC};
pub use builder::{LanguageBuilder, StateBuilder};
pub use error::LanguageError;
pub use table::{
    FieldEntry, LanguageTable, LexRule, ParseAction, ParseState, Production, SemanticVersion,
    SymbolInfo, SymbolMetadata, SymbolType,
};
pub use tokens::{LexState, TokenDfa};

use crate::{FieldId, StateId, Symbol};

/// Current table format version.
pub const LANGUAGE_VERSION: u32 = 3;
/// Oldest table format version the parser still understands.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: u32 = 2;

/// Symbol of the end-of-input token.
pub const SYMBOL_END: Symbol = 0;
/// Symbol of error nodes.
pub const SYMBOL_ERROR: Symbol = u16::MAX;
/// The state every failed parse passes through.
pub const ERROR_STATE: StateId = 0;

const ERROR_NAME: &str = "ERROR";
const ERROR_METADATA: SymbolMetadata = SymbolMetadata {
    visible: true,
    named: true,
    supertype: false,
};

#[derive(Clone)]
pub struct Language(Arc<LanguageInner>);

struct LanguageInner {
    table: LanguageTable,
    tokens: TokenDfa,
    extras: Vec<bool>,
    symbols_by_name: HashMap<(String, bool), Symbol>,
    fields_by_name: HashMap<String, FieldId>,
}

impl Language {
    /// Validates a table and compiles its token rules.
    pub fn from_table(table: LanguageTable) -> Result<Self, LanguageError> {
        validate(&table)?;
        let tokens = TokenDfa::build(&table.lex_rules)?;

        let mut extras = vec![false; table.symbols.len()];
        for &symbol in &table.extras {
            extras[symbol as usize] = true;
        }

        let mut symbols_by_name = HashMap::new();
        for (id, info) in table.symbols.iter().enumerate() {
            symbols_by_name
                .entry((info.name.clone(), info.metadata.named))
                .or_insert(id as Symbol);
        }

        let mut fields_by_name = HashMap::new();
        for (i, name) in table.fields.iter().enumerate() {
            if let Some(id) = FieldId::new(i as u16 + 1) {
                fields_by_name.insert(name.clone(), id);
            }
        }

        Ok(Self(Arc::new(LanguageInner {
            table,
            tokens,
            extras,
            symbols_by_name,
            fields_by_name,
        })))
    }

    pub fn table(&self) -> &LanguageTable {
        &self.0.table
    }

    pub fn name(&self) -> &str {
        &self.0.table.name
    }

    pub fn abi_version(&self) -> u32 {
        self.0.table.abi_version
    }

    pub fn semantic_version(&self) -> Option<SemanticVersion> {
        self.0.table.version
    }

    pub fn symbol_count(&self) -> usize {
        self.0.table.symbols.len()
    }

    pub fn state_count(&self) -> usize {
        self.0.table.states.len()
    }

    pub fn field_count(&self) -> usize {
        self.0.table.fields.len()
    }

    pub fn symbol_name(&self, symbol: Symbol) -> Option<&str> {
        if symbol == SYMBOL_ERROR {
            return Some(ERROR_NAME);
        }
        self.0
            .table
            .symbols
            .get(symbol as usize)
            .map(|info| info.name.as_str())
    }

    /// Looks up a symbol by name. Hidden symbols are only found when they are
    /// supertypes, so queries can refer to them.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<Symbol> {
        if named && name == ERROR_NAME {
            return Some(SYMBOL_ERROR);
        }
        let symbol = *self.0.symbols_by_name.get(&(name.to_owned(), named))?;
        let metadata = self.symbol_metadata(symbol);
        (metadata.visible || metadata.supertype).then_some(symbol)
    }

    pub fn symbol_metadata(&self, symbol: Symbol) -> SymbolMetadata {
        if symbol == SYMBOL_ERROR {
            return ERROR_METADATA;
        }
        self.0
            .table
            .symbols
            .get(symbol as usize)
            .map(|info| info.metadata)
            .unwrap_or_default()
    }

    pub fn symbol_type(&self, symbol: Symbol) -> SymbolType {
        let metadata = self.symbol_metadata(symbol);
        match (metadata.visible, metadata.named, metadata.supertype) {
            (_, _, true) => SymbolType::Supertype,
            (true, true, _) => SymbolType::Regular,
            (true, false, _) => SymbolType::Anonymous,
            (false, _, _) => SymbolType::Auxiliary,
        }
    }

    pub fn node_kind_is_named(&self, symbol: Symbol) -> bool {
        self.symbol_metadata(symbol).named
    }

    pub fn node_kind_is_visible(&self, symbol: Symbol) -> bool {
        self.symbol_metadata(symbol).visible
    }

    pub fn node_kind_is_supertype(&self, symbol: Symbol) -> bool {
        self.symbol_metadata(symbol).supertype
    }

    pub fn is_terminal(&self, symbol: Symbol) -> bool {
        symbol == SYMBOL_ERROR
            || self
                .0
                .table
                .symbols
                .get(symbol as usize)
                .is_some_and(|info| info.terminal)
    }

    pub fn is_extra(&self, symbol: Symbol) -> bool {
        self.0.extras.get(symbol as usize).copied().unwrap_or(false)
    }

    pub fn extras(&self) -> &[Symbol] {
        &self.0.table.extras
    }

    pub fn field_name_for_id(&self, field: FieldId) -> Option<&str> {
        self.0
            .table
            .fields
            .get(field.get() as usize - 1)
            .map(String::as_str)
    }

    pub fn field_id_for_name(&self, name: &str) -> Option<FieldId> {
        self.0.fields_by_name.get(name).copied()
    }

    pub fn supertypes(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.table.supertypes.iter().map(|(symbol, _)| *symbol)
    }

    pub fn subtypes(&self, supertype: Symbol) -> &[Symbol] {
        self.0
            .table
            .supertypes
            .iter()
            .find(|(symbol, _)| *symbol == supertype)
            .map(|(_, subtypes)| subtypes.as_slice())
            .unwrap_or(&[])
    }

    pub fn productions(&self) -> &[Production] {
        &self.0.table.productions
    }

    pub fn production(&self, id: u16) -> Option<&Production> {
        self.0.table.productions.get(id as usize)
    }

    pub fn start_state(&self) -> StateId {
        self.0.table.start_state
    }

    pub fn lex_rules(&self) -> &[LexRule] {
        &self.0.table.lex_rules
    }

    pub fn tokens(&self) -> &TokenDfa {
        &self.0.tokens
    }

    pub fn parse_state(&self, state: StateId) -> Option<&ParseState> {
        self.0.table.states.get(state as usize)
    }

    /// The action for a terminal in `state`. Extras without an explicit
    /// action are shifted in place.
    pub fn action(&self, state: StateId, symbol: Symbol) -> Option<ParseAction> {
        self.parse_state(state)
            .and_then(|s| s.action(symbol))
            .or_else(|| {
                (state != ERROR_STATE && self.is_extra(symbol)).then_some(ParseAction::ShiftExtra)
            })
    }

    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.parse_state(state).and_then(|s| s.goto(symbol))
    }

    /// The state reached by consuming `symbol` in `state`, or the error state.
    pub fn next_state(&self, state: StateId, symbol: Symbol) -> StateId {
        if self.is_terminal(symbol) {
            match self.action(state, symbol) {
                Some(ParseAction::Shift { state }) => state,
                Some(ParseAction::ShiftExtra) => state,
                _ => ERROR_STATE,
            }
        } else {
            self.goto(state, symbol).unwrap_or(ERROR_STATE)
        }
    }

    pub fn ptr_eq(&self, other: &Language) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.table == other.0.table
    }
}

impl Eq for Language {}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("abi_version", &self.abi_version())
            .field("symbols", &self.symbol_count())
            .field("states", &self.state_count())
            .finish()
    }
}

fn validate(table: &LanguageTable) -> Result<(), LanguageError> {
    let symbol_count = table.symbols.len();
    let state_count = table.states.len();
    let check_symbol = |symbol: Symbol, context: &str| {
        if (symbol as usize) < symbol_count {
            Ok(())
        } else {
            Err(LanguageError::InvalidTable(format!(
                "{context} refers to unknown symbol {symbol}"
            )))
        }
    };
    let check_state = |state: StateId, context: &str| {
        if (state as usize) < state_count {
            Ok(())
        } else {
            Err(LanguageError::InvalidTable(format!(
                "{context} refers to unknown state {state}"
            )))
        }
    };

    if table.symbols.is_empty() {
        return Err(LanguageError::InvalidTable("symbol table is empty".into()));
    }
    check_state(table.start_state, "start state")?;

    for (i, production) in table.productions.iter().enumerate() {
        let context = format!("production {i}");
        check_symbol(production.lhs, &context)?;
        for &child in &production.children {
            check_symbol(child, &context)?;
        }
        for entry in &production.fields {
            if entry.field.get() as usize > table.fields.len() {
                return Err(LanguageError::InvalidTable(format!(
                    "{context} refers to unknown field {}",
                    entry.field
                )));
            }
        }
    }

    for (i, state) in table.states.iter().enumerate() {
        let context = format!("state {i}");
        if !state.actions.is_sorted_by_key(|&(symbol, _)| symbol)
            || !state.gotos.is_sorted_by_key(|&(symbol, _)| symbol)
        {
            return Err(LanguageError::InvalidTable(format!(
                "{context} entries are not sorted by symbol"
            )));
        }
        for &(symbol, action) in &state.actions {
            check_symbol(symbol, &context)?;
            match action {
                ParseAction::Shift { state } => check_state(state, &context)?,
                ParseAction::Reduce { production } => {
                    if production as usize >= table.productions.len() {
                        return Err(LanguageError::InvalidTable(format!(
                            "{context} reduces unknown production {production}"
                        )));
                    }
                }
                ParseAction::ShiftExtra | ParseAction::Accept => {}
            }
        }
        for &(symbol, target) in &state.gotos {
            check_symbol(symbol, &context)?;
            check_state(target, &context)?;
        }
    }

    for rule in &table.lex_rules {
        if let Some(symbol) = rule.symbol {
            check_symbol(symbol, "lex rule")?;
        }
    }
    for &symbol in &table.extras {
        check_symbol(symbol, "extras")?;
    }
    for (supertype, subtypes) in &table.supertypes {
        check_symbol(*supertype, "supertype")?;
        for &subtype in subtypes {
            check_symbol(subtype, "supertype")?;
        }
    }
    Ok(())
}
