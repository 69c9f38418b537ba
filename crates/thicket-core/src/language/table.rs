//! Serializable parse table types.

use serde::{Deserialize, Serialize};

use crate::{FieldId, StateId, Symbol};

/// How a grammar symbol presents itself in syntax trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolType {
    /// Visible and named, e.g. `number`.
    Regular,
    /// Visible but anonymous, e.g. `"+"`.
    Anonymous,
    /// Hidden rule that stands for a choice of other named symbols.
    Supertype,
    /// Hidden rule that never appears in trees.
    Auxiliary,
}

/// Presentation flags for a symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolMetadata {
    pub visible: bool,
    pub named: bool,
    pub supertype: bool,
}

impl From<SymbolType> for SymbolMetadata {
    fn from(ty: SymbolType) -> Self {
        match ty {
            SymbolType::Regular => Self {
                visible: true,
                named: true,
                supertype: false,
            },
            SymbolType::Anonymous => Self {
                visible: true,
                named: false,
                supertype: false,
            },
            SymbolType::Supertype => Self {
                visible: false,
                named: true,
                supertype: true,
            },
            SymbolType::Auxiliary => Self {
                visible: false,
                named: false,
                supertype: false,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub metadata: SymbolMetadata,
    /// Terminals come from the lexer; everything else is produced by reductions.
    pub terminal: bool,
}

/// One entry of the LR action table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseAction {
    /// Push the lookahead and move to `state`.
    Shift { state: StateId },
    /// Push the lookahead as an extra without changing state.
    ShiftExtra,
    /// Pop the production's children and push its left-hand side.
    Reduce { production: u16 },
    /// The input is complete.
    Accept,
}

/// Field assignment for one structural child of a production.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Index among the production's non-extra children.
    pub child_index: u8,
    pub field: FieldId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: Symbol,
    pub children: Vec<Symbol>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

impl Production {
    pub fn field_for_child(&self, child_index: usize) -> Option<FieldId> {
        self.fields
            .iter()
            .find(|entry| entry.child_index as usize == child_index)
            .map(|entry| entry.field)
    }
}

/// Actions and gotos for a single automaton state, both sorted by symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseState {
    pub actions: Vec<(Symbol, ParseAction)>,
    pub gotos: Vec<(Symbol, StateId)>,
}

impl ParseState {
    pub fn action(&self, symbol: Symbol) -> Option<ParseAction> {
        self.actions
            .binary_search_by_key(&symbol, |&(s, _)| s)
            .ok()
            .map(|i| self.actions[i].1)
    }

    pub fn goto(&self, symbol: Symbol) -> Option<StateId> {
        self.gotos
            .binary_search_by_key(&symbol, |&(s, _)| s)
            .ok()
            .map(|i| self.gotos[i].1)
    }
}

/// A token definition. Rules are tried together; the longest match wins and
/// ties go to the rule valid in the current state, then to the earlier rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexRule {
    /// Regular expression matched at the current position.
    pub pattern: String,
    /// Token produced, or `None` for text that is skipped as padding.
    pub symbol: Option<Symbol>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl std::fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The complete, serializable description of a language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTable {
    pub name: String,
    pub abi_version: u32,
    pub version: Option<SemanticVersion>,
    /// Indexed by symbol id. Index 0 is the end-of-input symbol.
    pub symbols: Vec<SymbolInfo>,
    /// Indexed by field id minus one.
    pub fields: Vec<String>,
    pub supertypes: Vec<(Symbol, Vec<Symbol>)>,
    pub productions: Vec<Production>,
    /// Indexed by state id. State 0 is the error state and has no actions.
    pub states: Vec<ParseState>,
    pub start_state: StateId,
    pub lex_rules: Vec<LexRule>,
    pub extras: Vec<Symbol>,
}
