//! Predicates and directives attached to patterns.
//!
//! Text predicates (`#eq?`, `#match?`, `#any-of?` and their variants) are
//! compiled and evaluated by the engine. `#set!`, `#is?` and `#is-not?`
//! become properties. Any other directive is kept verbatim for the caller;
//! any other predicate (a name ending in `?`) is an error.

use regex_automata::Input;
use regex_automata::dfa::{Automaton, StartKind, dense};

/// One raw predicate step. Predicates are flattened into a step list, each
/// one terminated by `Done`; `String` ids index the query's string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateStep {
    Done,
    Capture(u32),
    String(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryPredicateArg {
    Capture(u32),
    String(Box<str>),
}

/// A directive the engine does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryPredicate {
    pub operator: Box<str>,
    pub args: Box<[QueryPredicateArg]>,
}

/// A key/value pair from `#set!`, `#is?` or `#is-not?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryProperty {
    pub key: Box<str>,
    pub value: Option<Box<str>>,
    pub capture_id: Option<u32>,
}

impl QueryProperty {
    pub fn new(key: &str, value: Option<&str>, capture_id: Option<u32>) -> Self {
        Self {
            key: key.into(),
            value: value.map(Into::into),
            capture_id,
        }
    }
}

/// Right-hand side of an equality predicate.
#[derive(Debug, Clone)]
pub enum Operand {
    Capture(u32),
    Text(Box<[u8]>),
}

/// `any-` variants need one node to pass, the others need all nodes to
/// pass. With no nodes, the former fail and the latter hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    All,
    Any,
}

#[derive(Debug, Clone)]
pub enum TextPredicate {
    Eq {
        capture: u32,
        operand: Operand,
        negated: bool,
        quantifier: Quantifier,
    },
    Match {
        capture: u32,
        regex: Regex,
        negated: bool,
        quantifier: Quantifier,
    },
    AnyOf {
        capture: u32,
        values: Vec<Box<[u8]>>,
        negated: bool,
    },
}

/// A compiled `#match?` pattern; matches anywhere in the text.
#[derive(Clone)]
pub struct Regex {
    source: Box<str>,
    dfa: dense::DFA<Vec<u32>>,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, String> {
        let dfa = dense::DFA::builder()
            .configure(
                dense::DFA::config()
                    .start_kind(StartKind::Unanchored)
                    .minimize(true),
            )
            .build(pattern)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            source: pattern.into(),
            dfa,
        })
    }

    /// A search that gives up (e.g. on a quit byte) counts as no match.
    pub fn is_match(&self, text: &[u8]) -> bool {
        matches!(self.dfa.try_search_fwd(&Input::new(text)), Ok(Some(_)))
    }
}

impl std::fmt::Debug for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Regex").field(&self.source).finish()
    }
}

/// How a predicate name is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    Eq { negated: bool, quantifier: Quantifier },
    Match { negated: bool, quantifier: Quantifier },
    AnyOf { negated: bool },
    Set,
    Is { negated: bool },
    /// A directive passed through to the caller.
    General,
}

impl PredicateKind {
    /// Classifies a name written without its leading `#`. `None` means an
    /// unknown predicate.
    pub fn from_name(name: &str) -> Option<Self> {
        use Quantifier::{All, Any};
        Some(match name {
            "eq?" => Self::Eq { negated: false, quantifier: All },
            "not-eq?" => Self::Eq { negated: true, quantifier: All },
            "any-eq?" => Self::Eq { negated: false, quantifier: Any },
            "any-not-eq?" => Self::Eq { negated: true, quantifier: Any },
            "match?" => Self::Match { negated: false, quantifier: All },
            "not-match?" => Self::Match { negated: true, quantifier: All },
            "any-match?" => Self::Match { negated: false, quantifier: Any },
            "any-not-match?" => Self::Match { negated: true, quantifier: Any },
            "any-of?" => Self::AnyOf { negated: false },
            "not-any-of?" => Self::AnyOf { negated: true },
            "set!" => Self::Set,
            "is?" => Self::Is { negated: false },
            "is-not?" => Self::Is { negated: true },
            _ if name.ends_with('?') => return None,
            _ => Self::General,
        })
    }
}

impl TextPredicate {
    /// Evaluates against the texts of the nodes bound to each capture, as
    /// returned by `texts(capture_id)`.
    pub fn holds(&self, texts: &mut dyn FnMut(u32) -> Vec<Vec<u8>>) -> bool {
        match self {
            TextPredicate::Eq {
                capture,
                operand,
                negated,
                quantifier,
            } => {
                let left = texts(*capture);
                let right = match operand {
                    Operand::Capture(other) => texts(*other),
                    Operand::Text(text) => vec![text.to_vec()],
                };
                let pairs = left
                    .iter()
                    .flat_map(|l| right.iter().map(move |r| (l == r) != *negated));
                quantify(*quantifier, pairs)
            }
            TextPredicate::Match {
                capture,
                regex,
                negated,
                quantifier,
            } => {
                let texts = texts(*capture);
                quantify(
                    *quantifier,
                    texts.iter().map(|t| regex.is_match(t) != *negated),
                )
            }
            TextPredicate::AnyOf {
                capture,
                values,
                negated,
            } => texts(*capture)
                .iter()
                .all(|t| values.iter().any(|v| **v == **t) != *negated),
        }
    }
}

fn quantify(quantifier: Quantifier, mut results: impl Iterator<Item = bool>) -> bool {
    match quantifier {
        Quantifier::All => results.all(|ok| ok),
        Quantifier::Any => results.any(|ok| ok),
    }
}
