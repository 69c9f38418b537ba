use thicket_core::{Interner, Language};

use crate::compile::predicate::{PredicateStep, QueryPredicate, QueryProperty};
use crate::compile::quantifier::CaptureQuantifier;
use crate::compile::{self, Pattern};
use crate::error::QueryError;

/// A compiled set of patterns.
///
/// Immutable apart from disabling captures and patterns, and independent of
/// any tree: one query can be run against many trees, from many threads.
///
/// Pattern-indexed accessors panic when the index is out of range.
#[derive(Debug, Clone)]
pub struct Query {
    patterns: Vec<Pattern>,
    captures: Interner,
    strings: Interner,
    disabled_captures: Vec<bool>,
    disabled_patterns: Vec<bool>,
}

/// Configures query compilation.
///
/// ```
/// use thicket_query::QueryBuilder;
///
/// let language = thicket_langs::arithmetic();
/// let query = QueryBuilder::new(&language)
///     .recursion_fuel(64)
///     .build("(expression left: (number) @lhs)")
///     .expect("valid query");
/// assert_eq!(query.capture_names().collect::<Vec<_>>(), ["lhs"]);
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<'l> {
    language: &'l Language,
    recursion_fuel: u32,
}

impl<'l> QueryBuilder<'l> {
    pub fn new(language: &'l Language) -> Self {
        Self {
            language,
            recursion_fuel: crate::DEFAULT_RECURSION_FUEL,
        }
    }

    /// Maximum pattern nesting depth accepted by the query parser.
    pub fn recursion_fuel(mut self, fuel: u32) -> Self {
        self.recursion_fuel = fuel;
        self
    }

    pub fn build(self, source: &str) -> Result<Query, QueryError> {
        let compiled = compile::compile(self.language, source, self.recursion_fuel)?;
        Ok(Query {
            disabled_captures: vec![false; compiled.captures.len()],
            disabled_patterns: vec![false; compiled.patterns.len()],
            patterns: compiled.patterns,
            captures: compiled.captures,
            strings: compiled.strings,
        })
    }
}

impl Query {
    /// Compiles `source` for `language` with default settings.
    pub fn new(language: &Language, source: &str) -> Result<Self, QueryError> {
        QueryBuilder::new(language).build(source)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Capture names in id order.
    pub fn capture_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.captures.strings()
    }

    pub fn capture_name(&self, index: u32) -> Option<&str> {
        self.captures.try_resolve(index)
    }

    pub fn capture_index_for_name(&self, name: &str) -> Option<u32> {
        self.captures.get(name).map(|id| id.as_u32())
    }

    /// How many nodes each capture binds in a match of `pattern`, indexed
    /// by capture id.
    pub fn capture_quantifiers(&self, pattern: usize) -> &[CaptureQuantifier] {
        &self.patterns[pattern].capture_quantifiers
    }

    /// Number of distinct predicate strings, operator names included.
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn string_value(&self, id: u32) -> Option<&str> {
        self.strings.try_resolve(id)
    }

    pub fn start_byte_for_pattern(&self, pattern: usize) -> usize {
        self.patterns[pattern].start_byte
    }

    pub fn end_byte_for_pattern(&self, pattern: usize) -> usize {
        self.patterns[pattern].end_byte
    }

    /// Raw predicate steps: each predicate is its operator string, then its
    /// arguments, then [`PredicateStep::Done`].
    pub fn predicates_for_pattern(&self, pattern: usize) -> &[PredicateStep] {
        &self.patterns[pattern].predicate_steps
    }

    /// Directives the engine does not evaluate.
    pub fn general_predicates(&self, pattern: usize) -> &[QueryPredicate] {
        &self.patterns[pattern].general_predicates
    }

    pub fn property_settings(&self, pattern: usize) -> &[QueryProperty] {
        &self.patterns[pattern].property_settings
    }

    /// `#is?` and `#is-not?` properties; the flag is `true` for `#is?`.
    pub fn property_predicates(&self, pattern: usize) -> &[(QueryProperty, bool)] {
        &self.patterns[pattern].property_predicates
    }

    /// Whether the pattern matches a single node at its top level.
    pub fn is_pattern_rooted(&self, pattern: usize) -> bool {
        self.patterns[pattern].rooted
    }

    /// Whether the pattern matches a sequence of siblings, so an edit to one
    /// sibling can change matches that start at another.
    pub fn is_pattern_non_local(&self, pattern: usize) -> bool {
        self.patterns[pattern].non_local
    }

    /// Whether reaching the step written at `byte_offset` in the query
    /// source means the rest of its pattern is certain to match, judged from
    /// the language's productions. Offsets between steps refer to the step
    /// before them.
    pub fn is_pattern_guaranteed_at_step(&self, byte_offset: usize) -> bool {
        self.patterns
            .iter()
            .flat_map(|p| &p.step_offsets)
            .take_while(|step| step.byte_offset <= byte_offset)
            .last()
            .is_some_and(|step| step.guaranteed)
    }

    /// Drops the capture from every match. The nodes are still matched.
    pub fn disable_capture(&mut self, name: &str) {
        if let Some(id) = self.captures.get(name) {
            self.disabled_captures[id.as_usize()] = true;
        }
    }

    /// Stops the pattern from matching at all.
    pub fn disable_pattern(&mut self, pattern: usize) {
        if let Some(disabled) = self.disabled_patterns.get_mut(pattern) {
            *disabled = true;
        }
    }

    pub(crate) fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub(crate) fn is_capture_disabled(&self, id: u32) -> bool {
        self.disabled_captures.get(id as usize).copied().unwrap_or(false)
    }

    pub(crate) fn is_pattern_disabled(&self, pattern: usize) -> bool {
        self.disabled_patterns[pattern]
    }
}
