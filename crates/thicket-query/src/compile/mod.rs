//! Lowers parsed queries into matcher steps.
//!
//! Compilation runs in three passes over each top-level pattern:
//!
//! 1. Lowering resolves kind and field names against the language and
//!    flattens groups into step sequences.
//! 2. Structure checks reject children and fields the parent kind can never
//!    have, according to the language's productions.
//! 3. Predicates are validated, recorded as raw steps, and the built-in text
//!    predicates are compiled.
//!
//! Syntax errors stop compilation before any of this runs, since the tree
//! may be missing the pieces the semantic passes look at.

pub(crate) mod guarantee;
pub mod ir;
pub mod predicate;
pub mod quantifier;
mod structure;

#[cfg(test)]
mod guarantee_tests;

use std::collections::HashSet;

use indexmap::IndexSet;
use rowan::TextRange;
use thicket_core::{
    FieldId, Interner, LANGUAGE_VERSION, Language, MIN_COMPATIBLE_LANGUAGE_VERSION,
    SYMBOL_ERROR, Symbol,
};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::QueryError;
use crate::parser::{
    self, Capture, Expr, Parser, Predicate, PredicateArg, SyntaxKind, Tree, TreeHead,
};

use guarantee::StepOffset;
use ir::{NodeStep, NodeTest, Step};
use predicate::{
    Operand, PredicateKind, PredicateStep, QueryPredicate, QueryPredicateArg, QueryProperty,
    Regex, TextPredicate,
};
use quantifier::CaptureQuantifier;
use structure::Structure;

/// One compiled top-level pattern.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    pub steps: Vec<Step>,
    pub predicate_steps: Vec<PredicateStep>,
    pub text_predicates: Vec<TextPredicate>,
    pub property_settings: Vec<QueryProperty>,
    /// `#is?` / `#is-not?`; the flag is true for `#is?`.
    pub property_predicates: Vec<(QueryProperty, bool)>,
    pub general_predicates: Vec<QueryPredicate>,
    pub capture_quantifiers: Vec<CaptureQuantifier>,
    pub start_byte: usize,
    pub end_byte: usize,
    pub rooted: bool,
    pub non_local: bool,
    /// Node steps in visiting order.
    pub step_offsets: Vec<StepOffset>,
}

#[derive(Debug)]
pub(crate) struct Compiled {
    pub patterns: Vec<Pattern>,
    pub captures: Interner,
    pub strings: Interner,
}

pub(crate) fn compile(
    language: &Language,
    source: &str,
    recursion_fuel: u32,
) -> Result<Compiled, QueryError> {
    let parser = Parser::new(source, parser::lexer::lex(source)).with_recursion_fuel(recursion_fuel);
    let (parse, diagnostics) = parser::parse_with_parser(parser);
    if let Some(err) = QueryError::from_diagnostics(source, diagnostics) {
        return Err(err);
    }

    let mut compiler = Compiler::new(language);
    if compiler.check_language() {
        for expr in parse.root().exprs() {
            if !matches!(expr, Expr::Predicate(_)) {
                compiler.pattern(&expr);
            }
        }
    }

    let diagnostics = std::mem::take(&mut compiler.diagnostics);
    if let Some(err) = QueryError::from_diagnostics(source, diagnostics) {
        return Err(err);
    }

    let capture_count = compiler.captures.len();
    for pattern in &mut compiler.patterns {
        pattern.capture_quantifiers =
            quantifier::capture_quantifiers(&pattern.steps, capture_count);
    }

    tracing::debug!(
        patterns = compiler.patterns.len(),
        captures = capture_count,
        strings = compiler.strings.len(),
        "compiled query"
    );

    Ok(Compiled {
        patterns: compiler.patterns,
        captures: compiler.captures,
        strings: compiler.strings,
    })
}

/// Capture names bound anywhere inside `expr`, in source order.
pub fn capture_names(expr: &Expr) -> IndexSet<String> {
    expr.as_cst()
        .descendants()
        .filter_map(Capture::cast)
        .filter_map(|c| c.name())
        .map(|t| t.text().to_string())
        .collect()
}

struct Compiler<'a> {
    language: &'a Language,
    diagnostics: Diagnostics,
    captures: Interner,
    strings: Interner,
    structure: Structure<'a>,
    patterns: Vec<Pattern>,
    /// Source offset of each node step lowered for the current pattern.
    node_offsets: Vec<usize>,
}

/// A predicate argument after name resolution.
enum Arg {
    Capture(u32),
    Text(String),
}

impl<'a> Compiler<'a> {
    fn new(language: &'a Language) -> Self {
        Self {
            language,
            diagnostics: Diagnostics::new(),
            captures: Interner::new(),
            strings: Interner::new(),
            structure: Structure::new(language),
            patterns: Vec::new(),
            node_offsets: Vec::new(),
        }
    }

    fn check_language(&mut self) -> bool {
        let version = self.language.abi_version();
        if (MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
            return true;
        }
        self.diagnostics
            .report(DiagnosticKind::IncompatibleLanguage, TextRange::empty(0.into()))
            .message(format!(
                "language ABI {version} is outside {MIN_COMPATIBLE_LANGUAGE_VERSION}..={LANGUAGE_VERSION}"
            ))
            .emit();
        false
    }

    fn pattern(&mut self, expr: &Expr) {
        self.node_offsets.clear();
        let steps = self.lower(expr);
        let range = expr.text_range();
        let rooted = ir::is_rooted(&steps);
        let mut pattern = Pattern {
            steps,
            predicate_steps: Vec::new(),
            text_predicates: Vec::new(),
            property_settings: Vec::new(),
            property_predicates: Vec::new(),
            general_predicates: Vec::new(),
            capture_quantifiers: Vec::new(),
            start_byte: range.start().into(),
            end_byte: range.end().into(),
            rooted,
            non_local: !rooted,
            step_offsets: Vec::new(),
        };

        let defined = capture_names(expr);
        for predicate in expr.as_cst().descendants().filter_map(Predicate::cast) {
            self.predicate(&predicate, &defined, &mut pattern);
        }

        let predicate_captures: HashSet<u32> = pattern
            .predicate_steps
            .iter()
            .filter_map(|step| match step {
                PredicateStep::Capture(id) => Some(*id),
                _ => None,
            })
            .collect();
        pattern.step_offsets = guarantee::analyze(
            &mut self.structure,
            &pattern.steps,
            &self.node_offsets,
            &predicate_captures,
        );
        self.patterns.push(pattern);
    }

    fn lower(&mut self, expr: &Expr) -> Vec<Step> {
        match expr {
            Expr::Tree(tree) => self.lower_tree(tree),
            Expr::Str(s) => {
                let value = s.value();
                let test = match self.language.symbol_for_name(&value, false) {
                    Some(symbol) => NodeTest::Symbols(vec![symbol]),
                    None => {
                        self.diagnostics
                            .report(DiagnosticKind::UnknownNodeType, s.text_range())
                            .message(format!("\"{value}\""))
                            .emit();
                        NodeTest::Symbols(Vec::new())
                    }
                };
                self.node_offsets.push(s.text_range().start().into());
                vec![Step::Node(NodeStep::new(test))]
            }
            Expr::Wildcard(wildcard) => {
                self.node_offsets.push(wildcard.text_range().start().into());
                vec![Step::Node(NodeStep::new(NodeTest::Any))]
            }
            Expr::Alt(alt) => {
                let branches = alt.branches().map(|b| self.lower(&b)).collect();
                vec![Step::Alt(branches)]
            }
            Expr::Group(group) => self.lower_sequence(group.children()),
            Expr::Field(field) => {
                let mut steps = field.value().map(|v| self.lower(&v)).unwrap_or_default();
                if let Some(id) = field.name().and_then(|t| self.field(t.text(), t.text_range())) {
                    ir::for_each_first_node(&mut steps, &mut |node| node.field = Some(id));
                }
                steps
            }
            Expr::Capture(capture) => {
                let mut steps = capture.inner().map(|e| self.lower(&e)).unwrap_or_default();
                if let Some(name) = capture.name() {
                    let id = self.captures.intern(name.text()).as_u32();
                    ir::for_each_first_node(&mut steps, &mut |node| node.captures.push(id));
                }
                steps
            }
            Expr::Quantifier(q) => {
                let body = q.inner().map(|e| self.lower(&e)).unwrap_or_default();
                let (min, max) = match q.operator().map(|t| t.kind()) {
                    Some(SyntaxKind::Question) => (0, Some(1)),
                    Some(SyntaxKind::Star) => (0, None),
                    Some(SyntaxKind::Plus) => (1, None),
                    _ => return body,
                };
                vec![Step::Repeat { body, min, max }]
            }
            Expr::Anchor(_) => vec![Step::Anchor],
            // Negated fields only mean something on their parent node;
            // predicates are collected per pattern.
            Expr::NegatedField(_) | Expr::Predicate(_) => Vec::new(),
        }
    }

    fn lower_sequence(&mut self, exprs: impl Iterator<Item = Expr>) -> Vec<Step> {
        let mut steps = Vec::new();
        for expr in exprs {
            steps.extend(self.lower(&expr));
        }
        steps
    }

    fn lower_tree(&mut self, tree: &Tree) -> Vec<Step> {
        let Some(head) = tree.head() else {
            return Vec::new();
        };

        let test = match head {
            TreeHead::Wildcard => match tree.argument().filter(|_| tree.has_slash()) {
                Some(sub) => self.kind(&sub.text, sub.named, sub.range),
                None => NodeTest::Named,
            },
            TreeHead::Error => NodeTest::Error,
            TreeHead::Missing => NodeTest::Missing(tree.argument().map(|arg| {
                match self.kind(&arg.text, arg.named, arg.range) {
                    NodeTest::Symbols(symbols) => symbols,
                    _ => Vec::new(),
                }
            })),
            TreeHead::Kind(token) => {
                let test = self.kind(token.text(), true, token.text_range());
                match tree.argument().filter(|_| tree.has_slash()) {
                    Some(sub) => self.subtype(token.text(), &test, &sub),
                    None => test,
                }
            }
        };

        self.node_offsets.push(tree.text_range().start().into());
        let mut node = NodeStep::new(test);
        let parents = match &node.test {
            NodeTest::Symbols(symbols) => symbols.clone(),
            _ => Vec::new(),
        };

        for child in tree.children() {
            match &child {
                Expr::NegatedField(negated) => {
                    if let Some(id) = negated
                        .name()
                        .and_then(|t| self.field(t.text(), t.text_range()))
                    {
                        node.negated_fields.push(id);
                    }
                }
                Expr::Predicate(_) => {}
                _ => {
                    let steps = self.lower(&child);
                    if !parents.is_empty() {
                        self.check_children(&parents, &steps, child.text_range());
                    }
                    node.children.extend(steps);
                }
            }
        }

        vec![Step::Node(node)]
    }

    /// Resolves a kind name. Supertypes stand for all of their concrete
    /// subtypes.
    fn kind(&mut self, name: &str, named: bool, range: TextRange) -> NodeTest {
        match self.language.symbol_for_name(name, named) {
            Some(SYMBOL_ERROR) if named => NodeTest::Error,
            Some(symbol) => NodeTest::Symbols(self.structure.concrete_kinds(symbol)),
            None => {
                let shown = if named {
                    name.to_string()
                } else {
                    format!("\"{name}\"")
                };
                self.diagnostics
                    .report(DiagnosticKind::UnknownNodeType, range)
                    .message(shown)
                    .emit();
                NodeTest::Symbols(Vec::new())
            }
        }
    }

    /// `(supertype/subtype)` matches the subtype; the supertype only has to
    /// contain it.
    fn subtype(&mut self, super_name: &str, supertype: &NodeTest, sub: &parser::KindName) -> NodeTest {
        let test = self.kind(&sub.text, sub.named, sub.range);
        let (NodeTest::Symbols(supers), NodeTest::Symbols(subs)) = (supertype, &test) else {
            return test;
        };
        if supers.is_empty() || subs.is_empty() {
            return test;
        }

        let super_symbol = self.language.symbol_for_name(super_name, true);
        let contained = subs.iter().all(|&s| {
            super_symbol.is_some_and(|sup| self.structure.is_subtype(sup, s)) || supers.contains(&s)
        });
        if !contained {
            self.diagnostics
                .report(DiagnosticKind::NotASupertype, sub.range)
                .message(format!("`{}` is not a subtype of `{super_name}`", sub.text))
                .emit();
        }
        test
    }

    fn field(&mut self, name: &str, range: TextRange) -> Option<FieldId> {
        let id = self.language.field_id_for_name(name);
        if id.is_none() {
            self.diagnostics
                .report(DiagnosticKind::UnknownField, range)
                .message(name)
                .emit();
        }
        id
    }

    fn check_children(&mut self, parents: &[Symbol], steps: &[Step], range: TextRange) {
        let mut nodes = Vec::new();
        sibling_nodes(steps, &mut |node| nodes.push(node));
        for node in nodes {
            if !self.check_child(parents, node, range) {
                // One report per written child is enough.
                return;
            }
        }
    }

    fn check_child(&mut self, parents: &[Symbol], child: &NodeStep, range: TextRange) -> bool {
        let language = self.language;

        if let Some(field) = child.field
            && !parents
                .iter()
                .any(|&p| self.structure.children_of(p).has_field(field))
        {
            let name = language.field_name_for_id(field).unwrap_or_default();
            self.diagnostics
                .report(DiagnosticKind::FieldNotOnNodeType, range)
                .message(name)
                .emit();
            return false;
        }

        let kinds: &[Symbol] = match &child.test {
            NodeTest::Symbols(symbols) => symbols,
            NodeTest::Missing(Some(symbols)) => symbols,
            NodeTest::Any | NodeTest::Named | NodeTest::Error | NodeTest::Missing(None) => {
                return true;
            }
        };
        if kinds.is_empty() || kinds.iter().any(|&k| self.structure.always_allowed(k)) {
            return true;
        }

        let allowed = parents.iter().any(|&p| {
            let set = self.structure.children_of(p);
            kinds.iter().any(|&k| set.allows(child.field, k))
        });
        if allowed {
            return true;
        }

        let name = language.symbol_name(kinds[0]).unwrap_or_default();
        let kind = if child.field.is_some() {
            DiagnosticKind::InvalidFieldChildType
        } else {
            DiagnosticKind::InvalidChildType
        };
        self.diagnostics.report(kind, range).message(name).emit();
        false
    }

    fn predicate(&mut self, predicate: &Predicate, defined: &IndexSet<String>, pattern: &mut Pattern) {
        let Some(name_token) = predicate.name() else {
            return;
        };
        let name = name_token.text().trim_start_matches('#');
        let name_range = name_token.text_range();

        let mut args = Vec::new();
        let mut resolved = true;
        for arg in predicate.args() {
            match arg {
                PredicateArg::Capture(capture) => {
                    let Some(token) = capture.name() else {
                        resolved = false;
                        continue;
                    };
                    let capture_name = token.text();
                    match self.captures.get(capture_name) {
                        Some(id) if defined.contains(capture_name) => {
                            args.push((Arg::Capture(id.as_u32()), capture.text_range()));
                        }
                        _ => {
                            self.diagnostics
                                .report(DiagnosticKind::UnknownCapture, capture.text_range())
                                .message(capture_name)
                                .emit();
                            resolved = false;
                        }
                    }
                }
                PredicateArg::Str(s) => args.push((Arg::Text(s.value()), s.text_range())),
                PredicateArg::Id(token) => {
                    args.push((Arg::Text(token.text().to_string()), token.text_range()));
                }
            }
        }

        let Some(kind) = PredicateKind::from_name(name) else {
            self.diagnostics
                .report(DiagnosticKind::UnknownPredicate, name_range)
                .message(name)
                .emit();
            return;
        };
        if !resolved {
            return;
        }

        pattern
            .predicate_steps
            .push(PredicateStep::String(self.strings.intern(name).as_u32()));
        for (arg, _) in &args {
            pattern.predicate_steps.push(match arg {
                Arg::Capture(id) => PredicateStep::Capture(*id),
                Arg::Text(text) => PredicateStep::String(self.strings.intern(text).as_u32()),
            });
        }
        pattern.predicate_steps.push(PredicateStep::Done);

        match kind {
            PredicateKind::Eq {
                negated,
                quantifier,
            } => match args.as_slice() {
                [(Arg::Capture(capture), _), (other, _)] => {
                    let operand = match other {
                        Arg::Capture(id) => Operand::Capture(*id),
                        Arg::Text(text) => Operand::Text(text.as_bytes().into()),
                    };
                    pattern.text_predicates.push(TextPredicate::Eq {
                        capture: *capture,
                        operand,
                        negated,
                        quantifier,
                    });
                }
                _ => self.invalid_arguments(
                    name,
                    "a capture and a string or capture",
                    predicate.text_range(),
                ),
            },
            PredicateKind::Match {
                negated,
                quantifier,
            } => match args.as_slice() {
                [(Arg::Capture(capture), _), (Arg::Text(pattern_text), range)] => {
                    match Regex::new(pattern_text) {
                        Ok(regex) => pattern.text_predicates.push(TextPredicate::Match {
                            capture: *capture,
                            regex,
                            negated,
                            quantifier,
                        }),
                        Err(err) => self
                            .diagnostics
                            .report(DiagnosticKind::InvalidRegex, *range)
                            .message(err)
                            .emit(),
                    }
                }
                _ => self.invalid_arguments(name, "a capture and a string", predicate.text_range()),
            },
            PredicateKind::AnyOf { negated } => match args.split_first() {
                Some(((Arg::Capture(capture), _), rest))
                    if !rest.is_empty() && rest.iter().all(|(a, _)| matches!(a, Arg::Text(_))) =>
                {
                    let values = rest
                        .iter()
                        .filter_map(|(a, _)| match a {
                            Arg::Text(text) => Some(text.as_bytes().into()),
                            Arg::Capture(_) => None,
                        })
                        .collect();
                    pattern.text_predicates.push(TextPredicate::AnyOf {
                        capture: *capture,
                        values,
                        negated,
                    });
                }
                _ => self.invalid_arguments(
                    name,
                    "a capture followed by one or more strings",
                    predicate.text_range(),
                ),
            },
            PredicateKind::Set => match property(&args) {
                Some(property) => pattern.property_settings.push(property),
                None => self.invalid_arguments(
                    name,
                    "an optional capture, a key and an optional value",
                    predicate.text_range(),
                ),
            },
            PredicateKind::Is { negated } => match property(&args) {
                Some(property) => pattern.property_predicates.push((property, !negated)),
                None => self.invalid_arguments(
                    name,
                    "an optional capture, a key and an optional value",
                    predicate.text_range(),
                ),
            },
            PredicateKind::General => {
                let args = args
                    .into_iter()
                    .map(|(arg, _)| match arg {
                        Arg::Capture(id) => QueryPredicateArg::Capture(id),
                        Arg::Text(text) => QueryPredicateArg::String(text.into()),
                    })
                    .collect();
                pattern.general_predicates.push(QueryPredicate {
                    operator: name.into(),
                    args,
                });
            }
        }
    }

    fn invalid_arguments(&mut self, name: &str, expected: &str, range: TextRange) {
        self.diagnostics
            .report(DiagnosticKind::InvalidPredicateArguments, range)
            .message(format!("`#{name}` takes {expected}"))
            .emit();
    }
}

/// `[@capture] key [value]`
fn property(args: &[(Arg, TextRange)]) -> Option<QueryProperty> {
    let (capture, rest) = match args.split_first() {
        Some(((Arg::Capture(id), _), rest)) => (Some(*id), rest),
        _ => (None, args),
    };
    match rest {
        [(Arg::Text(key), _)] => Some(QueryProperty::new(key, None, capture)),
        [(Arg::Text(key), _), (Arg::Text(value), _)] => {
            Some(QueryProperty::new(key, Some(value), capture))
        }
        _ => None,
    }
}

/// Node steps that match siblings at this level, looking through
/// alternations and repetitions but not into children.
fn sibling_nodes<'s>(steps: &'s [Step], f: &mut impl FnMut(&'s NodeStep)) {
    for step in steps {
        match step {
            Step::Node(node) => f(node),
            Step::Alt(branches) => {
                for branch in branches {
                    sibling_nodes(branch, f);
                }
            }
            Step::Repeat { body, .. } => sibling_nodes(body, f),
            Step::Anchor => {}
        }
    }
}
