//! Matcher instructions produced by the compiler.
//!
//! A pattern compiles to a sequence of [`Step`]s matched against a list of
//! siblings. Grouped sequences are spliced into their parent sequence, so a
//! step list is always flat apart from alternations and repetitions.

use thicket_core::{FieldId, Symbol};

/// What kind of node a [`NodeStep`] accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `_`: any node.
    Any,
    /// `(_)`: any named node.
    Named,
    /// A kind, or every concrete subtype of a supertype.
    Symbols(Vec<Symbol>),
    /// `(ERROR)`
    Error,
    /// `(MISSING)`, optionally restricted to some kinds.
    Missing(Option<Vec<Symbol>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStep {
    pub test: NodeTest,
    /// The field the node must sit in, relative to its parent.
    pub field: Option<FieldId>,
    /// Fields the node must not have a child in.
    pub negated_fields: Vec<FieldId>,
    pub children: Vec<Step>,
    /// Capture ids bound to the node, in source order.
    pub captures: Vec<u32>,
}

impl NodeStep {
    pub fn new(test: NodeTest) -> Self {
        Self {
            test,
            field: None,
            negated_fields: Vec::new(),
            children: Vec::new(),
            captures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Node(NodeStep),
    /// Tried in order; each branch is a step sequence.
    Alt(Vec<Vec<Step>>),
    /// `?` is `0..=1`, `*` is `0..`, `+` is `1..`.
    Repeat {
        body: Vec<Step>,
        min: u32,
        max: Option<u32>,
    },
    /// `.`: the neighbouring steps match adjacent named siblings, or the
    /// first/last named child at the edges of a node.
    Anchor,
}

/// Applies `f` to every node step that can come first in `steps`.
///
/// Captures and fields written on an alternation, group or repetition bind
/// to the steps that start it.
pub fn for_each_first_node(steps: &mut [Step], f: &mut impl FnMut(&mut NodeStep)) {
    let Some(first) = steps.iter_mut().find(|s| !matches!(s, Step::Anchor)) else {
        return;
    };
    match first {
        Step::Node(node) => f(node),
        Step::Alt(branches) => {
            for branch in branches {
                for_each_first_node(branch, f);
            }
        }
        Step::Repeat { body, .. } => for_each_first_node(body, f),
        Step::Anchor => {}
    }
}

/// Visits every node step, depth first.
pub fn walk_nodes<'a>(steps: &'a [Step], f: &mut impl FnMut(&'a NodeStep)) {
    for step in steps {
        match step {
            Step::Node(node) => {
                f(node);
                walk_nodes(&node.children, f);
            }
            Step::Alt(branches) => {
                for branch in branches {
                    walk_nodes(branch, f);
                }
            }
            Step::Repeat { body, .. } => walk_nodes(body, f),
            Step::Anchor => {}
        }
    }
}

/// A single node, or an alternation of rooted branches.
pub fn is_rooted(steps: &[Step]) -> bool {
    let mut items = steps.iter().filter(|s| !matches!(s, Step::Anchor));
    let (Some(only), None) = (items.next(), items.next()) else {
        return false;
    };
    match only {
        Step::Node(_) => true,
        Step::Alt(branches) => branches.iter().all(|b| is_rooted(b)),
        Step::Repeat { .. } | Step::Anchor => false,
    }
}
