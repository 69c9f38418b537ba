//! Which steps of a pattern are certain to complete a match once reached.
//!
//! A child step is *definite* when every production of its parent kind has
//! a child it accepts, after the children its preceding siblings accept.
//! A step guarantees the pattern when it is definite and every required
//! step after it is too. Steps inside optional repetitions are not required.
//!
//! Hidden children with a single production are flattened into the parent;
//! any other hidden child is treated as unknown, so the analysis can only
//! err towards "not guaranteed".

use std::collections::HashSet;

use thicket_core::{FieldId, Symbol};

use super::ir::{NodeStep, NodeTest, Step};
use super::structure::Structure;

/// A step's position in the query source and whether reaching it
/// guarantees the rest of its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOffset {
    pub byte_offset: usize,
    pub guaranteed: bool,
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    definite: bool,
    required: bool,
}

/// Analyzes the node steps of one pattern. `offsets` holds each node step's
/// source offset in the order [`super::ir::walk_nodes`] visits them.
pub fn analyze(
    structure: &mut Structure<'_>,
    steps: &[Step],
    offsets: &[usize],
    predicate_captures: &HashSet<u32>,
) -> Vec<StepOffset> {
    let mut marks = Vec::new();
    let mut analysis = Analysis {
        structure,
        predicate_captures,
        marks: &mut marks,
    };
    analysis.sequence(steps, None, true);

    let mut out = Vec::with_capacity(marks.len());
    let mut rest_definite = true;
    for (mark, &byte_offset) in marks.iter().zip(offsets).rev() {
        out.push(StepOffset {
            byte_offset,
            guaranteed: mark.definite && rest_definite,
        });
        rest_definite &= mark.definite || !mark.required;
    }
    out.reverse();
    out
}

struct Analysis<'a, 's> {
    structure: &'a mut Structure<'s>,
    predicate_captures: &'a HashSet<u32>,
    marks: &'a mut Vec<Mark>,
}

impl Analysis<'_, '_> {
    /// Marks `steps` in visiting order. `parent` is set only when the steps
    /// are the plain children of a node whose kinds are known.
    fn sequence(&mut self, steps: &[Step], parent: Option<&[Symbol]>, required: bool) {
        let definite = match parent {
            Some(parents) if is_plain(steps) => self.definite_children(parents, steps),
            _ => vec![false; steps.len()],
        };

        for (step, definite) in steps.iter().zip(definite) {
            match step {
                Step::Node(node) => {
                    let uses_predicate = node.captures.iter().any(|c| self.predicate_captures.contains(c));
                    self.marks.push(Mark {
                        definite: definite && required && !uses_predicate,
                        required,
                    });
                    let kinds = match &node.test {
                        NodeTest::Symbols(symbols) if !symbols.is_empty() => Some(symbols.as_slice()),
                        _ => None,
                    };
                    self.sequence(&node.children, kinds, required);
                }
                Step::Alt(branches) => {
                    for branch in branches {
                        self.sequence(branch, None, required);
                    }
                }
                Step::Repeat { body, min, .. } => self.sequence(body, None, required && *min > 0),
                Step::Anchor => {}
            }
        }
    }

    /// Definiteness of each step in `steps`, which are all plain node steps
    /// or optional repetitions.
    fn definite_children(&mut self, parents: &[Symbol], steps: &[Step]) -> Vec<bool> {
        let mut definite: Vec<bool> = steps
            .iter()
            .map(|step| matches!(step, Step::Node(node) if accepts_known_kinds(node)))
            .collect();

        for &parent in parents {
            let layouts = self.structure.layouts(parent);
            if layouts.is_empty() {
                return vec![false; steps.len()];
            }
            for layout in layouts {
                let mut next = 0;
                let mut lost = false;
                for (step, definite) in steps.iter().zip(definite.iter_mut()) {
                    let Step::Node(node) = step else {
                        continue;
                    };
                    let position = layout[next..]
                        .iter()
                        .position(|&(field, symbol)| fits(node, field, symbol));
                    let found = match position {
                        Some(i) if !lost => {
                            next += i + 1;
                            true
                        }
                        _ => false,
                    };
                    // Once a step may be absent, nothing after it can be placed.
                    lost |= !found;
                    *definite &= found;
                }
            }
        }
        definite
    }
}

/// Only node steps and skippable repetitions, so every node step must match
/// in order.
fn is_plain(steps: &[Step]) -> bool {
    steps.iter().all(|step| match step {
        Step::Node(_) => true,
        Step::Repeat { min, .. } => *min == 0,
        Step::Alt(_) | Step::Anchor => false,
    })
}

fn accepts_known_kinds(node: &NodeStep) -> bool {
    node.negated_fields.is_empty() && matches!(&node.test, NodeTest::Symbols(symbols) if !symbols.is_empty())
}

fn fits(node: &NodeStep, field: Option<FieldId>, symbol: Symbol) -> bool {
    let NodeTest::Symbols(symbols) = &node.test else {
        return false;
    };
    symbols.contains(&symbol) && (node.field.is_none() || node.field == field)
}
