//! Backtracking matcher for a single pattern at a single node.
//!
//! Steps are matched against a list of siblings in continuation-passing
//! style: each step calls `k(position, state)` once per way it can match,
//! and a `true` return from a continuation stops the search. Quantifiers are
//! greedy: fewer repetitions are only tried when more produced no solution.

use thicket_core::FieldId;
use thicket_syntax::Node;

use crate::compile::ir::{NodeStep, NodeTest, Step};

pub(crate) type Sibling<'t> = (Option<FieldId>, Node<'t>);

/// Where the next step may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    /// Any later sibling.
    Free,
    /// The next named sibling, or an anonymous one before it.
    Anchored,
    /// Exactly the current position.
    Pinned,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct State<'t> {
    /// `(capture id, node)` in match order.
    pub captures: Vec<(u32, Node<'t>)>,
    pub end: usize,
}

type Cont<'k, 't> = &'k mut dyn FnMut(usize, State<'t>) -> bool;

/// Every distinct way `steps` matches starting at `siblings[index]`.
pub(crate) fn find_matches<'t>(
    steps: &[Step],
    siblings: &[Sibling<'t>],
    index: usize,
) -> Vec<State<'t>> {
    let mut found: Vec<State<'t>> = Vec::new();
    seq(
        steps,
        siblings,
        index,
        Align::Pinned,
        State::default(),
        &mut |pos, state| {
            if pos > index && !found.iter().any(|f| f.captures == state.captures) {
                found.push(state);
            }
            false
        },
    );
    found
}

fn seq<'t>(
    steps: &[Step],
    siblings: &[Sibling<'t>],
    pos: usize,
    align: Align,
    state: State<'t>,
    k: Cont<'_, 't>,
) -> bool {
    let Some((first, rest)) = steps.split_first() else {
        return k(pos, state);
    };

    match first {
        Step::Anchor if rest.is_empty() => {
            let trailing_anonymous = siblings
                .get(pos..)
                .unwrap_or_default()
                .iter()
                .all(|(_, node)| !node.is_named());
            trailing_anonymous && k(pos, state)
        }
        Step::Anchor => {
            let next = if align == Align::Pinned {
                Align::Pinned
            } else {
                Align::Anchored
            };
            seq(rest, siblings, pos, next, state, k)
        }
        Step::Node(step) => {
            for i in candidates(siblings, pos, align) {
                let (field, node) = siblings[i];
                if !accepts(step, field, node) {
                    continue;
                }
                let mut next = state.clone();
                next.captures.extend(step.captures.iter().map(|&id| (id, node)));
                next.end = next.end.max(node.end_byte());

                let stop = if step.children.is_empty() {
                    seq(rest, siblings, i + 1, Align::Free, next, k)
                } else {
                    let children: Vec<_> = node.children_with_fields().collect();
                    seq(
                        &step.children,
                        &children,
                        0,
                        Align::Free,
                        next,
                        &mut |_, inner| seq(rest, siblings, i + 1, Align::Free, inner, k),
                    )
                };
                if stop {
                    return true;
                }
            }
            false
        }
        Step::Alt(branches) => {
            for branch in branches {
                let stop = seq(branch, siblings, pos, align, state.clone(), &mut |p, inner| {
                    seq(rest, siblings, p, Align::Free, inner, k)
                });
                if stop {
                    return true;
                }
            }
            false
        }
        Step::Repeat { body, min, max } => {
            let rep = Repeat {
                body,
                min: *min,
                max: *max,
                rest,
            };
            rep.run(0, siblings, pos, align, state, k)
        }
    }
}

struct Repeat<'s> {
    body: &'s [Step],
    min: u32,
    max: Option<u32>,
    rest: &'s [Step],
}

impl Repeat<'_> {
    fn run<'t>(
        &self,
        count: u32,
        siblings: &[Sibling<'t>],
        pos: usize,
        align: Align,
        state: State<'t>,
        k: Cont<'_, 't>,
    ) -> bool {
        let mut produced = false;
        let mut halted = false;

        if self.max.is_none_or(|max| count < max) {
            seq(self.body, siblings, pos, align, state.clone(), &mut |p, inner| {
                // An iteration that consumes nothing would repeat forever.
                if p <= pos {
                    return false;
                }
                halted = self.run(count + 1, siblings, p, Align::Free, inner, &mut |p2, s2| {
                    produced = true;
                    k(p2, s2)
                });
                halted || produced
            });
        }

        if halted {
            return true;
        }
        if produced || count < self.min {
            return false;
        }
        let align = if count == 0 { align } else { Align::Free };
        seq(self.rest, siblings, pos, align, state, k)
    }
}

fn candidates(siblings: &[Sibling<'_>], pos: usize, align: Align) -> std::ops::Range<usize> {
    let len = siblings.len();
    let pos = pos.min(len);
    match align {
        Align::Free => pos..len,
        Align::Pinned => pos..(pos + 1).min(len),
        Align::Anchored => {
            let end = siblings[pos..]
                .iter()
                .position(|(_, node)| node.is_named())
                .map_or(len, |i| pos + i + 1);
            pos..end
        }
    }
}

fn accepts(step: &NodeStep, field: Option<FieldId>, node: Node<'_>) -> bool {
    let kind = match &step.test {
        NodeTest::Any => true,
        NodeTest::Named => node.is_named(),
        NodeTest::Symbols(symbols) => symbols.contains(&node.kind_id()),
        NodeTest::Error => node.is_error(),
        NodeTest::Missing(kinds) => {
            node.is_missing() && kinds.as_ref().is_none_or(|k| k.contains(&node.kind_id()))
        }
    };
    kind && step.field.is_none_or(|f| field == Some(f))
        && step
            .negated_fields
            .iter()
            .all(|&f| node.child_by_field_id(f).is_none())
}
