//! Walks the old tree in document order, offering subtrees for reuse.

use thicket_core::language::{SYMBOL_END, SYMBOL_ERROR};
use thicket_core::{Language, StateId};

use crate::subtree::Subtree;

#[derive(Clone, Debug)]
struct Entry {
    subtree: Subtree,
    child_index: usize,
    /// Where the subtree's padding starts.
    byte_offset: usize,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ReusableNode {
    stack: Vec<Entry>,
}

impl ReusableNode {
    pub fn new(root: Option<&Subtree>) -> Self {
        Self {
            stack: root
                .map(|subtree| Entry {
                    subtree: subtree.clone(),
                    child_index: 0,
                    byte_offset: 0,
                })
                .into_iter()
                .collect(),
        }
    }

    pub fn tree(&self) -> Option<&Subtree> {
        self.stack.last().map(|e| &e.subtree)
    }

    pub fn byte_offset(&self) -> usize {
        self.stack.last().map_or(usize::MAX, |e| e.byte_offset)
    }

    /// Moves past the current subtree to the next one in document order.
    pub fn advance(&mut self) {
        let Some(last) = self.stack.last() else {
            return;
        };
        let byte_offset = last.byte_offset + last.subtree.total().bytes;
        while let Some(popped) = self.stack.pop() {
            let next_index = popped.child_index + 1;
            if let Some(parent) = self.stack.last()
                && let Some(next) = parent.subtree.children.get(next_index)
            {
                let entry = Entry {
                    subtree: next.clone(),
                    child_index: next_index,
                    byte_offset,
                };
                self.stack.push(entry);
                return;
            }
        }
    }

    /// Moves to the current subtree's first child.
    pub fn descend(&mut self) -> bool {
        let Some(last) = self.stack.last() else {
            return false;
        };
        let Some(first) = last.subtree.children.first() else {
            return false;
        };
        let entry = Entry {
            subtree: first.clone(),
            child_index: 0,
            byte_offset: last.byte_offset,
        };
        self.stack.push(entry);
        true
    }

    /// Finds an old subtree starting at `position` that can be shifted in
    /// `state` as is.
    ///
    /// A leaf whose lookahead was edited is only handed back if `relexes_same`
    /// confirms that lexing at `position` yields the same token again.
    pub fn take(
        &mut self,
        position: usize,
        state: StateId,
        language: &Language,
        mut relexes_same: impl FnMut(&Subtree) -> bool,
    ) -> Option<Subtree> {
        while let Some(subtree) = self.tree().cloned() {
            let offset = self.byte_offset();
            if offset > position {
                break;
            }
            let reusable = offset == position
                && is_intact(&subtree)
                && fits_state(&subtree, state, language)
                && (!subtree.flags.lookahead_changed || relexes_same(&subtree));
            if reusable {
                self.advance();
                return Some(subtree);
            }
            let passed = offset + subtree.total().bytes <= position;
            if passed || !self.descend() {
                self.advance();
            }
        }
        None
    }
}

fn is_intact(subtree: &Subtree) -> bool {
    !subtree.flags.has_changes
        && !subtree.flags.has_error
        && !subtree.flags.missing
        && !subtree.size.is_zero()
        && subtree.symbol != SYMBOL_END
        && subtree.symbol != SYMBOL_ERROR
}

fn fits_state(subtree: &Subtree, state: StateId, language: &Language) -> bool {
    if subtree.is_leaf() {
        if subtree.lex_ambiguous_in_other_state(state) {
            return false;
        }
        subtree.flags.extra || language.action(state, subtree.symbol).is_some()
    } else {
        !subtree.flags.extra
            && subtree.parse_state == state
            && language.goto(state, subtree.symbol).is_some()
    }
}

impl Subtree {
    /// A token whose rule was chosen by the lex state cannot move to
    /// another state unchecked.
    fn lex_ambiguous_in_other_state(&self, state: StateId) -> bool {
        self.flags.lex_ambiguous && self.parse_state != state
    }
}
