//! The LR stack.

use thicket_core::{Length, StateId};

use crate::subtree::Subtree;

#[derive(Clone, Debug)]
pub(crate) struct StackEntry {
    pub state: StateId,
    pub subtree: Subtree,
    /// End of `subtree` in the document.
    pub position: Length,
}

/// States and subtrees pushed so far. The bottom holds the start state and
/// no subtree, so it is kept apart from the entries.
#[derive(Clone, Debug, Default)]
pub(crate) struct Stack {
    start_state: StateId,
    entries: Vec<StackEntry>,
}

impl Stack {
    pub fn new(start_state: StateId) -> Self {
        Self {
            start_state,
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> StateId {
        self.entries.last().map_or(self.start_state, |e| e.state)
    }

    #[inline]
    pub fn position(&self) -> Length {
        self.entries.last().map_or(Length::ZERO, |e| e.position)
    }

    pub fn push(&mut self, state: StateId, subtree: Subtree) {
        let position = self.position() + subtree.total();
        self.entries.push(StackEntry {
            state,
            subtree,
            position,
        });
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn has_error(&self) -> bool {
        self.entries.iter().any(|e| e.subtree.flags.has_error)
    }

    /// States of the structural entries, bottom first. Extras never change
    /// the state, so this is all a reduction needs to see.
    pub fn structural_states(&self) -> Vec<StateId> {
        std::iter::once(self.start_state)
            .chain(
                self.entries
                    .iter()
                    .filter(|e| !e.subtree.flags.extra)
                    .map(|e| e.state),
            )
            .collect()
    }

    /// Removes every entry, returning the subtrees bottom first.
    pub fn drain(&mut self) -> Vec<Subtree> {
        self.entries.drain(..).map(|e| e.subtree).collect()
    }
}
