//! Immutable, shareable syntax tree nodes.
//!
//! A [`Subtree`] stores sizes rather than positions: its `padding` (the
//! skipped text before it) and its `size`. Absolute positions are computed
//! while descending, which lets unchanged subtrees be shared between
//! successive trees and lets an edit rewrite only the path down to it.

use std::sync::Arc;

use thicket_core::language::{SYMBOL_END, SYMBOL_ERROR};
use thicket_core::{Language, Length, StateId, Symbol};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Flags {
    pub visible: bool,
    pub named: bool,
    pub extra: bool,
    pub missing: bool,
    pub leaf: bool,
    pub has_changes: bool,
    /// An edit reached the bytes this leaf's lexer examined past its end
    /// but left the leaf's own text alone.
    pub lookahead_changed: bool,
    pub has_error: bool,
    /// More than one token rule matched this text.
    pub lex_ambiguous: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct SubtreeData {
    pub symbol: Symbol,
    pub padding: Length,
    pub size: Length,
    /// Bytes past the end the lexer examined while producing this subtree.
    pub lookahead_bytes: usize,
    /// State the subtree was lexed in (leaves) or pushed onto (nodes).
    pub parse_state: StateId,
    pub flags: Flags,
    pub production: Option<u16>,
    pub children: Vec<Subtree>,
    pub visible_child_count: usize,
    pub named_child_count: usize,
    pub visible_descendant_count: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct Subtree(Arc<SubtreeData>);

impl std::ops::Deref for Subtree {
    type Target = SubtreeData;

    #[inline]
    fn deref(&self) -> &SubtreeData {
        &self.0
    }
}

/// An edit expressed relative to the start of the subtree it is applied to.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SubtreeEdit {
    pub start: Length,
    pub old_end: Length,
    pub new_end: Length,
}

pub(crate) struct LeafSpec {
    pub symbol: Symbol,
    pub padding: Length,
    pub size: Length,
    pub lookahead_bytes: usize,
    pub parse_state: StateId,
    pub lex_ambiguous: bool,
}

impl Subtree {
    pub fn leaf(spec: LeafSpec, language: &Language) -> Self {
        let metadata = language.symbol_metadata(spec.symbol);
        let is_error = spec.symbol == SYMBOL_ERROR;
        Subtree(Arc::new(SubtreeData {
            symbol: spec.symbol,
            padding: spec.padding,
            size: spec.size,
            lookahead_bytes: spec.lookahead_bytes,
            parse_state: spec.parse_state,
            flags: Flags {
                visible: metadata.visible,
                named: metadata.named,
                extra: spec.symbol == SYMBOL_END,
                leaf: true,
                has_error: is_error,
                lex_ambiguous: spec.lex_ambiguous,
                ..Flags::default()
            },
            production: None,
            children: Vec::new(),
            visible_child_count: 0,
            named_child_count: 0,
            visible_descendant_count: 0,
        }))
    }

    /// A zero-width token the parser inserted to recover from an error.
    pub fn missing_leaf(symbol: Symbol, padding: Length, parse_state: StateId, language: &Language) -> Self {
        let mut subtree = Self::leaf(
            LeafSpec {
                symbol,
                padding,
                size: Length::ZERO,
                lookahead_bytes: 0,
                parse_state,
                lex_ambiguous: false,
            },
            language,
        );
        let data = subtree.data_mut();
        data.flags.missing = true;
        data.flags.has_error = true;
        subtree
    }

    /// An interior node summarizing `children`.
    pub fn node(
        symbol: Symbol,
        children: Vec<Subtree>,
        production: Option<u16>,
        parse_state: StateId,
        language: &Language,
    ) -> Self {
        let metadata = language.symbol_metadata(symbol);
        let mut data = SubtreeData {
            symbol,
            padding: Length::ZERO,
            size: Length::ZERO,
            lookahead_bytes: 0,
            parse_state,
            flags: Flags {
                visible: metadata.visible,
                named: metadata.named,
                has_error: symbol == SYMBOL_ERROR,
                ..Flags::default()
            },
            production,
            children,
            visible_child_count: 0,
            named_child_count: 0,
            visible_descendant_count: 0,
        };
        data.summarize();
        Subtree(Arc::new(data))
    }

    /// An ERROR node wrapping skipped input. It is an extra so reductions
    /// treat it like a comment.
    pub fn error_node(children: Vec<Subtree>, parse_state: StateId, language: &Language) -> Self {
        let mut subtree = Self::node(SYMBOL_ERROR, children, None, parse_state, language);
        subtree.data_mut().flags.extra = true;
        subtree
    }

    /// Mutable access, copying the node if it is shared.
    #[inline]
    pub fn data_mut(&mut self) -> &mut SubtreeData {
        Arc::make_mut(&mut self.0)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Subtree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Stable identity for the lifetime of the allocation.
    #[inline]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn set_extra(&mut self) {
        if !self.flags.extra {
            self.data_mut().flags.extra = true;
        }
    }

    /// Applies an edit whose coordinates are relative to this subtree's
    /// padding start, marking everything it touches as changed.
    pub fn edit(&mut self, edit: SubtreeEdit) {
        let mut pending = vec![(self, edit)];
        while let Some((subtree, edit)) = pending.pop() {
            let total = subtree.padding + subtree.size;
            let padding = subtree.padding;
            let mut pure_insertion = edit.old_end.bytes == edit.start.bytes;
            let data = subtree.data_mut();

            let touched = if edit.old_end.bytes <= padding.bytes {
                // The edit lies entirely within the padding.
                data.padding = edit.new_end + (padding - edit.old_end);
                true
            } else if edit.start.bytes < padding.bytes {
                // The edit starts in the padding and eats into the content.
                data.size = data.size - (edit.old_end - padding);
                data.padding = edit.new_end;
                true
            } else if edit.start.bytes < total.bytes
                || (edit.start.bytes == total.bytes && pure_insertion)
            {
                data.size = (edit.new_end - padding) + (total - edit.old_end);
                true
            } else {
                false
            };

            if touched || !data.flags.leaf {
                data.flags.has_changes = true;
            } else {
                data.flags.lookahead_changed = true;
            }

            let mut edit = edit;
            let mut child_right = Length::ZERO;
            for (i, child) in data.children.iter_mut().enumerate() {
                let child_total = child.total();
                let child_left = child_right;
                child_right = child_left + child_total;

                if child_right.bytes + child.lookahead_bytes < edit.start.bytes {
                    continue;
                }
                if child_left.bytes > edit.old_end.bytes
                    || (child_left.bytes == edit.old_end.bytes && child_total.bytes > 0 && i > 0)
                {
                    break;
                }

                let child_edit = SubtreeEdit {
                    start: saturating_sub(edit.start, child_left),
                    old_end: saturating_sub(edit.old_end, child_left),
                    new_end: saturating_sub(edit.new_end, child_left),
                };

                // Inserted text belongs to the first child that touches the edit;
                // later children only shrink.
                if child_right.bytes > edit.start.bytes
                    || (child_right.bytes == edit.start.bytes && pure_insertion)
                {
                    edit.new_end = edit.start;
                    pure_insertion = false;
                }

                pending.push((child, child_edit));
            }
        }
    }
}

fn saturating_sub(a: Length, b: Length) -> Length {
    if a.bytes <= b.bytes {
        Length::ZERO
    } else {
        a - b
    }
}

impl SubtreeData {
    #[inline]
    pub fn total(&self) -> Length {
        self.padding + self.size
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.flags.leaf
    }

    fn summarize(&mut self) {
        let Some(first) = self.children.first() else {
            return;
        };
        self.padding = first.padding;

        let mut offset = Length::ZERO;
        let mut reach = 0;
        self.visible_child_count = 0;
        self.named_child_count = 0;
        self.visible_descendant_count = 0;

        for child in &self.children {
            offset = offset + child.total();
            reach = reach.max(offset.bytes + child.lookahead_bytes);

            if child.flags.visible {
                self.visible_child_count += 1;
                if child.flags.named {
                    self.named_child_count += 1;
                }
                self.visible_descendant_count += 1;
            } else {
                self.visible_child_count += child.visible_child_count;
                self.named_child_count += child.named_child_count;
            }
            self.visible_descendant_count += child.visible_descendant_count;
            self.flags.has_error |= child.flags.has_error;
        }

        self.size = offset - self.padding;
        self.lookahead_bytes = reach - offset.bytes;
    }
}

impl Drop for SubtreeData {
    /// Frees uniquely owned descendants from a worklist so that dropping a
    /// deeply nested tree does not recurse once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if let Ok(mut data) = Arc::try_unwrap(child.0) {
                pending.append(&mut data.children);
            }
        }
    }
}
