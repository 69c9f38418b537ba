//! Parsed syntax trees.

use std::fmt;

use thicket_core::{InputEdit, Language, Length, Point, Range};

use crate::changed_ranges;
use crate::cursor::TreeCursor;
use crate::node::Node;
use crate::subtree::{Subtree, SubtreeEdit};

/// The result of a parse.
///
/// Trees are immutable apart from [`Tree::edit`]. Cloning is cheap and the
/// clones share structure, so a tree can be handed to other threads while a
/// copy is edited and reparsed.
#[derive(Clone)]
pub struct Tree {
    root: Subtree,
    language: Language,
    included_ranges: Vec<Range>,
}

impl Tree {
    pub(crate) fn new(root: Subtree, language: Language, included_ranges: Vec<Range>) -> Self {
        Self {
            root,
            language,
            included_ranges,
        }
    }

    pub(crate) fn root_subtree(&self) -> &Subtree {
        &self.root
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::new(self, &self.root, Length::ZERO, Length::ZERO)
    }

    /// The root node with every position shifted by the given offset, for
    /// trees parsed from a fragment of a larger document.
    pub fn root_node_with_offset(&self, offset_bytes: usize, offset_extent: Point) -> Node<'_> {
        Node::new(
            self,
            &self.root,
            Length::ZERO,
            Length::new(offset_bytes, offset_extent),
        )
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        self.root_node().walk()
    }

    /// The ranges the tree was parsed from. Empty means the whole document.
    pub fn included_ranges(&self) -> &[Range] {
        &self.included_ranges
    }

    /// Adjusts the tree to an edit of its source so it can be passed back to
    /// the parser as the old tree.
    pub fn edit(&mut self, edit: &InputEdit) {
        tracing::debug!(
            start = edit.start_byte,
            old_end = edit.old_end_byte,
            new_end = edit.new_end_byte,
            "edit tree"
        );
        self.root.edit(SubtreeEdit {
            start: edit.start(),
            old_end: edit.old_end(),
            new_end: edit.new_end(),
        });

        for range in &mut self.included_ranges {
            if range.end_byte >= edit.old_end_byte {
                if range.end_byte != usize::MAX {
                    let (byte, point) = edit.apply(range.end_byte, range.end_point);
                    range.end_byte = byte;
                    range.end_point = point;
                }
            } else if range.end_byte > edit.start_byte {
                range.end_byte = edit.start_byte;
                range.end_point = edit.start_position;
            }

            if range.start_byte >= edit.old_end_byte {
                let (byte, point) = edit.apply(range.start_byte, range.start_point);
                range.start_byte = byte;
                range.start_point = point;
            } else if range.start_byte > edit.start_byte {
                range.start_byte = edit.start_byte;
                range.start_point = edit.start_position;
            }
        }
    }

    /// Ranges whose syntactic structure differs between `self`, an edited
    /// old tree, and `new`, its reparse.
    pub fn changed_ranges(&self, new: &Tree) -> impl ExactSizeIterator<Item = Range> + use<> {
        changed_ranges::compute(self, new).into_iter()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Tree {:?}}}", self.root_node())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root_node().to_sexp())
    }
}
