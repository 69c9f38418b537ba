//! Stateful walking over visible nodes.
//!
//! The cursor keeps the full path from its root to the current subtree,
//! hidden subtrees included, so moving around is amortized O(1) and field
//! names can be resolved through hidden parents.

use thicket_core::{FieldId, Length, Point};

use crate::node::Node;
use crate::subtree::Subtree;
use crate::tree::Tree;

#[derive(Clone, Copy, Debug)]
struct Entry<'tree> {
    subtree: &'tree Subtree,
    position: Length,
    child_index: usize,
    structural_child_index: usize,
    /// Pre-order index among visible nodes; for hidden subtrees, the index
    /// their first visible descendant would have.
    descendant_index: usize,
}

impl Entry<'_> {
    #[inline]
    fn visible(&self) -> bool {
        self.subtree.flags.visible
    }

    #[inline]
    fn end(&self) -> Length {
        self.position + self.subtree.total()
    }
}

/// Iterates the raw children of an entry, carrying positions and indices.
struct ChildIter<'tree> {
    parent: &'tree Subtree,
    position: Length,
    child_index: usize,
    structural_child_index: usize,
    descendant_index: usize,
}

impl<'tree> ChildIter<'tree> {
    fn new(parent: &Entry<'tree>) -> Self {
        Self {
            parent: parent.subtree,
            position: parent.position,
            child_index: 0,
            structural_child_index: 0,
            descendant_index: parent.descendant_index + usize::from(parent.visible()),
        }
    }

    /// Resumes iteration right after `entry`, a child of `parent`.
    fn after(parent: &Entry<'tree>, entry: &Entry<'tree>) -> Self {
        Self {
            parent: parent.subtree,
            position: entry.end(),
            child_index: entry.child_index + 1,
            structural_child_index: entry.structural_child_index
                + usize::from(!entry.subtree.flags.extra),
            descendant_index: entry.descendant_index
                + usize::from(entry.visible())
                + entry.subtree.visible_descendant_count,
        }
    }
}

impl<'tree> Iterator for ChildIter<'tree> {
    type Item = Entry<'tree>;

    fn next(&mut self) -> Option<Entry<'tree>> {
        let subtree = self.parent.children.get(self.child_index)?;
        let entry = Entry {
            subtree,
            position: self.position,
            child_index: self.child_index,
            structural_child_index: self.structural_child_index,
            descendant_index: self.descendant_index,
        };
        self.position = entry.end();
        self.child_index += 1;
        if !subtree.flags.extra {
            self.structural_child_index += 1;
        }
        self.descendant_index +=
            usize::from(subtree.flags.visible) + subtree.visible_descendant_count;
        Some(entry)
    }
}

/// A cursor over the visible nodes below (and including) a root node.
///
/// The cursor never moves above the node it was created from.
#[derive(Clone)]
pub struct TreeCursor<'tree> {
    tree: &'tree Tree,
    base: Length,
    stack: Vec<Entry<'tree>>,
}

impl<'tree> TreeCursor<'tree> {
    pub fn new(node: Node<'tree>) -> Self {
        let mut cursor = Self {
            tree: node.tree(),
            base: node.base(),
            stack: Vec::with_capacity(8),
        };
        cursor.reset(node);
        cursor
    }

    /// The node under the cursor.
    pub fn node(&self) -> Node<'tree> {
        let entry = self.top();
        Node::new(self.tree, entry.subtree, entry.position, self.base)
    }

    #[inline]
    fn top(&self) -> &Entry<'tree> {
        self.stack.last().expect("cursor stack is never empty")
    }

    /// Re-roots the cursor at `node`.
    pub fn reset(&mut self, node: Node<'tree>) {
        self.tree = node.tree();
        self.base = node.base();
        self.stack.clear();
        self.stack.push(Entry {
            subtree: node.subtree(),
            position: node.position(),
            child_index: 0,
            structural_child_index: 0,
            descendant_index: 0,
        });
    }

    /// Copies another cursor's root and position, reusing this cursor's
    /// allocation.
    pub fn reset_to(&mut self, other: &TreeCursor<'tree>) {
        self.tree = other.tree;
        self.base = other.base;
        self.stack.clear();
        self.stack.extend_from_slice(&other.stack);
    }

    /// Number of visible ancestors between the root and the current node.
    pub fn depth(&self) -> u32 {
        self.stack[1..].iter().filter(|e| e.visible()).count() as u32
    }

    /// Pre-order index of the current node among the root's visible
    /// descendants, the root being 0.
    pub fn descendant_index(&self) -> usize {
        self.top().descendant_index
    }

    pub fn field_id(&self) -> Option<FieldId> {
        let language = self.tree.language();
        for i in (1..self.stack.len()).rev() {
            let entry = &self.stack[i];
            let parent = &self.stack[i - 1];
            if i != self.stack.len() - 1 && entry.visible() {
                break;
            }
            if entry.subtree.flags.extra {
                break;
            }
            let field = parent
                .subtree
                .production
                .and_then(|id| language.production(id))
                .and_then(|p| p.field_for_child(entry.structural_child_index));
            if field.is_some() {
                return field;
            }
        }
        None
    }

    pub fn field_name(&self) -> Option<&'tree str> {
        self.field_id()
            .and_then(|id| self.tree.language().field_name_for_id(id))
    }

    pub fn goto_first_child(&mut self) -> bool {
        self.descend(false)
    }

    pub fn goto_last_child(&mut self) -> bool {
        self.descend(true)
    }

    /// Moves to the first (or last) visible child, entering hidden subtrees.
    fn descend(&mut self, last: bool) -> bool {
        loop {
            let top = *self.top();
            let candidate = {
                let mut candidates = ChildIter::new(&top)
                    .filter(|e| e.visible() || e.subtree.visible_child_count > 0);
                if last { candidates.last() } else { candidates.next() }
            };
            let Some(entry) = candidate else {
                return false;
            };
            self.stack.push(entry);
            if entry.visible() {
                return true;
            }
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        for i in (0..self.stack.len().saturating_sub(1)).rev() {
            if self.stack[i].visible() || i == 0 {
                self.stack.truncate(i + 1);
                return true;
            }
        }
        false
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        for depth in (1..self.stack.len()).rev() {
            let parent = self.stack[depth - 1];
            let entry = self.stack[depth];
            let next = ChildIter::after(&parent, &entry)
                .find(|e| e.visible() || e.subtree.visible_child_count > 0);
            if let Some(next) = next {
                self.stack.truncate(depth);
                self.stack.push(next);
                if !next.visible() {
                    self.descend(false);
                }
                return true;
            }
            if parent.visible() {
                break;
            }
        }
        false
    }

    pub fn goto_previous_sibling(&mut self) -> bool {
        for depth in (1..self.stack.len()).rev() {
            let parent = self.stack[depth - 1];
            let entry = self.stack[depth];
            let prev = ChildIter::new(&parent)
                .take_while(|e| e.child_index < entry.child_index)
                .filter(|e| e.visible() || e.subtree.visible_child_count > 0)
                .last();
            if let Some(prev) = prev {
                self.stack.truncate(depth);
                self.stack.push(prev);
                if !prev.visible() {
                    self.descend(true);
                }
                return true;
            }
            if parent.visible() {
                break;
            }
        }
        false
    }

    /// Moves to the visible descendant with the given pre-order index.
    pub fn goto_descendant(&mut self, goal: usize) {
        self.stack.truncate(1);
        loop {
            let top = *self.top();
            if top.descendant_index == goal && (top.visible() || self.stack.len() == 1) {
                return;
            }
            let next = ChildIter::new(&top).find(|e| {
                let end = e.descendant_index + usize::from(e.visible()) + e.subtree.visible_descendant_count;
                end > goal
            });
            let Some(entry) = next else {
                return;
            };
            self.stack.push(entry);
            if entry.visible() && entry.descendant_index == goal {
                return;
            }
        }
    }

    /// Moves to the first child that extends past `byte`, returning its index
    /// among visible children.
    pub fn goto_first_child_for_byte(&mut self, byte: usize) -> Option<usize> {
        self.goto_first_child_where(|end| end.bytes > byte)
    }

    pub fn goto_first_child_for_point(&mut self, point: Point) -> Option<usize> {
        self.goto_first_child_where(|end| end.extent > point)
    }

    fn goto_first_child_where(&mut self, past_goal: impl Fn(Length) -> bool) -> Option<usize> {
        let initial = self.stack.len();
        let mut visible_index = 0;
        loop {
            let top = *self.top();
            let mut descended = false;
            for entry in ChildIter::new(&top) {
                let visible_children = entry.subtree.visible_child_count;
                if past_goal(entry.end()) {
                    if entry.visible() {
                        self.stack.push(entry);
                        return Some(visible_index);
                    }
                    if visible_children > 0 {
                        self.stack.push(entry);
                        descended = true;
                        break;
                    }
                } else if entry.visible() {
                    visible_index += 1;
                } else {
                    visible_index += visible_children;
                }
            }
            if !descended {
                self.stack.truncate(initial);
                return None;
            }
        }
    }
}

impl std::fmt::Debug for TreeCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeCursor")
            .field("node", &self.node())
            .field("depth", &self.depth())
            .finish()
    }
}
