//! Positioned views into a syntax tree.

use std::fmt;
use std::ops;

use thicket_core::language::SYMBOL_ERROR;
use thicket_core::{FieldId, InputEdit, Language, Length, Point, Range, StateId, Symbol};

use crate::cursor::TreeCursor;
use crate::subtree::Subtree;
use crate::tree::Tree;

/// A single visible node in a [`Tree`].
///
/// Nodes are cheap copies: a subtree reference plus its absolute position.
/// Hidden grammar rules never surface as nodes; their children are
/// reported as children of the nearest visible ancestor.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    subtree: &'tree Subtree,
    /// Absolute position of the subtree's padding start.
    position: Length,
    /// Offset applied to the whole tree.
    base: Length,
}

impl<'tree> Node<'tree> {
    pub(crate) fn new(tree: &'tree Tree, subtree: &'tree Subtree, position: Length, base: Length) -> Self {
        Self {
            tree,
            subtree,
            position,
            base,
        }
    }

    pub(crate) fn tree(&self) -> &'tree Tree {
        self.tree
    }

    pub(crate) fn subtree(&self) -> &'tree Subtree {
        self.subtree
    }

    pub(crate) fn position(&self) -> Length {
        self.position
    }

    pub(crate) fn base(&self) -> Length {
        self.base
    }

    /// Identity of the underlying subtree. Subtrees reused by an
    /// incremental parse keep their id.
    pub fn id(&self) -> usize {
        self.subtree.id()
    }

    pub fn language(&self) -> &'tree Language {
        self.tree.language()
    }

    pub fn kind_id(&self) -> Symbol {
        self.subtree.symbol
    }

    pub fn grammar_id(&self) -> Symbol {
        self.subtree.symbol
    }

    pub fn kind(&self) -> &'tree str {
        self.language().symbol_name(self.subtree.symbol).unwrap_or("")
    }

    pub fn grammar_name(&self) -> &'tree str {
        self.kind()
    }

    pub fn is_named(&self) -> bool {
        self.subtree.flags.named
    }

    pub fn is_extra(&self) -> bool {
        self.subtree.flags.extra
    }

    pub fn is_missing(&self) -> bool {
        self.subtree.flags.missing
    }

    pub fn is_error(&self) -> bool {
        self.subtree.symbol == SYMBOL_ERROR
    }

    pub fn has_error(&self) -> bool {
        self.subtree.flags.has_error
    }

    pub fn has_changes(&self) -> bool {
        self.subtree.flags.has_changes
    }

    /// The automaton state this node was lexed in or pushed onto.
    pub fn parse_state(&self) -> StateId {
        self.subtree.parse_state
    }

    /// The state reached after consuming this node.
    pub fn next_parse_state(&self) -> StateId {
        self.language()
            .next_state(self.subtree.parse_state, self.subtree.symbol)
    }

    fn start(&self) -> Length {
        self.base + self.position + self.subtree.padding
    }

    fn end(&self) -> Length {
        self.start() + self.subtree.size
    }

    pub fn start_byte(&self) -> usize {
        self.start().bytes
    }

    pub fn end_byte(&self) -> usize {
        self.end().bytes
    }

    pub fn byte_range(&self) -> ops::Range<usize> {
        self.start_byte()..self.end_byte()
    }

    pub fn start_position(&self) -> Point {
        self.start().extent
    }

    pub fn end_position(&self) -> Point {
        self.end().extent
    }

    pub fn range(&self) -> Range {
        let (start, end) = (self.start(), self.end());
        Range::new(start.bytes, end.bytes, start.extent, end.extent)
    }

    pub fn child_count(&self) -> usize {
        if self.subtree.is_leaf() {
            0
        } else {
            self.subtree.visible_child_count
        }
    }

    pub fn named_child_count(&self) -> usize {
        if self.subtree.is_leaf() {
            0
        } else {
            self.subtree.named_child_count
        }
    }

    /// Number of visible nodes in this subtree, itself included.
    pub fn descendant_count(&self) -> usize {
        self.subtree.visible_descendant_count + 1
    }

    pub fn child(&self, index: usize) -> Option<Node<'tree>> {
        self.relevant_child(index, true)
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'tree>> {
        self.relevant_child(index, false)
    }

    fn is_relevant(&self, include_anonymous: bool) -> bool {
        self.subtree.flags.visible && (include_anonymous || self.subtree.flags.named)
    }

    fn relevant_child_count(&self, include_anonymous: bool) -> usize {
        if include_anonymous {
            self.child_count()
        } else {
            self.named_child_count()
        }
    }

    fn relevant_child(&self, mut index: usize, include_anonymous: bool) -> Option<Node<'tree>> {
        let mut node = *self;
        'descend: loop {
            let mut seen = 0;
            for child in node.raw_children() {
                if child.is_relevant(include_anonymous) {
                    if seen == index {
                        return Some(child);
                    }
                    seen += 1;
                } else {
                    let count = child.relevant_child_count(include_anonymous);
                    if index - seen < count {
                        node = child;
                        index -= seen;
                        continue 'descend;
                    }
                    seen += count;
                }
            }
            return None;
        }
    }

    /// Direct children in the underlying tree, hidden ones included.
    pub(crate) fn raw_children(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        let (tree, base) = (self.tree, self.base);
        let subtree: &'tree Subtree = self.subtree;
        let mut position = self.position;
        subtree.children.iter().map(move |child| {
            let node = Node::new(tree, child, position, base);
            position = position + child.total();
            node
        })
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.subtree.flags.visible
    }

    pub fn walk(&self) -> TreeCursor<'tree> {
        TreeCursor::new(*self)
    }

    /// Visible children in order.
    pub fn children(&self) -> Children<'tree> {
        Children {
            cursor: self.walk(),
            state: ChildrenState::Start,
        }
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.children().filter(Node::is_named)
    }

    /// Visible children paired with their field, if any.
    pub fn children_with_fields(&self) -> impl Iterator<Item = (Option<FieldId>, Node<'tree>)> + use<'tree> {
        let mut cursor = self.walk();
        let mut started = false;
        std::iter::from_fn(move || {
            let moved = if started {
                cursor.goto_next_sibling()
            } else {
                started = true;
                cursor.goto_first_child()
            };
            moved.then(|| (cursor.field_id(), cursor.node()))
        })
    }

    pub fn child_by_field_id(&self, field: FieldId) -> Option<Node<'tree>> {
        self.children_by_field_id(field).next()
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'tree>> {
        let field = self.language().field_id_for_name(name)?;
        self.child_by_field_id(field)
    }

    pub fn children_by_field_id(&self, field: FieldId) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.children_with_fields()
            .filter(move |(f, _)| *f == Some(field))
            .map(|(_, node)| node)
    }

    pub fn children_by_field_name(&self, name: &str) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        let field = self.language().field_id_for_name(name);
        self.children_with_fields()
            .filter(move |(f, _)| field.is_some() && *f == field)
            .map(|(_, node)| node)
    }

    pub fn field_name_for_child(&self, index: usize) -> Option<&'tree str> {
        let (field, _) = self.children_with_fields().nth(index)?;
        field.and_then(|f| self.language().field_name_for_id(f))
    }

    pub fn field_name_for_named_child(&self, index: usize) -> Option<&'tree str> {
        let (field, _) = self
            .children_with_fields()
            .filter(|(_, node)| node.is_named())
            .nth(index)?;
        field.and_then(|f| self.language().field_name_for_id(f))
    }

    fn tree_root(&self) -> Node<'tree> {
        Node::new(self.tree, self.tree.root_subtree(), Length::ZERO, self.base)
    }

    /// Raw path from the tree root down to, but excluding, this node.
    fn ancestors(&self) -> Vec<Node<'tree>> {
        let target = *self;
        let target_end = target.position.bytes + target.subtree.total().bytes;
        // Children that could contain the target, last candidate first.
        let candidates = |node: Node<'tree>| -> Vec<Node<'tree>> {
            let mut found: Vec<_> = node
                .raw_children()
                .take_while(|child| child.position.bytes <= target.position.bytes)
                .filter(|child| target_end <= child.position.bytes + child.subtree.total().bytes)
                .collect();
            found.reverse();
            found
        };

        let root = self.tree_root();
        if root == target {
            return Vec::new();
        }
        let mut frames = vec![(root, candidates(root))];
        while let Some((_, pending)) = frames.last_mut() {
            let Some(next) = pending.pop() else {
                frames.pop();
                continue;
            };
            if next == target {
                return frames.into_iter().map(|(node, _)| node).collect();
            }
            frames.push((next, candidates(next)));
        }
        Vec::new()
    }

    pub fn parent(&self) -> Option<Node<'tree>> {
        self.ancestors().into_iter().rev().find(Node::is_visible)
    }

    /// The child of this node that contains `descendant`, or `descendant`
    /// itself if it is a direct child.
    pub fn child_with_descendant(&self, descendant: Node<'tree>) -> Option<Node<'tree>> {
        let path = descendant.ancestors();
        let index = path.iter().position(|n| n == self)?;
        path[index + 1..]
            .iter()
            .copied()
            .find(Node::is_visible)
            .or(Some(descendant))
    }

    fn siblings(&self, named_only: bool) -> Option<(Vec<Node<'tree>>, usize)> {
        let parent = self.parent()?;
        let siblings: Vec<_> = parent
            .children()
            .filter(|n| !named_only || n.is_named() || n == self)
            .collect();
        let index = siblings.iter().position(|n| n == self)?;
        Some((siblings, index))
    }

    pub fn next_sibling(&self) -> Option<Node<'tree>> {
        let (siblings, index) = self.siblings(false)?;
        siblings.get(index + 1).copied()
    }

    pub fn prev_sibling(&self) -> Option<Node<'tree>> {
        let (siblings, index) = self.siblings(false)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    pub fn next_named_sibling(&self) -> Option<Node<'tree>> {
        let (siblings, index) = self.siblings(true)?;
        siblings.get(index + 1).copied()
    }

    pub fn prev_named_sibling(&self) -> Option<Node<'tree>> {
        let (siblings, index) = self.siblings(true)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    pub fn first_child_for_byte(&self, byte: usize) -> Option<Node<'tree>> {
        self.children().find(|n| n.end_byte() > byte)
    }

    pub fn first_named_child_for_byte(&self, byte: usize) -> Option<Node<'tree>> {
        self.named_children().find(|n| n.end_byte() > byte)
    }

    pub fn descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
        Some(self.smallest_descendant(|n| (n.start_byte(), n.end_byte()), start, end, false))
    }

    pub fn named_descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
        Some(self.smallest_descendant(|n| (n.start_byte(), n.end_byte()), start, end, true))
    }

    pub fn descendant_for_point_range(&self, start: Point, end: Point) -> Option<Node<'tree>> {
        Some(self.smallest_descendant(|n| (n.start_position(), n.end_position()), start, end, false))
    }

    pub fn named_descendant_for_point_range(&self, start: Point, end: Point) -> Option<Node<'tree>> {
        Some(self.smallest_descendant(|n| (n.start_position(), n.end_position()), start, end, true))
    }

    /// Descends to the smallest (named) node spanning `start..end`.
    fn smallest_descendant<K: Ord>(
        &self,
        bounds: impl Fn(&Node<'tree>) -> (K, K),
        start: K,
        end: K,
        named_only: bool,
    ) -> Node<'tree> {
        let mut node = *self;
        let mut last_visible = *self;
        'descend: loop {
            for child in node.raw_children() {
                let (child_start, child_end) = bounds(&child);
                // The child must reach the end of the range and move past its start.
                if child_end < end || child_end <= start {
                    continue;
                }
                if start < child_start {
                    break;
                }
                node = child;
                if child.is_relevant(!named_only) {
                    last_visible = child;
                }
                continue 'descend;
            }
            return last_visible;
        }
    }

    /// Moves this handle's start to where `edit` puts it, for nodes held
    /// while their source changes. A start inside the replaced text moves to
    /// the end of the new text. The node keeps its size and children.
    pub fn edit(&mut self, edit: &InputEdit) {
        let start = self.start();
        let (bytes, extent) = if start.bytes >= edit.old_end_byte {
            edit.apply(start.bytes, start.extent)
        } else if start.bytes > edit.start_byte {
            (edit.new_end_byte, edit.new_end_position)
        } else {
            return;
        };
        self.position = Length::new(bytes, extent) - self.base - self.subtree.padding;
    }

    pub fn utf8_text<'a>(&self, source: &'a [u8]) -> Result<&'a str, std::str::Utf8Error> {
        std::str::from_utf8(&source[self.byte_range()])
    }

    pub fn utf16_text<'a>(&self, source: &'a [u16]) -> &'a [u16] {
        &source[self.start_byte() / 2..self.end_byte() / 2]
    }

    /// S-expression of the named structure below this node.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        let mut cursor = self.walk();
        // Whether each ancestor of the cursor opened a parenthesis.
        let mut open = Vec::new();
        loop {
            let shown = open_sexp(&cursor, &mut out, open.is_empty());
            if cursor.goto_first_child() {
                open.push(shown);
                continue;
            }
            if shown {
                out.push(')');
            }
            while !cursor.goto_next_sibling() {
                let Some(parent_shown) = open.pop() else {
                    return out;
                };
                cursor.goto_parent();
                if parent_shown {
                    out.push(')');
                }
            }
        }
    }
}

/// Writes the opening of the cursor's node. Returns whether anything was
/// written, which decides if the node is closed later.
fn open_sexp(cursor: &TreeCursor<'_>, out: &mut String, is_root: bool) -> bool {
    let node = cursor.node();
    let shown = node.is_named() || node.is_missing();
    if !shown {
        return false;
    }
    if !out.is_empty() {
        out.push(' ');
    }
    if !is_root && let Some(field) = cursor.field_name() {
        out.push_str(field);
        out.push_str(": ");
    }
    out.push('(');
    if node.is_missing() {
        out.push_str("MISSING ");
        if node.is_named() {
            out.push_str(node.kind());
        } else {
            out.push('"');
            out.push_str(&node.kind().escape_default().to_string());
            out.push('"');
        }
    } else {
        out.push_str(node.kind());
    }
    true
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && self.subtree.ptr_eq(other.subtree)
            && self.position.bytes == other.position.bytes
            && self.base.bytes == other.base.bytes
    }
}

impl Eq for Node<'_> {}

impl std::hash::Hash for Node<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.subtree.id().hash(state);
        self.position.bytes.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Node {} {} - {}}}",
            self.kind(),
            self.start_position(),
            self.end_position()
        )
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sexp())
    }
}

enum ChildrenState {
    Start,
    Running,
    Done,
}

/// Iterator over a node's visible children.
pub struct Children<'tree> {
    cursor: TreeCursor<'tree>,
    state: ChildrenState,
}

impl<'tree> Iterator for Children<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        let moved = match self.state {
            ChildrenState::Start => self.cursor.goto_first_child(),
            ChildrenState::Running => self.cursor.goto_next_sibling(),
            ChildrenState::Done => return None,
        };
        if moved {
            self.state = ChildrenState::Running;
            Some(self.cursor.node())
        } else {
            self.state = ChildrenState::Done;
            None
        }
    }
}
