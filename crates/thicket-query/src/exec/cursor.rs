use std::collections::VecDeque;
use std::ops::{self, ControlFlow};

use thicket_core::Point;
use thicket_syntax::Node;

use super::matcher::{self, Sibling, State};
use super::text::TextProvider;
use crate::Query;
use crate::compile::Pattern;

/// Execution settings for running queries.
///
/// A cursor can be reused across queries and trees; each [`exec`] call
/// starts a fresh traversal and clears the exceeded flag.
///
/// [`exec`]: QueryCursor::exec
#[derive(Debug, Clone)]
pub struct QueryCursor {
    match_limit: u32,
    did_exceed_match_limit: bool,
    byte_range: ops::Range<usize>,
    point_range: ops::Range<Point>,
    max_start_depth: Option<u32>,
}

impl Default for QueryCursor {
    fn default() -> Self {
        Self {
            match_limit: u32::MAX,
            did_exceed_match_limit: false,
            byte_range: 0..usize::MAX,
            point_range: Point::ZERO..Point::MAX,
            max_start_depth: None,
        }
    }
}

/// Progress snapshot handed to [`QueryCursorOptions::progress_callback`].
#[derive(Clone, Copy, Debug)]
pub struct QueryCursorState {
    current_byte_offset: usize,
    visited_nodes: usize,
}

impl QueryCursorState {
    pub fn current_byte_offset(&self) -> usize {
        self.current_byte_offset
    }

    pub fn visited_nodes(&self) -> usize {
        self.visited_nodes
    }
}

type ProgressCallback<'a> = &'a mut dyn FnMut(&QueryCursorState) -> ControlFlow<()>;

/// Per-call execution settings.
#[derive(Default)]
pub struct QueryCursorOptions<'a> {
    progress_callback: Option<ProgressCallback<'a>>,
}

impl<'a> QueryCursorOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polled before each visited node. Returning `Break` ends the
    /// execution: every later call yields `None`.
    pub fn progress_callback<F>(mut self, callback: &'a mut F) -> Self
    where
        F: FnMut(&QueryCursorState) -> ControlFlow<()>,
    {
        self.progress_callback = Some(callback);
        self
    }
}

/// One capture within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryCapture<'tree> {
    pub node: Node<'tree>,
    pub index: u32,
}

/// A successful match of one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'tree> {
    pub pattern_index: usize,
    /// Ordered by start byte, then by position in the pattern.
    pub captures: Vec<QueryCapture<'tree>>,
    id: u32,
}

impl<'tree> QueryMatch<'tree> {
    /// Identifies the match within one execution, for [`QueryExec::remove_match`].
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn nodes_for_capture_index(&self, index: u32) -> impl Iterator<Item = Node<'tree>> + '_ {
        self.captures
            .iter()
            .filter(move |c| c.index == index)
            .map(|c| c.node)
    }
}

impl QueryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of matches in flight. Values below 1 are raised
    /// to 1.
    pub fn set_match_limit(&mut self, limit: u32) {
        self.match_limit = limit.max(1);
    }

    pub fn match_limit(&self) -> u32 {
        self.match_limit
    }

    /// Whether the last execution dropped matches to stay within the limit.
    pub fn did_exceed_match_limit(&self) -> bool {
        self.did_exceed_match_limit
    }

    /// Only start matches at nodes intersecting `range`.
    pub fn set_byte_range(&mut self, range: ops::Range<usize>) -> &mut Self {
        self.byte_range = range;
        self
    }

    pub fn set_point_range(&mut self, range: ops::Range<Point>) -> &mut Self {
        self.point_range = range;
        self
    }

    /// Only start matches at nodes at most `depth` levels below the node
    /// passed to [`exec`](Self::exec). `None` removes the bound.
    pub fn set_max_start_depth(&mut self, depth: Option<u32>) -> &mut Self {
        self.max_start_depth = depth;
        self
    }

    pub fn exec<'a, 'tree, T: TextProvider>(
        &'a mut self,
        query: &'a Query,
        node: Node<'tree>,
        text: T,
    ) -> QueryExec<'a, 'tree, T> {
        self.exec_with_options(query, node, text, QueryCursorOptions::default())
    }

    pub fn exec_with_options<'a, 'tree, T: TextProvider>(
        &'a mut self,
        query: &'a Query,
        node: Node<'tree>,
        text: T,
        options: QueryCursorOptions<'a>,
    ) -> QueryExec<'a, 'tree, T> {
        self.did_exceed_match_limit = false;
        QueryExec {
            cursor: self,
            query,
            text,
            progress_callback: options.progress_callback,
            stack: vec![Frame {
                siblings: vec![(None, node)],
                next: 0,
                depth: 0,
            }],
            queue: VecDeque::new(),
            next_id: 0,
            visited_nodes: 0,
            cancelled: false,
        }
    }

    /// Shorthand for `exec(..).matches()`.
    pub fn matches<'a, 'tree, T: TextProvider>(
        &'a mut self,
        query: &'a Query,
        node: Node<'tree>,
        text: T,
    ) -> QueryMatches<'a, 'tree, T> {
        self.exec(query, node, text).matches()
    }

    /// Shorthand for `exec(..).captures()`.
    pub fn captures<'a, 'tree, T: TextProvider>(
        &'a mut self,
        query: &'a Query,
        node: Node<'tree>,
        text: T,
    ) -> QueryCaptures<'a, 'tree, T> {
        self.exec(query, node, text).captures()
    }

    fn intersects(&self, node: Node<'_>) -> bool {
        let (start, end) = (node.start_byte(), node.end_byte());
        let bytes = start < self.byte_range.end
            && (end > self.byte_range.start || (start == end && start >= self.byte_range.start));

        let (start, end) = (node.start_position(), node.end_position());
        let points = start < self.point_range.end
            && (end > self.point_range.start || (start == end && start >= self.point_range.start));

        bytes && points
    }
}

/// Children of one visited node, in order.
struct Frame<'tree> {
    siblings: Vec<Sibling<'tree>>,
    next: usize,
    /// Depth of the nodes in `siblings`.
    depth: u32,
}

struct InFlight<'tree> {
    found: QueryMatch<'tree>,
    end: usize,
    /// Captures already handed out by `next_capture`.
    released: usize,
}

/// A running query over one tree.
///
/// Nodes are visited in pre-order. Every pattern is tried at each visited
/// node, and a match is handed out once the traversal has moved past all of
/// its nodes, so that matches and captures come out in document order.
pub struct QueryExec<'a, 'tree, T> {
    cursor: &'a mut QueryCursor,
    query: &'a Query,
    text: T,
    progress_callback: Option<ProgressCallback<'a>>,
    stack: Vec<Frame<'tree>>,
    queue: VecDeque<InFlight<'tree>>,
    next_id: u32,
    visited_nodes: usize,
    cancelled: bool,
}

impl<'a, 'tree, T: TextProvider> QueryExec<'a, 'tree, T> {
    /// The next match in traversal order, or `None` when the traversal is
    /// done or was cancelled.
    pub fn next_match(&mut self) -> Option<QueryMatch<'tree>> {
        loop {
            if self.cancelled {
                return None;
            }
            let frontier = self.frontier();
            if self.queue.front().is_some_and(|f| f.end <= frontier) {
                return self.queue.pop_front().map(|f| f.found);
            }
            if frontier == usize::MAX {
                return None;
            }
            self.visit();
        }
    }

    /// The next capture in document order, with the match it belongs to
    /// and its position in that match's captures.
    pub fn next_capture(&mut self) -> Option<(QueryMatch<'tree>, usize)> {
        loop {
            if self.cancelled {
                return None;
            }
            let frontier = self.frontier();
            let done = frontier == usize::MAX;
            self.queue.retain(|f| !f.found.captures.is_empty());

            let best = self
                .queue
                .iter()
                .enumerate()
                .filter_map(|(at, f)| {
                    let capture = f.found.captures.get(f.released)?;
                    let start = capture.node.start_byte();
                    (done || start < frontier).then_some((
                        (start, f.found.pattern_index, f.released, f.found.id),
                        at,
                    ))
                })
                .min_by_key(|&(key, _)| key);

            if let Some((_, at)) = best {
                let entry = &mut self.queue[at];
                let index = entry.released;
                entry.released += 1;
                let found = entry.found.clone();
                if entry.released == entry.found.captures.len() {
                    self.queue.remove(at);
                }
                return Some((found, index));
            }
            if done {
                return None;
            }
            self.visit();
        }
    }

    /// Drops an in-flight match so none of its remaining captures are
    /// returned.
    pub fn remove_match(&mut self, id: u32) {
        self.queue.retain(|f| f.found.id != id);
    }

    pub fn did_exceed_match_limit(&self) -> bool {
        self.cursor.did_exceed_match_limit
    }

    pub fn matches(self) -> QueryMatches<'a, 'tree, T> {
        QueryMatches(self)
    }

    pub fn captures(self) -> QueryCaptures<'a, 'tree, T> {
        QueryCaptures(self)
    }

    /// Start byte of the next node to visit; `usize::MAX` once the
    /// traversal is done.
    fn frontier(&mut self) -> usize {
        self.peek().map_or(usize::MAX, |node| node.start_byte())
    }

    /// Moves to the next node that should be visited without visiting it.
    fn peek(&mut self) -> Option<Node<'tree>> {
        while let Some(frame) = self.stack.last_mut() {
            match frame.siblings.get(frame.next) {
                None => {
                    self.stack.pop();
                }
                Some(&(_, node)) if !self.cursor.intersects(node) => frame.next += 1,
                Some(&(_, node)) => return Some(node),
            }
        }
        None
    }

    fn visit(&mut self) {
        let Some(node) = self.peek() else {
            return;
        };

        self.visited_nodes += 1;
        if let Some(callback) = self.progress_callback.as_mut() {
            let state = QueryCursorState {
                current_byte_offset: node.start_byte(),
                visited_nodes: self.visited_nodes,
            };
            if callback(&state).is_break() {
                tracing::debug!(byte = node.start_byte(), "query cancelled");
                self.cancelled = true;
                return;
            }
        }

        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let index = frame.next;
        let depth = frame.depth;
        frame.next += 1;

        let mut found = Vec::new();
        for (pattern_index, pattern) in self.query.patterns().iter().enumerate() {
            if self.query.is_pattern_disabled(pattern_index) {
                continue;
            }
            for state in matcher::find_matches(&pattern.steps, &frame.siblings, index) {
                found.push((pattern_index, state));
            }
        }

        for (pattern_index, state) in found {
            let pattern = &self.query.patterns()[pattern_index];
            if satisfies(&mut self.text, pattern, &state.captures) {
                self.push(pattern_index, state);
            }
        }

        if self
            .cursor
            .max_start_depth
            .is_none_or(|max| depth < max)
            && node.child_count() > 0
        {
            self.stack.push(Frame {
                siblings: node.children_with_fields().collect(),
                next: 0,
                depth: depth + 1,
            });
        }
    }

    fn push(&mut self, pattern_index: usize, state: State<'tree>) {
        let mut captures: Vec<_> = state
            .captures
            .into_iter()
            .filter(|&(id, _)| !self.query.is_capture_disabled(id))
            .map(|(index, node)| QueryCapture { node, index })
            .collect();
        captures.sort_by_key(|c| c.node.start_byte());

        if self.queue.len() >= self.cursor.match_limit as usize {
            self.queue.pop_front();
            if !self.cursor.did_exceed_match_limit {
                tracing::debug!(limit = self.cursor.match_limit, "query match limit exceeded");
            }
            self.cursor.did_exceed_match_limit = true;
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.queue.push_back(InFlight {
            found: QueryMatch {
                pattern_index,
                captures,
                id,
            },
            end: state.end,
            released: 0,
        });
    }
}

/// Whether every text predicate of `pattern` holds for these captures.
fn satisfies<T: TextProvider>(
    text: &mut T,
    pattern: &Pattern,
    captures: &[(u32, Node<'_>)],
) -> bool {
    pattern.text_predicates.iter().all(|predicate| {
        predicate.holds(&mut |capture| {
            captures
                .iter()
                .filter(|&&(id, _)| id == capture)
                .map(|&(_, node)| text.text(node).into_owned())
                .collect()
        })
    })
}

/// Iterator over the matches of a [`QueryExec`].
pub struct QueryMatches<'a, 'tree, T>(QueryExec<'a, 'tree, T>);

impl<'a, 'tree, T> QueryMatches<'a, 'tree, T> {
    pub fn did_exceed_match_limit(&self) -> bool {
        self.0.cursor.did_exceed_match_limit
    }
}

impl<'tree, T: TextProvider> Iterator for QueryMatches<'_, 'tree, T> {
    type Item = QueryMatch<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_match()
    }
}

/// Iterator over the captures of a [`QueryExec`], in document order.
pub struct QueryCaptures<'a, 'tree, T>(QueryExec<'a, 'tree, T>);

impl<'a, 'tree, T> QueryCaptures<'a, 'tree, T> {
    pub fn did_exceed_match_limit(&self) -> bool {
        self.0.cursor.did_exceed_match_limit
    }
}

impl<'tree, T: TextProvider> Iterator for QueryCaptures<'_, 'tree, T> {
    type Item = (QueryMatch<'tree>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_capture()
    }
}

