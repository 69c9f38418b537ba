//! Incremental LR parser.
//!
//! The parser runs a single deterministic LR stack over the language's parse
//! table. Given an edited old tree it offers unchanged old subtrees in place
//! of freshly lexed tokens; anything it cannot reuse is lexed again.
//! Malformed input never fails the parse: see [`recovery`] for how MISSING
//! and ERROR nodes are produced.

mod recovery;
mod reusable;
pub(crate) mod stack;

use std::fmt;
use std::ops::ControlFlow;

use thicket_core::language::{
    LANGUAGE_VERSION, LanguageError, MIN_COMPATIBLE_LANGUAGE_VERSION, ParseAction, SYMBOL_END,
    SYMBOL_ERROR,
};
use thicket_core::{Language, Range, StateId};

use crate::error::IncludedRangesError;
use crate::input::{Input, InputAdapter, InputEncoding, Utf16Units};
use crate::invariants::ensure_production;
use crate::lexer::Lexer;
use crate::subtree::{LeafSpec, Subtree};
use crate::tree::Tree;

use self::reusable::ReusableNode;
use self::stack::Stack;

/// Receives parser and lexer events as human-readable lines.
pub type Logger = Box<dyn FnMut(LogType, &str) + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogType {
    Parse,
    Lex,
}

/// Progress snapshot handed to [`ParseOptions::progress_callback`].
#[derive(Clone, Copy, Debug)]
pub struct ParseState {
    current_byte_offset: usize,
    has_error: bool,
}

impl ParseState {
    pub fn current_byte_offset(&self) -> usize {
        self.current_byte_offset
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }
}

type ProgressCallback<'a> = &'a mut dyn FnMut(&ParseState) -> ControlFlow<()>;

/// Per-call parse settings.
#[derive(Default)]
pub struct ParseOptions<'a> {
    progress_callback: Option<ProgressCallback<'a>>,
}

impl<'a> ParseOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polled before each token. Returning `Break` cancels the parse; the
    /// next parse call on the same input resumes where this one stopped
    /// unless [`Parser::reset`] is called first.
    pub fn progress_callback<F>(mut self, callback: &'a mut F) -> Self
    where
        F: FnMut(&ParseState) -> ControlFlow<()>,
    {
        self.progress_callback = Some(callback);
        self
    }
}

macro_rules! log {
    ($parser:expr, $kind:ident, $($arg:tt)*) => {
        if $parser.logger.is_some() || tracing::enabled!(tracing::Level::TRACE) {
            $parser.emit(LogType::$kind, &format!($($arg)*));
        }
    };
}
pub(crate) use log;

/// Produces syntax trees from source text.
///
/// A parser is reusable across documents and languages. It is `Send` but not
/// `Sync`: every parse mutates its internal stack.
pub struct Parser {
    language: Option<Language>,
    included_ranges: Vec<Range>,
    logger: Option<Logger>,
    stack: Stack,
    /// A cancelled parse left `stack` in progress.
    suspended: bool,
    /// Byte offset of the last MISSING insertion, so recovery cannot insert
    /// forever at one place.
    last_missing: Option<usize>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            language: None,
            included_ranges: Vec::new(),
            logger: None,
            stack: Stack::default(),
            suspended: false,
            last_missing: None,
        }
    }

    /// Sets the language, rejecting tables built for an unsupported ABI.
    pub fn set_language(&mut self, language: &Language) -> Result<(), LanguageError> {
        let version = language.abi_version();
        if !(MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
            return Err(LanguageError::IncompatibleVersion {
                version,
                min: MIN_COMPATIBLE_LANGUAGE_VERSION,
                max: LANGUAGE_VERSION,
            });
        }
        self.language = Some(language.clone());
        self.reset();
        Ok(())
    }

    pub fn language(&self) -> Option<&Language> {
        self.language.as_ref()
    }

    /// Restricts parsing to the given ranges. An empty list means the whole
    /// document.
    pub fn set_included_ranges(&mut self, ranges: &[Range]) -> Result<(), IncludedRangesError> {
        for (index, range) in ranges.iter().enumerate() {
            if range.start_byte > range.end_byte {
                return Err(IncludedRangesError::Inverted { index });
            }
            if index > 0 && range.start_byte < ranges[index - 1].end_byte {
                return Err(IncludedRangesError::Unordered { index });
            }
        }
        self.included_ranges = ranges.to_vec();
        self.reset();
        Ok(())
    }

    pub fn included_ranges(&self) -> &[Range] {
        &self.included_ranges
    }

    pub fn set_logger(&mut self, logger: Option<Logger>) {
        self.logger = logger;
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    /// Forgets a cancelled parse so the next call starts from the beginning.
    pub fn reset(&mut self) {
        self.stack = Stack::default();
        self.suspended = false;
        self.last_missing = None;
    }

    /// Parses UTF-8 text. `old_tree` must already reflect every edit made
    /// since it was produced.
    pub fn parse(&mut self, text: impl AsRef<[u8]>, old_tree: Option<&Tree>) -> Option<Tree> {
        let mut bytes = text.as_ref();
        self.parse_with(&mut bytes, InputEncoding::Utf8, old_tree, ParseOptions::default())
    }

    /// Parses UTF-16 text. Byte offsets in the tree count two bytes per code
    /// unit.
    pub fn parse_utf16_le(&mut self, units: &[u16], old_tree: Option<&Tree>) -> Option<Tree> {
        let mut input = Utf16Units(units);
        self.parse_with(&mut input, InputEncoding::Utf16Le, old_tree, ParseOptions::default())
    }

    /// Parses text pulled from `input`.
    ///
    /// Returns `None` when no language is set or the progress callback
    /// cancelled the parse.
    pub fn parse_with(
        &mut self,
        input: &mut dyn Input,
        encoding: InputEncoding,
        old_tree: Option<&Tree>,
        mut options: ParseOptions<'_>,
    ) -> Option<Tree> {
        let language = self.language.clone()?;
        if !self.suspended {
            self.stack = Stack::new(language.start_state());
            self.last_missing = None;
        }
        self.suspended = false;

        let ranges = if self.included_ranges.is_empty() {
            vec![Range::WHOLE]
        } else {
            self.included_ranges.clone()
        };
        let mut input = InputAdapter::new(input, encoding, &ranges);
        let reuse_root = old_tree
            .filter(|old| old.language() == &language && old.included_ranges() == self.included_ranges.as_slice())
            .map(Tree::root_subtree);
        let mut reusable = ReusableNode::new(reuse_root);
        log!(self, Parse, "new_parse reuse:{}", reuse_root.is_some());

        loop {
            if let Some(callback) = options.progress_callback.as_mut() {
                let state = ParseState {
                    current_byte_offset: self.stack.position().bytes,
                    has_error: self.stack.has_error(),
                };
                if callback(&state).is_break() {
                    log!(self, Parse, "cancelled position:{}", state.current_byte_offset);
                    self.suspended = true;
                    return None;
                }
            }

            let lookahead = self.next_lookahead(&language, &mut input, &mut reusable);
            if let Some(root) = self.consume(&language, lookahead) {
                log!(self, Parse, "done");
                self.reset();
                return Some(Tree::new(root, language, self.included_ranges.clone()));
            }
        }
    }

    /// Reuses an old subtree at the current position or lexes a new token.
    fn next_lookahead(
        &mut self,
        language: &Language,
        input: &mut InputAdapter<'_>,
        reusable: &mut ReusableNode,
    ) -> Subtree {
        let state = self.stack.state();
        let position = self.stack.position();
        let reused = reusable.take(position.bytes, state, language, |leaf| {
            input.seek(position);
            let token = Lexer::new(language).lex(input, state);
            token.symbol == leaf.symbol
                && token.padding == leaf.padding
                && token.size == leaf.size
                && token.lookahead_bytes <= leaf.lookahead_bytes
                && token.lex_ambiguous == leaf.flags.lex_ambiguous
        });
        if let Some(subtree) = reused {
            log!(
                self,
                Parse,
                "reuse_node symbol:{} position:{} size:{}",
                symbol_label(language, &subtree),
                position.bytes,
                subtree.total().bytes
            );
            return subtree;
        }

        input.seek(position);
        let token = Lexer::new(language).lex(input, state);
        let leaf = Subtree::leaf(
            LeafSpec {
                symbol: token.symbol,
                padding: token.padding,
                size: token.size,
                lookahead_bytes: token.lookahead_bytes,
                parse_state: state,
                lex_ambiguous: token.lex_ambiguous,
            },
            language,
        );
        log!(
            self,
            Lex,
            "lexed_lookahead symbol:{} position:{} size:{}",
            symbol_label(language, &leaf),
            (position + token.padding).bytes,
            token.size.bytes
        );
        leaf
    }

    /// Applies actions until `lookahead` is shifted. Returns the root once
    /// the input is accepted.
    fn consume(&mut self, language: &Language, mut lookahead: Subtree) -> Option<Subtree> {
        loop {
            let state = self.stack.state();
            if !lookahead.is_leaf() {
                let next = language.next_state(state, lookahead.symbol);
                self.shift(language, next, lookahead);
                return None;
            }

            match language.action(state, lookahead.symbol) {
                Some(ParseAction::Shift { state: next }) => {
                    self.shift(language, next, lookahead);
                    return None;
                }
                Some(ParseAction::ShiftExtra) => {
                    lookahead.set_extra();
                    self.shift(language, state, lookahead);
                    return None;
                }
                Some(ParseAction::Reduce { production }) => {
                    self.reduce(language, production, &lookahead);
                }
                Some(ParseAction::Accept) => {
                    return Some(self.accept(language, lookahead));
                }
                None => match self.recover(language, lookahead) {
                    recovery::Outcome::Retry(retry) => lookahead = retry,
                    recovery::Outcome::Consumed => return None,
                    recovery::Outcome::Finished(root) => return Some(root),
                },
            }
        }
    }

    fn shift(&mut self, language: &Language, state: StateId, subtree: Subtree) {
        log!(self, Parse, "shift state:{} symbol:{}", state, symbol_label(language, &subtree));
        self.stack.push(state, subtree);
    }

    /// Pops a production's children and pushes its left-hand side. Extras on
    /// top of the stack stay outside the new node.
    fn reduce(&mut self, language: &Language, production_id: u16, lookahead: &Subtree) {
        let production = ensure_production(language, production_id);
        let (lhs, count) = (production.lhs, production.children.len());

        let mut trailing = Vec::new();
        while self
            .stack
            .top()
            .is_some_and(|top| top.subtree.flags.extra && count > 0)
        {
            trailing.push(self.stack.ensure_pop().subtree);
        }

        let mut children = Vec::with_capacity(count);
        let mut remaining = count;
        while remaining > 0 {
            let entry = self.stack.ensure_pop();
            if !entry.subtree.flags.extra {
                remaining -= 1;
            }
            children.push(entry.subtree);
        }
        children.reverse();

        let below = self.stack.state();
        let mut node = Subtree::node(lhs, children, Some(production_id), below, language);

        // The choice to reduce here depended on the lookahead token, so the
        // node must be invalidated by edits reaching it.
        let trailing_bytes: usize = trailing.iter().map(|t| t.total().bytes).sum();
        let reach = trailing_bytes + lookahead.total().bytes + lookahead.lookahead_bytes;
        if reach > node.lookahead_bytes {
            node.data_mut().lookahead_bytes = reach;
        }

        let next = language.next_state(below, lhs);
        log!(
            self,
            Parse,
            "reduce symbol:{} child_count:{} state:{}",
            language.symbol_name(lhs).unwrap_or("?"),
            count,
            next
        );
        self.stack.push(next, node);
        for extra in trailing.into_iter().rev() {
            self.stack.push(next, extra);
        }
    }

    /// Builds the root: the accepted node's children framed by the extras
    /// around it and the end-of-input leaf.
    fn accept(&mut self, language: &Language, end: Subtree) -> Subtree {
        let entries = self.stack.drain();
        let root_index = entries.iter().position(|s| !s.flags.extra);

        let Some(root_index) = root_index else {
            let mut children = entries;
            children.push(end);
            return Subtree::node(SYMBOL_ERROR, children, None, language.start_state(), language);
        };

        let root = &entries[root_index];
        let mut children = Vec::with_capacity(entries.len() + root.children.len() + 1);
        children.extend(entries[..root_index].iter().cloned());
        if root.is_leaf() {
            children.push(root.clone());
        } else {
            children.extend(root.children.iter().filter(|c| c.symbol != SYMBOL_END).cloned());
        }
        children.extend(entries[root_index + 1..].iter().cloned());
        children.push(end);

        log!(self, Parse, "accept symbol:{}", symbol_label(language, root));
        Subtree::node(
            root.symbol,
            children,
            root.production,
            root.parse_state,
            language,
        )
    }

    fn emit(&mut self, kind: LogType, message: &str) {
        match kind {
            LogType::Parse => tracing::trace!(target: "thicket::parse", "{message}"),
            LogType::Lex => tracing::trace!(target: "thicket::lex", "{message}"),
        }
        if let Some(logger) = self.logger.as_mut() {
            logger(kind, message);
        }
    }
}

fn symbol_label<'l>(language: &'l Language, subtree: &Subtree) -> &'l str {
    language.symbol_name(subtree.symbol).unwrap_or("?")
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language.as_ref().map(Language::name))
            .field("included_ranges", &self.included_ranges)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}
