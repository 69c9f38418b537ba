//! Recursive-descent productions for the query language.
//!
//! ```text
//! root      = pattern*
//! pattern   = atom quantifier? capture*
//! atom      = tree | group | predicate | alt | "_" | string | field
//! tree      = "(" (kind ("/" subtype)? | "_" | ERROR | MISSING arg?) child* ")"
//! group     = "(" child+ ")"
//! predicate = "(" PREDICATE_NAME (capture_ref | string | ID)* ")"
//! alt       = "[" pattern+ "]"
//! field     = ID ":" atom
//! child     = pattern | "." | "!" ID
//! ```

use rowan::Checkpoint;

use super::core::Parser;
use super::cst::SyntaxKind;
use super::cst::token_sets::{
    ALT_RECOVERY, PREDICATE_RECOVERY, QUANTIFIERS, ROOT_EXPR_FIRST, TREE_RECOVERY,
};
use crate::diagnostics::DiagnosticKind;

/// Where a pattern sits, which decides whether anchors, negated fields and
/// predicates are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Root,
    Node,
    Group,
    Alt,
    FieldValue,
}

impl Ctx {
    fn allows_anchor(self) -> bool {
        matches!(self, Ctx::Node | Ctx::Group)
    }

    fn allows_negated_field(self) -> bool {
        self == Ctx::Node
    }
}

impl Parser<'_> {
    pub(super) fn parse_root(&mut self) {
        self.start_node(SyntaxKind::Root);

        while !self.should_stop() {
            if self.currently_is(SyntaxKind::ParenClose) {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "unmatched `)`");
                continue;
            }
            if self.currently_is(SyntaxKind::BracketClose) {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "unmatched `]`");
                continue;
            }
            self.parse_expr(Ctx::Root);
        }

        self.skip_trivia_to_buffer();
        self.drain_trivia();
        self.finish_node();
    }

    fn parse_expr(&mut self, ctx: Ctx) {
        self.parse_expr_inner(ctx, true)
    }

    /// Field values parse without suffix so `field: (x)*` reads as
    /// `(field: (x))*`.
    fn parse_expr_no_suffix(&mut self, ctx: Ctx) {
        self.parse_expr_inner(ctx, false)
    }

    fn parse_expr_inner(&mut self, ctx: Ctx, with_suffix: bool) {
        if !self.enter_recursion() {
            self.start_node(SyntaxKind::Error);
            while !self.eof() {
                self.bump();
            }
            self.finish_node();
            return;
        }

        let checkpoint = self.checkpoint();

        let is_pattern = match self.current() {
            SyntaxKind::ParenOpen => self.parse_paren(ctx),
            SyntaxKind::BracketOpen => {
                self.parse_alt();
                true
            }
            SyntaxKind::Underscore => {
                self.parse_wildcard();
                true
            }
            SyntaxKind::DoubleQuote => {
                self.parse_str();
                true
            }
            SyntaxKind::Id => self.parse_field_or_bare_identifier(),
            SyntaxKind::Dot => {
                self.parse_anchor(ctx);
                false
            }
            SyntaxKind::Negation => {
                self.parse_negated_field(ctx);
                false
            }
            SyntaxKind::KwError | SyntaxKind::KwMissing => {
                self.error_and_bump(DiagnosticKind::ErrorMissingOutsideParens);
                false
            }
            SyntaxKind::At => {
                self.error_and_bump(DiagnosticKind::CaptureWithoutTarget);
                false
            }
            SyntaxKind::Garbage if self.current_text().starts_with('"') => {
                self.error_and_bump(DiagnosticKind::UnclosedString);
                false
            }
            _ => {
                self.error_and_bump_msg(
                    DiagnosticKind::UnexpectedToken,
                    "try `(node)`, `[a b]`, `\"literal\"`, or `_`",
                );
                false
            }
        };

        if with_suffix && is_pattern {
            self.try_parse_quantifier(checkpoint);
            self.try_parse_captures(checkpoint);
        }

        self.exit_recursion();
    }

    /// Everything that starts with `(`. Returns `false` for predicates,
    /// which cannot carry a suffix.
    fn parse_paren(&mut self, ctx: Ctx) -> bool {
        let checkpoint = self.checkpoint();
        self.push_delimiter();
        self.bump(); // '('

        match self.current() {
            SyntaxKind::ParenClose => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.error(DiagnosticKind::EmptyTree);
                self.pop_delimiter();
                self.bump();
                self.finish_node();
                return true;
            }
            SyntaxKind::PredicateName => {
                self.start_node_at(checkpoint, SyntaxKind::Predicate);
                if ctx == Ctx::Root {
                    self.error(DiagnosticKind::PredicateOutsidePattern);
                }
                self.parse_predicate_body();
                self.finish_node();
                return false;
            }
            SyntaxKind::ParenOpen
            | SyntaxKind::BracketOpen
            | SyntaxKind::DoubleQuote
            | SyntaxKind::Dot => {
                self.start_node_at(checkpoint, SyntaxKind::Group);
                self.parse_children(Ctx::Group);
                self.close_delimiter(SyntaxKind::ParenClose, "closing `)` for group");
                self.finish_node();
                return true;
            }
            SyntaxKind::Underscore | SyntaxKind::Id => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.bump();
                if self.eat_token(SyntaxKind::Slash) {
                    match self.current() {
                        SyntaxKind::Id => self.bump(),
                        SyntaxKind::DoubleQuote => self.bump_string_tokens(),
                        _ => self.error(DiagnosticKind::ExpectedSubtype),
                    }
                }
            }
            SyntaxKind::KwError => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.bump();
                if !self.currently_is(SyntaxKind::ParenClose) && !self.eof() {
                    self.error(DiagnosticKind::ErrorTakesNoArguments);
                }
            }
            SyntaxKind::KwMissing => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.bump();
                match self.current() {
                    SyntaxKind::Id => self.bump(),
                    SyntaxKind::DoubleQuote => self.bump_string_tokens(),
                    _ => {}
                }
            }
            _ => {
                self.start_node_at(checkpoint, SyntaxKind::Tree);
                self.error_msg(DiagnosticKind::ExpectedExpression, "inside `(`");
            }
        }

        self.parse_children(Ctx::Node);
        self.close_delimiter(SyntaxKind::ParenClose, "closing `)` for node");
        self.finish_node();
        true
    }

    fn parse_children(&mut self, ctx: Ctx) {
        loop {
            if self.eof() {
                self.error_unclosed("node");
                break;
            }
            if self.should_stop() || self.currently_is(SyntaxKind::ParenClose) {
                break;
            }
            if self.currently_is_one_of(TREE_RECOVERY) {
                break;
            }
            self.parse_expr(ctx);
        }
    }

    fn parse_predicate_body(&mut self) {
        self.bump(); // predicate name

        loop {
            if self.eof() {
                self.error_unclosed("predicate");
                break;
            }
            if self.should_stop() {
                break;
            }
            match self.current() {
                SyntaxKind::ParenClose => break,
                SyntaxKind::At => self.parse_capture_ref(),
                SyntaxKind::DoubleQuote => self.parse_str(),
                SyntaxKind::Id => self.bump(),
                kind if PREDICATE_RECOVERY.contains(kind) => break,
                _ => self.error_and_bump_msg(
                    DiagnosticKind::InvalidPredicateArguments,
                    "expected `@capture`, `\"string\"` or identifier",
                ),
            }
        }

        self.close_delimiter(SyntaxKind::ParenClose, "closing `)` for predicate");
    }

    fn parse_capture_ref(&mut self) {
        self.start_node(SyntaxKind::CaptureRef);
        self.bump(); // '@'
        if !self.eat_token(SyntaxKind::Id) {
            self.error(DiagnosticKind::ExpectedCaptureName);
        }
        self.finish_node();
    }

    fn parse_alt(&mut self) {
        self.start_node(SyntaxKind::Alt);
        self.push_delimiter();
        self.bump(); // '['

        let mut branches = 0;
        loop {
            if self.eof() {
                self.error_unclosed("alternation");
                break;
            }
            if self.should_stop() || self.currently_is(SyntaxKind::BracketClose) {
                break;
            }
            if self.currently_is_one_of(ALT_RECOVERY) {
                break;
            }
            self.parse_expr(Ctx::Alt);
            branches += 1;
        }

        if branches == 0 && self.currently_is(SyntaxKind::BracketClose) {
            self.error_msg(
                DiagnosticKind::ExpectedExpression,
                "inside `[]`",
            );
        }

        self.close_delimiter(SyntaxKind::BracketClose, "closing `]` for alternation");
        self.finish_node();
    }

    fn parse_wildcard(&mut self) {
        self.start_node(SyntaxKind::Wildcard);
        self.bump();
        self.finish_node();
    }

    fn parse_str(&mut self) {
        self.start_node(SyntaxKind::Str);
        self.bump_string_tokens();
        self.finish_node();
    }

    /// Quote, optional content, quote. No node of its own.
    fn bump_string_tokens(&mut self) {
        self.bump(); // opening quote
        if self.currently_is(SyntaxKind::StrVal) {
            self.bump();
        }
        self.assert_closing_quote();
        self.bump();
    }

    fn parse_anchor(&mut self, ctx: Ctx) {
        if !ctx.allows_anchor() {
            self.error(DiagnosticKind::MisplacedAnchor);
        }
        self.start_node(SyntaxKind::Anchor);
        self.bump();
        self.finish_node();
    }

    fn parse_negated_field(&mut self, ctx: Ctx) {
        if !ctx.allows_negated_field() {
            self.error(DiagnosticKind::MisplacedNegatedField);
        }
        self.start_node(SyntaxKind::NegatedField);
        self.bump(); // '!'
        if !self.eat_token(SyntaxKind::Id) {
            self.error(DiagnosticKind::ExpectedFieldName);
        }
        self.finish_node();
    }

    /// `field: pattern`, or a bare identifier, which is an error.
    fn parse_field_or_bare_identifier(&mut self) -> bool {
        if !self.next_is(SyntaxKind::Colon) {
            self.error_and_bump(DiagnosticKind::BareIdentifier);
            return false;
        }

        self.start_node(SyntaxKind::Field);
        self.assert_current(SyntaxKind::Id);
        self.bump();
        self.bump(); // ':'

        if self.currently_is_one_of(ROOT_EXPR_FIRST) {
            self.parse_expr_no_suffix(Ctx::FieldValue);
        } else {
            self.error_msg(DiagnosticKind::ExpectedExpression, "after `field:`");
        }

        self.finish_node();
        true
    }

    fn try_parse_quantifier(&mut self, checkpoint: Checkpoint) {
        if self.currently_is_one_of(QUANTIFIERS) {
            self.start_node_at(checkpoint, SyntaxKind::Quantifier);
            self.bump();
            self.finish_node();
        }
    }

    /// `@a @b` nests: the outermost capture is the last one written.
    fn try_parse_captures(&mut self, checkpoint: Checkpoint) {
        while self.currently_is(SyntaxKind::At) {
            self.start_node_at(checkpoint, SyntaxKind::Capture);
            self.bump(); // '@'
            if !self.eat_token(SyntaxKind::Id) {
                self.error(DiagnosticKind::ExpectedCaptureName);
            }
            self.finish_node();
        }
    }

    fn close_delimiter(&mut self, kind: SyntaxKind, what: &str) {
        self.pop_delimiter();
        if self.should_stop() {
            return;
        }
        self.expect(kind, what);
    }

    fn error_unclosed(&mut self, construct: &str) {
        if self.depth_exceeded() {
            return;
        }
        let Some(open) = self.delimiter_stack.last().copied() else {
            return;
        };
        let kind = if construct == "alternation" {
            DiagnosticKind::UnclosedAlternation
        } else {
            DiagnosticKind::UnclosedTree
        };
        let delim = if kind == DiagnosticKind::UnclosedAlternation {
            "`]`"
        } else {
            "`)`"
        };
        self.error_unclosed_delimiter(
            kind,
            format!("expected {delim}"),
            format!("{construct} started here"),
            open.span,
        );
    }
}
