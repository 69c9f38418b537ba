//! Parser for the query language.
//!
//! Produces a lossless concrete syntax tree through Rowan's green tree
//! builder:
//!
//! - Tokens carry spans; text is sliced only when building tree nodes
//! - Whitespace and comments are buffered and attached as leading trivia
//! - Quantifiers and captures wrap the preceding pattern via checkpoints
//!
//! The parser always produces a tree. Unknown tokens are wrapped in
//! `SyntaxKind::Error` nodes, missing tokens are reported without being
//! consumed, and past the recursion limit the rest of the input lands in a
//! single error node.

pub mod ast;
pub mod cst;
pub mod lexer;

mod core;
mod grammar;
mod invariants;

#[cfg(test)]
mod lexer_tests;

pub use ast::{
    Alt, Anchor, Capture, CaptureRef, Expr, Field, Group, KindName, NegatedField, Predicate,
    PredicateArg, Quantifier, Root, Str, Tree, TreeHead, Wildcard,
};
pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};

pub use core::Parser;

use crate::diagnostics::Diagnostics;
use lexer::lex;

/// A parsed query source. The tree is always complete; problems are in the
/// diagnostics returned next to it.
#[derive(Debug, Clone)]
pub struct Parse {
    cst: rowan::GreenNode,
}

impl Parse {
    pub fn as_cst(&self) -> &rowan::GreenNode {
        &self.cst
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.cst.clone())
    }

    pub fn root(&self) -> Root {
        // The parser always opens a Root node first.
        Root::cast(self.syntax()).unwrap_or_else(|| unreachable!("parse tree has a Root node"))
    }
}

pub fn parse(source: &str) -> (Parse, Diagnostics) {
    parse_with_parser(Parser::new(source, lex(source)))
}

/// Parse with a pre-configured parser (custom recursion fuel).
pub(crate) fn parse_with_parser(mut parser: Parser) -> (Parse, Diagnostics) {
    parser.parse_root();
    let (cst, diagnostics) = parser.finish();
    (Parse { cst }, diagnostics)
}
