//! Thicket syntax trees: the incremental parser and everything needed to
//! walk its output.
//!
//! # Example
//!
//! ```
//! use thicket_syntax::Parser;
//!
//! let mut parser = Parser::new();
//! parser
//!     .set_language(&thicket_langs::arithmetic())
//!     .expect("built-in languages are compatible");
//! let tree = parser.parse("1 + 2", None).expect("language is set");
//! assert_eq!(
//!     tree.root_node().to_sexp(),
//!     "(expression left: (number) right: (number))"
//! );
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod changed_ranges;
mod cursor;
mod error;
mod input;
mod invariants;
mod lexer;
mod node;
mod parser;
mod subtree;
mod tree;

#[cfg(test)]
mod changed_ranges_tests;
#[cfg(test)]
mod cursor_tests;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod parser_tests;

pub use cursor::TreeCursor;
pub use error::IncludedRangesError;
pub use input::{Input, InputEncoding, ReadFn, Utf16Units};
pub use node::{Children, Node};
pub use parser::{LogType, Logger, ParseOptions, ParseState, Parser};
pub use tree::Tree;

pub use thicket_core::{InputEdit, Language, Point, Range};
