//! Thicket queries: structural patterns over syntax trees.
//!
//! # Example
//!
//! ```
//! use thicket_query::{Query, QueryCursor};
//! use thicket_syntax::Parser;
//!
//! let language = thicket_langs::arithmetic();
//! let mut parser = Parser::new();
//! parser.set_language(&language).expect("compatible language");
//! let source = "1 + 2 * 3";
//! let tree = parser.parse(source, None).expect("language is set");
//!
//! let query = Query::new(
//!     &language,
//!     r#"(expression left: (number) @lhs operator: "*")"#,
//! )
//! .expect("valid query");
//!
//! let mut cursor = QueryCursor::new();
//! let lhs: Vec<_> = cursor
//!     .matches(&query, tree.root_node(), source)
//!     .flat_map(|m| m.captures)
//!     .map(|c| c.node.utf8_text(source.as_bytes()).unwrap_or_default().to_string())
//!     .collect();
//! assert_eq!(lhs, ["2"]);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod compile;
pub mod diagnostics;
pub mod parser;

mod error;
mod exec;
mod query;

#[cfg(test)]
mod query_tests;

/// Maximum pattern nesting the query parser accepts by default.
pub const DEFAULT_RECURSION_FUEL: u32 = 4096;

pub use compile::predicate::{PredicateStep, QueryPredicate, QueryPredicateArg, QueryProperty};
pub use compile::quantifier::CaptureQuantifier;
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter};
pub use error::{QueryError, QueryErrorKind};
pub use exec::{
    QueryCapture, QueryCaptures, QueryCursor, QueryCursorOptions, QueryCursorState, QueryExec,
    QueryMatch, QueryMatches, TextFn, TextProvider,
};
pub use query::{Query, QueryBuilder};
