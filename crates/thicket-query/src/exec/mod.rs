//! Running compiled queries against syntax trees.

mod cursor;
mod matcher;
mod text;

#[cfg(test)]
mod matcher_tests;

pub use cursor::{
    QueryCapture, QueryCaptures, QueryCursor, QueryCursorOptions, QueryCursorState, QueryExec,
    QueryMatch, QueryMatches,
};
pub use text::{TextFn, TextProvider};
