pub mod check;
pub mod input;
pub mod lang_resolver;
pub mod langs;
pub mod lookahead;
pub mod parse;
pub mod query;

#[cfg(test)]
mod parse_tests;
#[cfg(test)]
mod query_tests;
