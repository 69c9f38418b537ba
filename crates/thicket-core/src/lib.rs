//! Core types shared by the Thicket parser and query engine.
//!
//! - Positions: [`Point`], [`Range`], [`Length`] and [`InputEdit`]
//! - Language tables: [`Language`], built with [`LanguageBuilder`] or
//!   loaded from bytes
//! - [`LookaheadIterator`] over the symbols legal in a parse state

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::num::NonZeroU16;

pub mod language;
mod interner;
mod lookahead;
mod position;

#[cfg(test)]
mod interner_tests;
#[cfg(test)]
mod lookahead_tests;
#[cfg(test)]
mod position_tests;

pub use interner::{Interner, StringId};
pub use language::{
    LANGUAGE_VERSION, Language, LanguageBuilder, LanguageError, MIN_COMPATIBLE_LANGUAGE_VERSION,
    SYMBOL_END, SYMBOL_ERROR, SymbolType,
};
pub use lookahead::LookaheadIterator;
pub use position::{InputEdit, Length, Point, Range, extent_of};

/// Grammar symbol id. Terminals and non-terminals share one space.
pub type Symbol = u16;

/// Field id. Zero is reserved for "no field".
pub type FieldId = NonZeroU16;

/// Parse automaton state id.
pub type StateId = u16;
