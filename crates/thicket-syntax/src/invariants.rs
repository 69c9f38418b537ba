//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use thicket_core::language::Production;
use thicket_core::Language;

use crate::parser::stack::{Stack, StackEntry};

pub(crate) fn ensure_production(language: &Language, id: u16) -> &Production {
    language.production(id).unwrap_or_else(|| {
        panic!(
            "parse table reduces by production {id}, which does not exist \
             (Language::from_table must reject such tables)"
        )
    })
}

impl Stack {
    pub(crate) fn ensure_pop(&mut self) -> StackEntry {
        self.pop().unwrap_or_else(|| {
            panic!("reduction popped past the bottom of the parse stack (production longer than the stack)")
        })
    }
}
