//! String interning for capture names and predicate strings.
//!
//! Ids are dense and assigned in insertion order, so they double as indices
//! into per-name side tables.

use std::collections::HashMap;

/// Handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StringId(u32);

impl StringId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default)]
pub struct Interner {
    map: HashMap<Box<str>, StringId>,
    strings: Vec<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing id for `s`, or assigns the next one.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.map.get(s) {
            return id;
        }
        let id = StringId(self.strings.len() as u32);
        self.strings.push(s.into());
        self.map.insert(s.into(), id);
        id
    }

    /// Looks up `s` without interning it.
    pub fn get(&self, s: &str) -> Option<StringId> {
        self.map.get(s).copied()
    }

    /// # Panics
    /// Panics if the id was not created by this interner.
    #[inline]
    pub fn resolve(&self, id: StringId) -> &str {
        &self.strings[id.as_usize()]
    }

    #[inline]
    pub fn try_resolve(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(|s| &**s)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// All strings in id order.
    pub fn strings(&self) -> impl ExactSizeIterator<Item = &str> {
        self.strings.iter().map(|s| &**s)
    }
}
