//! Which children and fields a node kind can have, derived from the
//! language's productions.
//!
//! Hidden symbols never appear in trees, so their productions are flattened
//! into the parent. A field assigned to a hidden child is inherited by its
//! visible descendants unless they carry a field of their own.

use std::collections::{HashMap, HashSet};

use thicket_core::language::Production;
use thicket_core::{FieldId, Language, SYMBOL_ERROR, Symbol};

/// Possible `(field, child kind)` pairs for one parent kind.
#[derive(Debug, Default)]
pub struct ChildSet {
    pairs: HashSet<(Option<FieldId>, Symbol)>,
    fields: HashSet<FieldId>,
}

impl ChildSet {
    pub fn has_field(&self, field: FieldId) -> bool {
        self.fields.contains(&field)
    }

    pub fn allows(&self, field: Option<FieldId>, child: Symbol) -> bool {
        match field {
            Some(_) => self.pairs.contains(&(field, child)),
            None => self.pairs.iter().any(|&(_, symbol)| symbol == child),
        }
    }
}

/// The visible children one production of a parent kind always has, in
/// order, with the field each sits in.
pub type Layout = Vec<(Option<FieldId>, Symbol)>;

/// Lazily computed child sets, shared by every pattern of a query.
pub struct Structure<'a> {
    language: &'a Language,
    cache: HashMap<Symbol, ChildSet>,
    layouts: HashMap<Symbol, Vec<Layout>>,
}

impl<'a> Structure<'a> {
    pub fn new(language: &'a Language) -> Self {
        Self {
            language,
            cache: HashMap::new(),
            layouts: HashMap::new(),
        }
    }

    /// Extras and errors can appear under any node.
    pub fn always_allowed(&self, child: Symbol) -> bool {
        child == SYMBOL_ERROR || self.language.is_extra(child)
    }

    pub fn children_of(&mut self, parent: Symbol) -> &ChildSet {
        let language = self.language;
        self.cache.entry(parent).or_insert_with(|| {
            let mut set = ChildSet::default();
            let mut visiting = HashSet::new();
            collect(language, parent, None, &mut visiting, &mut set);
            set
        })
    }

    /// One layout per production of `parent`. Hidden children with more
    /// than one production may hold anything, so they contribute nothing.
    pub fn layouts(&mut self, parent: Symbol) -> &[Layout] {
        let language = self.language;
        self.layouts.entry(parent).or_insert_with(|| {
            language
                .productions()
                .iter()
                .filter(|p| p.lhs == parent)
                .map(|production| {
                    let mut layout = Vec::new();
                    let mut visiting = HashSet::from([parent]);
                    flatten(language, production, None, &mut visiting, &mut layout);
                    layout
                })
                .collect()
        })
    }

    /// Every concrete kind a symbol stands for: itself, or for a supertype
    /// all of its subtypes, transitively.
    pub fn concrete_kinds(&self, symbol: Symbol) -> Vec<Symbol> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        expand(self.language, symbol, &mut seen, &mut out);
        out
    }

    pub fn is_subtype(&self, supertype: Symbol, subtype: Symbol) -> bool {
        self.concrete_kinds(supertype).contains(&subtype)
            || self.language.subtypes(supertype).contains(&subtype)
    }
}

fn expand(language: &Language, symbol: Symbol, seen: &mut HashSet<Symbol>, out: &mut Vec<Symbol>) {
    if !seen.insert(symbol) {
        return;
    }
    if language.symbol_metadata(symbol).supertype {
        for &subtype in language.subtypes(symbol) {
            expand(language, subtype, seen, out);
        }
    } else if !out.contains(&symbol) {
        out.push(symbol);
    }
}

fn collect(
    language: &Language,
    symbol: Symbol,
    inherited: Option<FieldId>,
    visiting: &mut HashSet<(Symbol, Option<FieldId>)>,
    set: &mut ChildSet,
) {
    if !visiting.insert((symbol, inherited)) {
        return;
    }
    for production in language.productions().iter().filter(|p| p.lhs == symbol) {
        let mut structural = 0;
        for &child in &production.children {
            if language.is_extra(child) {
                continue;
            }
            let field = production.field_for_child(structural).or(inherited);
            structural += 1;
            if let Some(field) = field {
                set.fields.insert(field);
            }
            if language.symbol_metadata(child).visible {
                set.pairs.insert((field, child));
            } else {
                collect(language, child, field, visiting, set);
            }
        }
    }
}

fn flatten(
    language: &Language,
    production: &Production,
    inherited: Option<FieldId>,
    visiting: &mut HashSet<Symbol>,
    layout: &mut Layout,
) {
    let mut structural = 0;
    for &child in &production.children {
        if language.is_extra(child) {
            continue;
        }
        let field = production.field_for_child(structural).or(inherited);
        structural += 1;
        if language.symbol_metadata(child).visible {
            layout.push((field, child));
            continue;
        }

        let mut productions = language.productions().iter().filter(|p| p.lhs == child);
        if let (Some(only), None) = (productions.next(), productions.next())
            && visiting.insert(child)
        {
            flatten(language, only, field, visiting, layout);
            visiting.remove(&child);
        }
    }
}
