//! User annotations on declarations.
//!
//! Annotations are the knobs a user turns before generation: exclude a
//! declaration, rename a class, force a call policy. They are stored next to
//! the graph rather than inside it, keyed by [`DeclId`], and are read-only
//! once the factory starts.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use weave_ir::{DeclId, DeclarationGraph};

use crate::call_policies::CallPolicy;

/// Everything a user can say about one declaration.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeclAnnotations {
    pub ignore: bool,
    pub alias: Option<String>,
    pub call_policies: Option<CallPolicy>,
    pub getter_call_policies: Option<CallPolicy>,
    pub setter_call_policies: Option<CallPolicy>,
    /// The class is only ever handled through opaque pointers.
    pub opaque: bool,
    /// Another module already registers this declaration.
    pub already_exposed: bool,
    pub transformations: Vec<String>,
    /// Virtual functions get a wrapper that lets scripts override them.
    pub overridable: bool,
    pub held_type: Option<String>,
    pub noncopyable: Option<bool>,
}

impl Default for DeclAnnotations {
    fn default() -> Self {
        DeclAnnotations {
            ignore: false,
            alias: None,
            call_policies: None,
            getter_call_policies: None,
            setter_call_policies: None,
            opaque: false,
            already_exposed: false,
            transformations: Vec::new(),
            overridable: true,
            held_type: None,
            noncopyable: None,
        }
    }
}

/// Annotation table for one graph.
#[derive(Clone, Debug, Default)]
pub struct Annotations {
    entries: FxHashMap<DeclId, DeclAnnotations>,
}

static DEFAULT: LazyLock<DeclAnnotations> = LazyLock::new(DeclAnnotations::default);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable annotations of `decl`, created on first use.
    pub fn annotate(&mut self, decl: DeclId) -> &mut DeclAnnotations {
        self.entries.entry(decl).or_default()
    }

    pub fn set(&mut self, decl: DeclId, annotations: DeclAnnotations) {
        self.entries.insert(decl, annotations);
    }

    /// Annotations of `decl`, defaults when none were written.
    pub fn get(&self, decl: DeclId) -> &DeclAnnotations {
        self.entries.get(&decl).unwrap_or(&DEFAULT)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_ignored(&self, decl: DeclId) -> bool {
        self.get(decl).ignore
    }

    pub fn is_opaque(&self, decl: DeclId) -> bool {
        self.get(decl).opaque
    }

    pub fn is_already_exposed(&self, decl: DeclId) -> bool {
        self.get(decl).already_exposed
    }

    pub fn is_overridable(&self, decl: DeclId) -> bool {
        self.get(decl).overridable
    }

    pub fn has_transformations(&self, decl: DeclId) -> bool {
        !self.get(decl).transformations.is_empty()
    }

    /// The name a class is registered under.
    ///
    /// A user alias wins. Otherwise a class with exactly one typedef naming
    /// it takes the typedef's name, and anything else gets an identifier
    /// derived from its own name.
    pub fn class_alias(&self, graph: &DeclarationGraph, class: DeclId) -> String {
        if let Some(alias) = &self.get(class).alias {
            return alias.clone();
        }
        let decl = graph.decl(class);
        if let Some(info) = decl.as_class() {
            if let [alias] = info.aliases.as_slice() {
                return graph.decl(*alias).name.clone();
            }
        }
        valid_identifier(&decl.name)
    }
}

/// Spell `name` as a C++ identifier (`vector< int >` → `vector_less__int__greater_`).
pub fn valid_identifier(name: &str) -> String {
    const REPLACEMENTS: &[(&str, &str)] = &[
        ("::", "_scope_"),
        ("<", "_less_"),
        (">", "_greater_"),
        (",", "_comma_"),
        ("*", "_ptr_"),
        ("&", "_ref_"),
        ("(", "_obrace_"),
        (")", "_cbrace_"),
        ("[", "_obracket_"),
        ("]", "_cbracket_"),
        ("=", "_assign_"),
        ("-", "_minus_"),
        ("+", "_plus_"),
        (".", "_dot_"),
        (" ", "_"),
    ];
    let mut out = name.trim().to_owned();
    for (from, to) in REPLACEMENTS {
        out = out.replace(from, to);
    }
    if out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests;
