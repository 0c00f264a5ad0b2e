//! Types and dependency database.
//!
//! While the factory walks exported declarations it feeds every callable and
//! variable to [`TypesDatabase::observe`]. The database remembers two
//! things about the types it sees:
//! - which standard containers are used, so each gets one indexing suite;
//! - which classes travel inside smart pointers, keyed by the pointee's
//!   normalized spelling and split by position (argument, return value,
//!   variable).
//!
//! Holders and smart-pointer registrators are derived from those tables on
//! demand; the queries do not change them.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashSet;
use weave_diagnostic::{Diagnostic, DiagnosticCode};
use weave_ir::{templates, traits, Access, CalldefKind, DeclId, DeclKind, DeclarationGraph, TypeId};

use crate::containers::{self, ContainerKind};
use crate::creators::HeldType;

/// Smart pointer templates recognized unless configured otherwise.
pub const DEFAULT_SMART_PTRS: &[&str] = &["shared_ptr", "auto_ptr", "unique_ptr", "intrusive_ptr"];

/// Where a type was seen.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Position {
    Argument,
    Return,
    Variable,
}

/// One observation of a class inside a smart pointer.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SmartPtrUse {
    /// Template name as spelled (`boost::shared_ptr`).
    pub smart_ptr: String,
    /// The full type the smart pointer was found in.
    pub origin: TypeId,
}

/// A container class seen in an exported signature.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UsedContainer {
    pub class: DeclId,
    pub kind: ContainerKind,
    pub element: Option<TypeId>,
}

/// Creators that let scripts pass a class around inside a smart pointer.
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Registrator {
    SmartPointer {
        smart_ptr: String,
        class: DeclId,
    },
    /// Implicit conversion from `smart_ptr<source>` to `smart_ptr<target>`.
    Converter {
        smart_ptr: String,
        source: DeclId,
        target: DeclId,
    },
}

#[derive(Clone, Debug)]
pub struct TypesDatabase {
    smart_ptrs: Vec<String>,
    arguments: BTreeMap<String, Vec<SmartPtrUse>>,
    returns: BTreeMap<String, Vec<SmartPtrUse>>,
    variables: BTreeMap<String, Vec<SmartPtrUse>>,
    containers: BTreeMap<String, UsedContainer>,
    ambiguous_reported: FxHashSet<DeclId>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for TypesDatabase {
    fn default() -> Self {
        Self::new(DEFAULT_SMART_PTRS.iter().map(|name| (*name).to_owned()).collect())
    }
}

impl TypesDatabase {
    pub fn new(smart_ptrs: Vec<String>) -> Self {
        TypesDatabase {
            smart_ptrs,
            arguments: BTreeMap::new(),
            returns: BTreeMap::new(),
            variables: BTreeMap::new(),
            containers: BTreeMap::new(),
            ambiguous_reported: FxHashSet::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Record the types used by an exported callable or variable.
    pub fn observe(&mut self, graph: &DeclarationGraph, decl: DeclId) {
        match &graph.decl(decl).kind {
            DeclKind::Calldef(calldef) => {
                if calldef.kind != CalldefKind::Constructor {
                    if let Some(ret) = calldef.return_type {
                        self.update(graph, Position::Return, ret);
                    }
                }
                for arg in calldef.argument_types() {
                    self.update(graph, Position::Argument, arg);
                }
            }
            DeclKind::Variable(variable) => self.update(graph, Position::Variable, variable.ty),
            _ => {}
        }
    }

    /// Register a container class directly (the factory does this for
    /// container classes it meets while visiting).
    pub fn register_container(&mut self, graph: &DeclarationGraph, class: DeclId) -> bool {
        let Some(kind) = containers::container_kind(graph, class) else {
            return false;
        };
        let key = class_key(graph, class);
        if self.containers.contains_key(&key) {
            return true;
        }
        let element = containers::element_type(graph, class, kind);
        if element.is_none() {
            tracing::warn!(container = %key, "cannot determine container element type");
            self.diagnostics.push(
                Diagnostic::warning(DiagnosticCode::W4001)
                    .with_declaration(graph.full_name(class))
                    .with_message("element type of the container could not be determined"),
            );
        }
        self.containers.insert(
            key,
            UsedContainer {
                class,
                kind,
                element,
            },
        );
        true
    }

    fn update(&mut self, graph: &DeclarationGraph, position: Position, ty: TypeId) {
        let stripped = traits::remove_cv(
            graph,
            traits::remove_pointer(graph, traits::remove_reference(graph, ty)),
        );
        if let Some(class) = traits::class_or_forward(graph, stripped) {
            if self.register_container(graph, class) {
                return;
            }
        }

        let spelling = templates::normalize(&graph.decl_string(traits::base_type(graph, ty)));
        for (name, args) in templates::split_recursive(&spelling) {
            let Some(pointee) = args.first() else {
                continue;
            };
            if !self.smart_ptrs.iter().any(|smart_ptr| name.contains(smart_ptr.as_str())) {
                continue;
            }
            tracing::trace!(smart_ptr = name, pointee, "observed smart pointer");
            self.table_mut(position)
                .entry(templates::normalize(pointee))
                .or_default()
                .push(SmartPtrUse {
                    smart_ptr: name.to_owned(),
                    origin: ty,
                });
        }
    }

    fn table(&self, position: Position) -> &BTreeMap<String, Vec<SmartPtrUse>> {
        match position {
            Position::Argument => &self.arguments,
            Position::Return => &self.returns,
            Position::Variable => &self.variables,
        }
    }

    fn table_mut(&mut self, position: Position) -> &mut BTreeMap<String, Vec<SmartPtrUse>> {
        match position {
            Position::Argument => &mut self.arguments,
            Position::Return => &mut self.returns,
            Position::Variable => &mut self.variables,
        }
    }

    /// Smart pointer observations of `class` in one position.
    pub fn smart_ptr_uses(
        &self,
        graph: &DeclarationGraph,
        position: Position,
        class: DeclId,
    ) -> &[SmartPtrUse] {
        self.table(position)
            .get(&class_key(graph, class))
            .map_or(&[], Vec::as_slice)
    }

    /// The holder a class needs so scripts can hand it to functions taking
    /// `smart_ptr<T>&`.
    ///
    /// `shared_ptr` wins when several smart pointers qualify; the choice is
    /// reported as ambiguous once per class.
    pub fn create_holder(&mut self, graph: &DeclarationGraph, class: DeclId) -> Option<HeldType> {
        let candidates: BTreeSet<String> = self
            .smart_ptr_uses(graph, Position::Argument, class)
            .iter()
            .filter(|found| {
                traits::is_reference(graph, found.origin)
                    && !traits::is_const(graph, traits::remove_reference(graph, found.origin))
            })
            .map(|found| found.smart_ptr.clone())
            .collect();

        let chosen = candidates
            .iter()
            .find(|name| name.contains("shared_ptr"))
            .or_else(|| candidates.iter().next())
            .cloned()?;

        if candidates.len() > 1 && self.ambiguous_reported.insert(class) {
            let mut diag = Diagnostic::warning(DiagnosticCode::W3001)
                .with_declaration(graph.full_name(class))
                .with_message(format!("several smart pointers could hold the class; using `{chosen}`"));
            for name in &candidates {
                diag = diag.with_note(format!("candidate `{name}`"));
            }
            self.diagnostics.push(diag);
        }

        Some(HeldType {
            smart_ptr: chosen,
            class,
        })
    }

    /// One registrator per smart pointer seen for `class`, plus a
    /// converter to each public base for every such smart pointer.
    pub fn create_registrators(&self, graph: &DeclarationGraph, class: DeclId) -> Vec<Registrator> {
        let smart_ptrs: BTreeSet<&str> = [Position::Argument, Position::Return, Position::Variable]
            .into_iter()
            .flat_map(|position| self.smart_ptr_uses(graph, position, class))
            .map(|found| found.smart_ptr.as_str())
            .collect();

        let public_bases: Vec<DeclId> = traits::recursive_bases(graph, class)
            .into_iter()
            .filter(|base| base.access == Access::Public)
            .map(|base| base.related)
            .collect();

        let mut out = Vec::new();
        for smart_ptr in smart_ptrs {
            out.push(Registrator::SmartPointer {
                smart_ptr: smart_ptr.to_owned(),
                class,
            });
            for base in &public_bases {
                out.push(Registrator::Converter {
                    smart_ptr: smart_ptr.to_owned(),
                    source: class,
                    target: *base,
                });
            }
        }
        out
    }

    /// Containers seen so far, ordered by normalized spelling.
    pub fn used_containers(&self) -> impl Iterator<Item = (&str, &UsedContainer)> {
        self.containers
            .iter()
            .map(|(spelling, container)| (spelling.as_str(), container))
    }

    pub fn is_used_container(&self, graph: &DeclarationGraph, class: DeclId) -> bool {
        self.containers.contains_key(&class_key(graph, class))
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Key a class is stored under: its normalized full name.
pub fn class_key(graph: &DeclarationGraph, class: DeclId) -> String {
    templates::normalize(&graph.full_name(class))
}
