//! Dependency manager.
//!
//! Tracks every declaration the factory exports and, at the end of a run,
//! reports declarations that exported code depends on but that nobody
//! exposes. Such code compiles, but fails at import time in the scripting
//! runtime, so the report names every dependent to make the fix obvious.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use weave_diagnostic::{Diagnostic, DiagnosticCode};
use weave_ir::{
    templates, traits, Access, CalldefKind, DeclId, DeclKind, DeclarationGraph, TypeId,
};

use crate::annotations::Annotations;
use crate::types_db::DEFAULT_SMART_PTRS;

/// How a declaration depends on another.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DependencyRole {
    BaseClass,
    ReturnType,
    Argument,
    Exception,
    VariableType,
    TypedefType,
}

impl DependencyRole {
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyRole::BaseClass => "base class",
            DependencyRole::ReturnType => "return type",
            DependencyRole::Argument => "argument type",
            DependencyRole::Exception => "exception type",
            DependencyRole::VariableType => "variable type",
            DependencyRole::TypedefType => "typedef type",
        }
    }
}

/// One edge from an exported declaration to something it uses.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Dependency {
    pub dependent: DeclId,
    pub depends_on: DeclId,
    pub role: DependencyRole,
}

#[derive(Clone, Debug)]
pub struct DependencyManager {
    exported: Vec<DeclId>,
    exported_set: FxHashSet<DeclId>,
    smart_ptrs: Vec<String>,
}

impl Default for DependencyManager {
    fn default() -> Self {
        Self::new(DEFAULT_SMART_PTRS.iter().map(|name| (*name).to_owned()).collect())
    }
}

impl DependencyManager {
    pub fn new(smart_ptrs: Vec<String>) -> Self {
        DependencyManager {
            exported: Vec::new(),
            exported_set: FxHashSet::default(),
            smart_ptrs,
        }
    }

    pub fn add_exported(&mut self, decl: DeclId) {
        if self.exported_set.insert(decl) {
            self.exported.push(decl);
        }
    }

    pub fn is_exported(&self, decl: DeclId) -> bool {
        self.exported_set.contains(&decl)
    }

    /// Exported declarations in registration order.
    pub fn exported(&self) -> &[DeclId] {
        &self.exported
    }

    /// Direct dependencies of one declaration.
    pub fn dependencies(
        &self,
        graph: &DeclarationGraph,
        annotations: &Annotations,
        decl: DeclId,
    ) -> Vec<Dependency> {
        self.dependencies_with(&TypeIndex::new(graph), annotations, decl)
    }

    fn dependencies_with(
        &self,
        index: &TypeIndex<'_>,
        annotations: &Annotations,
        decl: DeclId,
    ) -> Vec<Dependency> {
        let graph = index.graph;
        let mut types: Vec<(TypeId, DependencyRole)> = Vec::new();
        let mut out = Vec::new();
        match &graph.decl(decl).kind {
            DeclKind::Class(class) => {
                for base in &class.bases {
                    if base.access != Access::Private {
                        out.push(Dependency {
                            dependent: decl,
                            depends_on: base.related,
                            role: DependencyRole::BaseClass,
                        });
                    }
                }
            }
            DeclKind::Calldef(calldef) => {
                if calldef.kind != CalldefKind::Constructor {
                    if let Some(ret) = calldef.return_type {
                        types.push((ret, DependencyRole::ReturnType));
                    }
                }
                types.extend(calldef.argument_types().map(|ty| (ty, DependencyRole::Argument)));
                types.extend(
                    calldef
                        .exceptions
                        .iter()
                        .map(|ty| (*ty, DependencyRole::Exception)),
                );
            }
            DeclKind::Variable(variable) => types.push((variable.ty, DependencyRole::VariableType)),
            DeclKind::Typedef { ty } => types.push((*ty, DependencyRole::TypedefType)),
            DeclKind::Namespace(_) | DeclKind::ClassDeclaration | DeclKind::Enumeration(_) => {}
        }

        for (ty, role) in types {
            if let Some(target) = self.declaration_of(index, ty) {
                out.push(Dependency {
                    dependent: decl,
                    depends_on: target,
                    role,
                });
            }
        }
        out.retain(|dep| self.is_interesting(graph, annotations, dep.depends_on));
        out
    }

    /// The declaration a type refers to, seeing through smart pointers.
    fn declaration_of(&self, index: &TypeIndex<'_>, ty: TypeId) -> Option<DeclId> {
        let graph = index.graph;
        let base = traits::base_type(graph, ty);
        let target = traits::remove_declarated(graph, base)?;
        let name = &graph.decl(target).name;
        let is_smart_ptr = templates::is_instantiation(name)
            && self
                .smart_ptrs
                .iter()
                .any(|smart_ptr| templates::name(name).ends_with(smart_ptr.as_str()));
        if !is_smart_ptr {
            return Some(target);
        }
        let pointee = templates::normalize(templates::args(name).first()?);
        index.lookup(&pointee)
    }

    fn is_interesting(&self, graph: &DeclarationGraph, annotations: &Annotations, decl: DeclId) -> bool {
        if annotations.is_already_exposed(decl) || annotations.is_opaque(decl) {
            return false;
        }
        let full_name = templates::normalize(&graph.full_name(decl));
        if let Some(rest) = full_name.strip_prefix("std::") {
            return templates::name(rest) == "pair";
        }
        true
    }

    /// Diagnostics for alias collisions and unexposed dependencies.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn inform_user(&self, graph: &DeclarationGraph, annotations: &Annotations) -> Vec<Diagnostic> {
        let mut diagnostics = self.alias_collisions(graph, annotations);

        // Group by depended-on declaration, ordered by its full name.
        let mut unexposed: BTreeMap<String, (DeclId, Vec<Dependency>)> = BTreeMap::new();
        let index = TypeIndex::new(graph);
        for decl in &self.exported {
            for dep in self.dependencies_with(&index, annotations, *decl) {
                if self.is_exported(dep.depends_on) {
                    continue;
                }
                unexposed
                    .entry(graph.full_name(dep.depends_on))
                    .or_insert_with(|| (dep.depends_on, Vec::new()))
                    .1
                    .push(dep);
            }
        }

        for (name, (_, dependents)) in unexposed {
            tracing::debug!(declaration = %name, dependents = dependents.len(), "unexposed dependency");
            let mut diag = Diagnostic::warning(DiagnosticCode::W2000)
                .with_declaration(name.clone())
                .with_message(format!("`{name}` is used by exported code but is not exposed"));
            for dep in dependents {
                diag = diag.with_note(format!(
                    "{} of `{}`",
                    dep.role.as_str(),
                    graph.full_name(dep.dependent)
                ));
            }
            diagnostics.push(diag);
        }
        diagnostics
    }

    /// Exported namespace-level classes that would register under the
    /// same name.
    fn alias_collisions(&self, graph: &DeclarationGraph, annotations: &Annotations) -> Vec<Diagnostic> {
        let mut by_alias: BTreeMap<String, Vec<DeclId>> = BTreeMap::new();
        for decl in &self.exported {
            let is_namespace_class = graph.decl(*decl).is_class()
                && graph
                    .parent(*decl)
                    .is_some_and(|parent| graph.decl(parent).is_namespace());
            if is_namespace_class {
                by_alias
                    .entry(annotations.class_alias(graph, *decl))
                    .or_default()
                    .push(*decl);
            }
        }

        by_alias
            .into_iter()
            .filter(|(_, classes)| classes.len() > 1)
            .map(|(alias, classes)| {
                let mut diag = Diagnostic::warning(DiagnosticCode::W2001)
                    .with_declaration(graph.full_name(classes[0]))
                    .with_message(format!("{} classes are registered as `{alias}`", classes.len()));
                for class in classes {
                    diag = diag.with_note(format!("`{}`", graph.full_name(class)));
                }
                diag
            })
            .collect()
    }
}

/// Classes and enumerations by normalized full name, built on the first
/// smart-pointer lookup. The first declaration in arena order wins.
struct TypeIndex<'a> {
    graph: &'a DeclarationGraph,
    by_name: OnceCell<FxHashMap<String, DeclId>>,
}

impl<'a> TypeIndex<'a> {
    fn new(graph: &'a DeclarationGraph) -> Self {
        TypeIndex {
            graph,
            by_name: OnceCell::new(),
        }
    }

    fn lookup(&self, normalized: &str) -> Option<DeclId> {
        self.by_name
            .get_or_init(|| {
                let graph = self.graph;
                let mut by_name = FxHashMap::default();
                for id in graph.decl_ids() {
                    if matches!(
                        graph.decl(id).kind,
                        DeclKind::Class(_) | DeclKind::ClassDeclaration | DeclKind::Enumeration(_)
                    ) {
                        by_name
                            .entry(templates::normalize(&graph.full_name(id)))
                            .or_insert(id);
                    }
                }
                by_name
            })
            .get(normalized)
            .copied()
    }

    #[cfg(test)]
    fn is_built(&self) -> bool {
        self.by_name.get().is_some()
    }
}

#[cfg(test)]
mod tests;
