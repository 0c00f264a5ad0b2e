//! Topological ordering of classes.
//!
//! A class must be registered after everything its registration mentions:
//! its bases, classes used as default argument values, enumerations used
//! as argument types and, optionally, the types of its member variables.
//! Nested classes are folded into their owners: an edge to a nested class
//! is an edge to the nearest enclosing class among those being sorted.

use rustc_hash::{FxHashMap, FxHashSet};
use weave_ir::{traits, DeclId, DeclKind, DeclarationGraph};

/// A dependency edge that closes a cycle. The ordering ignores it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SortCycle {
    pub from: DeclId,
    pub to: DeclId,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ClassOrder {
    /// Classes, every class after the classes it depends on.
    pub classes: Vec<DeclId>,
    pub cycles: Vec<SortCycle>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Color {
    White,
    Gray,
    Black,
}

/// Order `classes` so each follows its dependencies.
///
/// Classes are visited in order of their fully qualified names, and so are
/// the dependencies of each class, which makes the result independent of
/// input order. Dependencies outside `classes` are ignored.
pub fn sort_classes(graph: &DeclarationGraph, classes: &[DeclId], include_vars: bool) -> ClassOrder {
    let mut names: Vec<(String, DeclId)> = classes
        .iter()
        .filter(|id| graph.decl(**id).is_class())
        .map(|id| (graph.full_name(*id), *id))
        .collect();
    names.sort();
    names.dedup_by_key(|(_, id)| *id);

    let members: FxHashSet<DeclId> = names.iter().map(|(_, id)| *id).collect();
    let edges: FxHashMap<DeclId, Vec<DeclId>> = names
        .iter()
        .map(|(_, id)| {
            let mut deps: Vec<DeclId> = class_dependencies(graph, *id, include_vars)
                .into_iter()
                .filter_map(|dep| owner_in(graph, &members, dep))
                .filter(|dep| dep != id)
                .collect();
            deps.sort_by_cached_key(|dep| graph.full_name(*dep));
            deps.dedup();
            (*id, deps)
        })
        .collect();

    let mut colors: FxHashMap<DeclId, Color> =
        names.iter().map(|(_, id)| (*id, Color::White)).collect();
    let mut order = ClassOrder::default();

    for (_, start) in &names {
        if colors[start] != Color::White {
            continue;
        }
        // Stack entries: (class, index of the next edge to follow).
        let mut stack: Vec<(DeclId, usize)> = vec![(*start, 0)];
        colors.insert(*start, Color::Gray);
        while let Some(&mut (class, ref mut next)) = stack.last_mut() {
            let deps = &edges[&class];
            if *next == deps.len() {
                colors.insert(class, Color::Black);
                order.classes.push(class);
                stack.pop();
                continue;
            }
            let dep = deps[*next];
            *next += 1;
            match colors[&dep] {
                Color::White => {
                    colors.insert(dep, Color::Gray);
                    stack.push((dep, 0));
                }
                Color::Gray if dep != class => {
                    tracing::debug!(
                        from = %graph.full_name(class),
                        to = %graph.full_name(dep),
                        "class dependency cycle"
                    );
                    order.cycles.push(SortCycle {
                        from: class,
                        to: dep,
                    });
                }
                Color::Gray | Color::Black => {}
            }
        }
    }
    order
}

/// The class of `members` that registers `dep`: `dep` itself or its
/// nearest enclosing class in the set.
fn owner_in(graph: &DeclarationGraph, members: &FxHashSet<DeclId>, dep: DeclId) -> Option<DeclId> {
    std::iter::successors(Some(dep), |current| graph.parent_class(*current))
        .find(|candidate| members.contains(candidate))
}

/// Classes `class` depends on, nested members included.
///
/// Bases are returned as declared. Other targets are the class a
/// dependency is registered with (an enumeration's enclosing class).
pub fn class_dependencies(graph: &DeclarationGraph, class: DeclId, include_vars: bool) -> Vec<DeclId> {
    let mut out = Vec::new();
    for member in graph.flatten(class) {
        let decl = graph.decl(member);
        match &decl.kind {
            DeclKind::Class(info) => {
                out.extend(info.bases.iter().map(|base| base.related));
            }
            DeclKind::Calldef(calldef) => {
                for arg in &calldef.arguments {
                    if let Some(enumeration) = traits::enum_declaration(graph, arg.ty) {
                        out.extend(graph.parent_class(enumeration));
                        continue;
                    }
                    let Some(default) = arg.default_value.as_deref() else {
                        continue;
                    };
                    if traits::is_pointer(graph, arg.ty) && is_null_literal(default) {
                        continue;
                    }
                    let base = traits::base_type(graph, arg.ty);
                    if let Some(target) = traits::class_or_forward(graph, base) {
                        out.push(target);
                    }
                }
            }
            DeclKind::Variable(variable) if include_vars => {
                if traits::is_pointer(graph, variable.ty) {
                    continue;
                }
                let base = traits::base_type(graph, variable.ty);
                if let Some(target) = traits::class_or_forward(graph, base) {
                    out.push(target);
                }
            }
            _ => {}
        }
    }
    out.retain(|dep| *dep != class);
    out
}

fn is_null_literal(value: &str) -> bool {
    matches!(value.trim(), "0" | "NULL" | "nullptr" | "0l" | "0L")
}
