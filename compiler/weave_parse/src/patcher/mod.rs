//! Patcher: post-link repair of literals the dump spells ambiguously.
//!
//! Compilers print default arguments the way they appear in source, so a
//! default of `red` for a `ui::Color` argument is unusable from any other
//! scope. The patcher rewrites such literals into fully qualified
//! expressions and gives casting operators their real names. All string
//! work lives in [`rules`]; this module decides which rule applies to which
//! argument by looking at the argument's type.

pub mod rules;

use weave_ir::{traits, CalldefKind, DeclId, DeclKind, DeclarationGraph, TypeId};

/// What a [`patch`] run changed.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct PatchReport {
    pub defaults_rewritten: usize,
    pub operators_renamed: usize,
}

/// A pending rewrite, computed under a shared borrow and applied after.
enum Fix {
    Default {
        decl: DeclId,
        argument: usize,
        value: String,
    },
    Rename {
        decl: DeclId,
        name: String,
    },
}

/// Repair default values and casting-operator names in place.
///
/// The graph remembers that it was patched; later calls return an empty
/// report without touching it.
#[tracing::instrument(level = "debug", skip_all)]
pub fn patch(graph: &mut DeclarationGraph) -> PatchReport {
    if graph.is_patched() {
        tracing::debug!("graph already patched");
        return PatchReport::default();
    }

    let fixes = collect_fixes(graph);
    let mut report = PatchReport::default();
    for fix in fixes {
        match fix {
            Fix::Default {
                decl,
                argument,
                value,
            } => {
                if let DeclKind::Calldef(calldef) = &mut graph.decl_mut(decl).kind {
                    calldef.arguments[argument].default_value = Some(value);
                    report.defaults_rewritten += 1;
                }
            }
            Fix::Rename { decl, name } => {
                graph.decl_mut(decl).name = name;
                report.operators_renamed += 1;
            }
        }
    }

    graph.mark_patched();
    tracing::debug!(
        defaults = report.defaults_rewritten,
        operators = report.operators_renamed,
        "patched graph"
    );
    report
}

fn collect_fixes(graph: &DeclarationGraph) -> Vec<Fix> {
    let mut fixes = Vec::new();
    for (id, decl) in graph.iter() {
        let Some(calldef) = decl.as_calldef() else {
            continue;
        };

        for (index, argument) in calldef.arguments.iter().enumerate() {
            let Some(value) = argument.default_value.as_deref() else {
                continue;
            };
            if let Some(fixed) = fix_default(graph, id, argument.ty, value) {
                if fixed != value {
                    tracing::trace!(from = value, to = %fixed, "rewriting default value");
                    fixes.push(Fix::Default {
                        decl: id,
                        argument: index,
                        value: fixed,
                    });
                }
            }
        }

        if calldef.kind == CalldefKind::CastingOperator {
            if let Some(ret) = calldef.return_type {
                let name = format!("operator {}", graph.decl_string(ret));
                if name != decl.name {
                    fixes.push(Fix::Rename { decl: id, name });
                }
            }
        }
    }
    fixes
}

/// Rewrites are chained until no rule changes the value, so
/// `Point(Point(0, 0))` collapses and is then qualified.
fn fix_default(graph: &DeclarationGraph, func: DeclId, ty: TypeId, value: &str) -> Option<String> {
    let mut current = apply_first_rule(graph, func, ty, value)?;
    for _ in 0..MAX_REWRITES {
        match apply_first_rule(graph, func, ty, &current) {
            Some(next) if next != current => current = next,
            _ => break,
        }
    }
    Some(current)
}

/// Each rule either qualifies a name or removes a wrapper, so a handful of
/// passes always reaches a fixed point.
const MAX_REWRITES: usize = 4;

/// The first rule that applies to `value` wins.
fn apply_first_rule(graph: &DeclarationGraph, func: DeclId, ty: TypeId, value: &str) -> Option<String> {
    fix_unqualified_enum(graph, ty, value)
        .or_else(|| rules::collapse_double_call(value))
        .or_else(|| fix_invalid_integral(graph, func, ty, value))
        .or_else(|| fix_constructor_call(graph, ty, value))
}

/// `red` for an argument of type `ui::Color` → `::ui::red`.
fn fix_unqualified_enum(graph: &DeclarationGraph, ty: TypeId, value: &str) -> Option<String> {
    let value = value.trim();
    let enum_id = traits::enum_declaration(graph, traits::remove_reference(graph, ty))?;
    let values = graph.decl(enum_id).as_enumeration()?;
    if !values.has_value_name(value) {
        return None;
    }
    Some(rules::join_scope(&scope_name(graph, enum_id), value))
}

fn fix_invalid_integral(
    graph: &DeclarationGraph,
    func: DeclId,
    ty: TypeId,
    value: &str,
) -> Option<String> {
    let ty = traits::remove_reference(graph, ty);
    if !traits::is_integral(graph, ty) || rules::is_valid_integral(value) {
        return None;
    }
    if let Some(fixed) = rules::strip_integral_suffix(value) {
        return Some(fixed);
    }
    if let Some(fixed) = rules::prefix_bare_hex(value) {
        return Some(fixed);
    }

    let name = rules::unqualified_name(value)?;
    let enum_id = enclosing_scopes(graph, func).find_map(|scope| {
        graph.enumerations_in(scope).find(|candidate| {
            graph
                .decl(*candidate)
                .as_enumeration()
                .is_some_and(|e| e.has_value_name(name))
        })
    })?;

    let spelling = graph.decl_string(ty);
    let multi_word = traits::is_fundamental(graph, ty) && spelling.contains(' ');
    Some(rules::cast_to(
        &spelling,
        multi_word,
        &rules::join_scope(&scope_name(graph, enum_id), name),
    ))
}

/// `Point(1, 2)` for an argument of class `geo::Point` → `::geo::Point(1, 2)`.
fn fix_constructor_call(graph: &DeclarationGraph, ty: TypeId, value: &str) -> Option<String> {
    let (name, _) = rules::split_call(value)?;
    let class_id = traits::class_declaration(graph, traits::base_type(graph, ty))?;
    let class = graph.decl(class_id);
    let open = value.find('(')?;
    let call = &value[open..];

    if class.name == name {
        return Some(format!(
            "{}{call}",
            rules::join_scope(&scope_name(graph, class_id), name)
        ));
    }

    let info = class.as_class()?;
    let matching: Vec<_> = info
        .aliases
        .iter()
        .copied()
        .filter(|alias| graph.decl(*alias).name == name)
        .collect();
    let qualified = match matching.as_slice() {
        [] => return None,
        [alias] => rules::join_scope(&scope_name(graph, *alias), name),
        _ => rules::join_scope(&scope_name(graph, class_id), &class.name),
    };
    Some(format!("{qualified}{call}"))
}

/// Full name of the scope that declares `decl`.
fn scope_name(graph: &DeclarationGraph, decl: DeclId) -> String {
    graph
        .parent(decl)
        .map_or_else(|| "::".to_owned(), |parent| graph.full_name(parent))
}

/// Scopes enclosing `decl`, innermost first.
fn enclosing_scopes(graph: &DeclarationGraph, decl: DeclId) -> impl Iterator<Item = DeclId> + '_ {
    std::iter::successors(graph.parent(decl), |scope| graph.parent(*scope))
}
