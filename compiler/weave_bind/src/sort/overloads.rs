//! Ordering of overloaded callables.
//!
//! The binding library tries overloads in reverse registration order and
//! takes the first that accepts the arguments, so the more specific
//! overload is registered last: `f(Widget)` comes before `f(Widget*)`,
//! and `f(int)` before `f(bool)`. Overloads sharing a name and required
//! arity are grouped and ordered by how their last required argument
//! types relate.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use weave_ir::{traits, DeclId, DeclarationGraph, TypeId};

/// How two argument types should be ordered, if they are related at all.
pub fn is_related(graph: &DeclarationGraph, left: TypeId, right: TypeId) -> Option<Ordering> {
    let left_ptr = traits::is_pointer(graph, left);
    let right_ptr = traits::is_pointer(graph, right);
    match (left_ptr, right_ptr) {
        (true, true) => is_related(
            graph,
            traits::remove_pointer(graph, left),
            traits::remove_pointer(graph, right),
        ),
        (true, false) => {
            let pointee = traits::remove_cv(graph, traits::remove_pointer(graph, left));
            let value = value_type(graph, right);
            traits::is_same(graph, pointee, value).then_some(Ordering::Greater)
        }
        (false, true) => {
            let value = value_type(graph, left);
            let pointee = traits::remove_cv(graph, traits::remove_pointer(graph, right));
            traits::is_same(graph, value, pointee).then_some(Ordering::Less)
        }
        (false, false) => {
            let left_int = traits::is_integral(graph, left) && !traits::is_bool(graph, left);
            let right_int = traits::is_integral(graph, right) && !traits::is_bool(graph, right);
            if left_int && traits::is_bool(graph, right) {
                Some(Ordering::Less)
            } else if traits::is_bool(graph, left) && right_int {
                Some(Ordering::Greater)
            } else {
                None
            }
        }
    }
}

/// `T`, `T const` and `T&` all pass a `T` by value or reference.
fn value_type(graph: &DeclarationGraph, ty: TypeId) -> TypeId {
    traits::remove_cv(graph, traits::remove_reference(graph, ty))
}

fn compare_overloads(graph: &DeclarationGraph, left: DeclId, right: DeclId) -> Ordering {
    let last = |decl: DeclId| {
        graph
            .decl(decl)
            .as_calldef()
            .and_then(|calldef| calldef.required_args().last())
            .map(|arg| arg.ty)
    };
    let related = match (last(left), last(right)) {
        (Some(l), Some(r)) => is_related(graph, l, r),
        _ => None,
    };
    related.unwrap_or_else(|| source_line(graph, left).cmp(&source_line(graph, right)))
}

fn source_line(graph: &DeclarationGraph, decl: DeclId) -> u32 {
    graph.decl(decl).location.as_ref().map_or(0, |loc| loc.line)
}

/// Group key: name and required arity. `None` collects ungrouped decls.
type GroupKey = Option<(String, usize)>;

/// Reorder callables so related overloads register in a safe order.
///
/// Output: ungrouped declarations in input order, then each group (sorted
/// by key) in overload order.
pub fn sort_overloads(graph: &DeclarationGraph, decls: &[DeclId]) -> Vec<DeclId> {
    let mut groups: BTreeMap<GroupKey, Vec<DeclId>> = BTreeMap::new();
    for decl in decls {
        let key = graph.decl(*decl).as_calldef().and_then(|calldef| {
            let required = calldef.required_args().len();
            (required > 0).then(|| (graph.decl(*decl).name.clone(), required))
        });
        groups.entry(key).or_default().push(*decl);
    }

    let singletons: Vec<GroupKey> = groups
        .iter()
        .filter(|(key, members)| key.is_some() && members.len() == 1)
        .map(|(key, _)| key.clone())
        .collect();
    let mut ungrouped: Vec<DeclId> = groups.remove(&None).unwrap_or_default();
    for key in singletons {
        if let Some(members) = groups.remove(&key) {
            ungrouped.extend(members);
        }
    }
    // Singletons rejoin the ungrouped set in input order.
    let position = |decl: &DeclId| decls.iter().position(|d| d == decl);
    ungrouped.sort_by_key(position);

    let mut out = ungrouped;
    for (_, mut members) in groups {
        insertion_sort(&mut members, |l, r| compare_overloads(graph, *l, *r));
        out.extend(members);
    }
    out
}

/// Stable insertion sort: neighbours move only when strictly greater, so
/// unrelated declarations keep their relative order.
fn insertion_sort<T>(items: &mut [T], mut compare: impl FnMut(&T, &T) -> Ordering) {
    for index in 1..items.len() {
        let mut current = index;
        while current > 0 && compare(&items[current - 1], &items[current]) == Ordering::Greater {
            items.swap(current - 1, current);
            current -= 1;
        }
    }
}
