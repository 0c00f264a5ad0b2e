//! Structural queries over types and classes.
//!
//! Every query sees through typedefs first: a `Declarated` type naming a
//! typedef is replaced by the aliased type before the query looks at it.
//! The graph is never modified, so "removing" a layer means returning the
//! [`TypeId`] underneath it.

use rustc_hash::FxHashSet;

use crate::{
    templates, Access, CalldefKind, DeclId, DeclKind, DeclarationGraph, FundamentalKind,
    HierarchyInfo, Type, TypeId,
};

// ── Layer stripping ─────────────────────────────────────────────

/// Chase typedefs until the type no longer names one.
pub fn remove_alias(graph: &DeclarationGraph, mut ty: TypeId) -> TypeId {
    // A typedef cycle cannot come out of a compiler dump; the bound only
    // keeps a corrupt graph from looping.
    for _ in 0..graph.type_count() + 1 {
        match graph.ty(ty) {
            Type::Declarated(decl) => match &graph.decl(*decl).kind {
                DeclKind::Typedef { ty: aliased } => ty = *aliased,
                _ => return ty,
            },
            _ => return ty,
        }
    }
    ty
}

/// Strip typedefs and one cv-qualification layer.
pub fn remove_cv(graph: &DeclarationGraph, ty: TypeId) -> TypeId {
    let ty = remove_alias(graph, ty);
    match graph.ty(ty) {
        Type::Cv { base, .. } => remove_alias(graph, *base),
        _ => ty,
    }
}

pub fn is_const(graph: &DeclarationGraph, ty: TypeId) -> bool {
    matches!(
        graph.ty(remove_alias(graph, ty)),
        Type::Cv { is_const: true, .. }
    )
}

pub fn is_pointer(graph: &DeclarationGraph, ty: TypeId) -> bool {
    matches!(graph.ty(remove_cv(graph, ty)), Type::Pointer(_))
}

/// The pointee of a pointer, or `ty` unchanged.
pub fn remove_pointer(graph: &DeclarationGraph, ty: TypeId) -> TypeId {
    match graph.ty(remove_cv(graph, ty)) {
        Type::Pointer(base) => *base,
        _ => ty,
    }
}

pub fn is_reference(graph: &DeclarationGraph, ty: TypeId) -> bool {
    matches!(graph.ty(remove_alias(graph, ty)), Type::Reference(_))
}

/// The referent of a reference, or `ty` unchanged.
pub fn remove_reference(graph: &DeclarationGraph, ty: TypeId) -> TypeId {
    match graph.ty(remove_alias(graph, ty)) {
        Type::Reference(base) => *base,
        _ => ty,
    }
}

pub fn is_array(graph: &DeclarationGraph, ty: TypeId) -> bool {
    matches!(graph.ty(remove_cv(graph, ty)), Type::Array { .. })
}

/// Extent of an array type. `None` for non-arrays and `T[]`.
pub fn array_size(graph: &DeclarationGraph, ty: TypeId) -> Option<u64> {
    match graph.ty(remove_cv(graph, ty)) {
        Type::Array { size, .. } => *size,
        _ => None,
    }
}

/// The element type of an array, or `ty` unchanged.
pub fn array_item_type(graph: &DeclarationGraph, ty: TypeId) -> TypeId {
    match graph.ty(remove_cv(graph, ty)) {
        Type::Array { base, .. } => *base,
        _ => ty,
    }
}

/// Strip every alias, cv, pointer, reference and array layer.
///
/// Like [`remove_alias`], a typedef that reaches itself through a pointer
/// stops after one step per type in the graph.
pub fn base_type(graph: &DeclarationGraph, ty: TypeId) -> TypeId {
    let mut current = ty;
    for _ in 0..graph.type_count() + 1 {
        current = remove_alias(graph, current);
        match graph.ty(current) {
            Type::Pointer(base)
            | Type::Reference(base)
            | Type::Cv { base, .. }
            | Type::Array { base, .. } => current = *base,
            _ => return current,
        }
    }
    current
}

/// The declaration a type names directly, without chasing typedefs.
pub fn remove_declarated(graph: &DeclarationGraph, ty: TypeId) -> Option<DeclId> {
    match graph.ty(ty) {
        Type::Declarated(decl) => Some(*decl),
        _ => None,
    }
}

/// Every layer of `ty`, outermost first, typedef steps included.
pub fn decompose_type(graph: &DeclarationGraph, ty: TypeId) -> Vec<TypeId> {
    let mut layers = vec![ty];
    let mut current = ty;
    loop {
        let next = match graph.ty(current) {
            Type::Pointer(base)
            | Type::Reference(base)
            | Type::Cv { base, .. }
            | Type::Array { base, .. } => *base,
            Type::Declarated(decl) => match &graph.decl(*decl).kind {
                DeclKind::Typedef { ty } => *ty,
                _ => return layers,
            },
            _ => return layers,
        };
        if layers.contains(&next) {
            return layers;
        }
        layers.push(next);
        current = next;
    }
}

// ── Fundamental tests ───────────────────────────────────────────

fn fundamental_kind(graph: &DeclarationGraph, ty: TypeId) -> Option<FundamentalKind> {
    match graph.ty(remove_cv(graph, ty)) {
        Type::Fundamental { kind, .. } => Some(*kind),
        _ => None,
    }
}

pub fn is_fundamental(graph: &DeclarationGraph, ty: TypeId) -> bool {
    fundamental_kind(graph, ty).is_some()
}

pub fn is_void(graph: &DeclarationGraph, ty: TypeId) -> bool {
    fundamental_kind(graph, ty) == Some(FundamentalKind::Void)
}

pub fn is_void_pointer(graph: &DeclarationGraph, ty: TypeId) -> bool {
    is_pointer(graph, ty) && is_void(graph, remove_pointer(graph, ty))
}

/// `const char *` (through any typedefs).
pub fn is_const_char_pointer(graph: &DeclarationGraph, ty: TypeId) -> bool {
    if !is_pointer(graph, ty) {
        return false;
    }
    let pointee = remove_pointer(graph, ty);
    is_const(graph, pointee) && fundamental_kind(graph, pointee) == Some(FundamentalKind::Char)
}

pub fn is_integral(graph: &DeclarationGraph, ty: TypeId) -> bool {
    fundamental_kind(graph, ty).is_some_and(FundamentalKind::is_integral)
}

pub fn is_bool(graph: &DeclarationGraph, ty: TypeId) -> bool {
    fundamental_kind(graph, ty) == Some(FundamentalKind::Bool)
}

pub fn is_floating_point(graph: &DeclarationGraph, ty: TypeId) -> bool {
    fundamental_kind(graph, ty).is_some_and(FundamentalKind::is_floating_point)
}

// ── Declarated tests ────────────────────────────────────────────

/// The enumeration named by `ty` (after typedef and cv removal).
pub fn enum_declaration(graph: &DeclarationGraph, ty: TypeId) -> Option<DeclId> {
    remove_declarated(graph, remove_cv(graph, ty))
        .filter(|decl| matches!(graph.decl(*decl).kind, DeclKind::Enumeration(_)))
}

pub fn is_enum(graph: &DeclarationGraph, ty: TypeId) -> bool {
    enum_declaration(graph, ty).is_some()
}

/// The complete class named by `ty` (after typedef and cv removal).
pub fn class_declaration(graph: &DeclarationGraph, ty: TypeId) -> Option<DeclId> {
    remove_declarated(graph, remove_cv(graph, ty)).filter(|decl| graph.decl(*decl).is_class())
}

pub fn is_class(graph: &DeclarationGraph, ty: TypeId) -> bool {
    class_declaration(graph, ty).is_some()
}

/// A class or forward-declared class named by `ty`.
pub fn class_or_forward(graph: &DeclarationGraph, ty: TypeId) -> Option<DeclId> {
    remove_declarated(graph, remove_cv(graph, ty)).filter(|decl| {
        matches!(
            graph.decl(*decl).kind,
            DeclKind::Class(_) | DeclKind::ClassDeclaration
        )
    })
}

/// Normalized fully qualified name with library-internal inline
/// namespaces removed.
fn canonical_name(graph: &DeclarationGraph, decl: DeclId) -> String {
    templates::normalize(&graph.full_name(decl)).replace("__cxx11::", "")
}

/// Whether any name along the typedef chain of `ty` satisfies `matches`.
/// Cv-qualifiers are looked through; pointers and references are not.
fn names_along_aliases(
    graph: &DeclarationGraph,
    ty: TypeId,
    matches: impl Fn(&str) -> bool,
) -> bool {
    let mut current = ty;
    for _ in 0..=graph.type_count() {
        match graph.ty(current) {
            Type::Cv { base, .. } => current = *base,
            Type::Declarated(decl) => {
                if matches(&canonical_name(graph, *decl)) {
                    return true;
                }
                match &graph.decl(*decl).kind {
                    DeclKind::Typedef { ty } => current = *ty,
                    _ => return false,
                }
            }
            _ => return false,
        }
    }
    false
}

pub fn is_std_string(graph: &DeclarationGraph, ty: TypeId) -> bool {
    names_along_aliases(graph, ty, |name| {
        name == "std::string"
            || name == "std::basic_string<char>"
            || name.starts_with("std::basic_string<char,")
    })
}

pub fn is_std_wstring(graph: &DeclarationGraph, ty: TypeId) -> bool {
    names_along_aliases(graph, ty, |name| {
        name == "std::wstring"
            || name == "std::basic_string<wchar_t>"
            || name.starts_with("std::basic_string<wchar_t,")
    })
}

/// Output stream classes (`std::ostream`, `std::wostream`,
/// `std::basic_ostream<...>`), possibly behind a reference.
pub fn is_std_ostream(graph: &DeclarationGraph, ty: TypeId) -> bool {
    names_along_aliases(graph, remove_reference(graph, ty), |name| {
        name == "std::ostream" || name == "std::wostream" || name.starts_with("std::basic_ostream<")
    })
}

/// Types that a binding copies instead of referencing: fundamentals,
/// enumerations and the standard string classes.
pub fn is_immutable(graph: &DeclarationGraph, ty: TypeId) -> bool {
    is_fundamental(graph, ty)
        || is_enum(graph, ty)
        || is_std_string(graph, ty)
        || is_std_wstring(graph, ty)
}

/// Structural type equality, looking through typedefs.
pub fn is_same(graph: &DeclarationGraph, left: TypeId, right: TypeId) -> bool {
    let left = remove_alias(graph, left);
    let right = remove_alias(graph, right);
    if left == right {
        return true;
    }
    match (graph.ty(left), graph.ty(right)) {
        (
            Type::Fundamental { kind: lk, name: ln },
            Type::Fundamental { kind: rk, name: rn },
        ) => lk == rk && (*lk != FundamentalKind::Other || ln == rn),
        (Type::Pointer(l), Type::Pointer(r)) | (Type::Reference(l), Type::Reference(r)) => {
            is_same(graph, *l, *r)
        }
        (
            Type::Cv {
                base: lb,
                is_const: lc,
                is_volatile: lv,
                ..
            },
            Type::Cv {
                base: rb,
                is_const: rc,
                is_volatile: rv,
                ..
            },
        ) => lc == rc && lv == rv && is_same(graph, *lb, *rb),
        (Type::Array { base: lb, size: ls }, Type::Array { base: rb, size: rs }) => {
            ls == rs && is_same(graph, *lb, *rb)
        }
        (
            Type::FreeFunction {
                return_type: lr,
                arguments: la,
                has_ellipsis: le,
            },
            Type::FreeFunction {
                return_type: rr,
                arguments: ra,
                has_ellipsis: re,
            },
        ) => le == re && is_same(graph, *lr, *rr) && all_same(graph, la, ra),
        (
            Type::MemberFunction {
                class: lc,
                return_type: lr,
                arguments: la,
                is_const: lk,
            },
            Type::MemberFunction {
                class: rc,
                return_type: rr,
                arguments: ra,
                is_const: rk,
            },
        ) => {
            lk == rk
                && is_same(graph, *lc, *rc)
                && is_same(graph, *lr, *rr)
                && all_same(graph, la, ra)
        }
        (
            Type::MemberVariable {
                class: lc,
                variable: lv,
            },
            Type::MemberVariable {
                class: rc,
                variable: rv,
            },
        ) => is_same(graph, *lc, *rc) && is_same(graph, *lv, *rv),
        (Type::Ellipsis, Type::Ellipsis) | (Type::Unknown, Type::Unknown) => true,
        (Type::Declarated(l), Type::Declarated(r)) => l == r,
        _ => false,
    }
}

fn all_same(graph: &DeclarationGraph, left: &[TypeId], right: &[TypeId]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(l, r)| is_same(graph, *l, *r))
}

// ── Class queries ───────────────────────────────────────────────

/// Members of `class` that are callables of the given kind.
pub fn calldefs_of_kind(
    graph: &DeclarationGraph,
    class: DeclId,
    kind: CalldefKind,
) -> impl Iterator<Item = DeclId> + '_ {
    graph
        .members(class)
        .iter()
        .copied()
        .filter(move |member| graph.decl(*member).calldef_kind() == Some(kind))
}

pub fn constructors(graph: &DeclarationGraph, class: DeclId) -> Vec<DeclId> {
    calldefs_of_kind(graph, class, CalldefKind::Constructor).collect()
}

/// `C(const C&)` or `C(C&)`, any further arguments defaulted.
pub fn is_copy_constructor(graph: &DeclarationGraph, class: DeclId, ctor: DeclId) -> bool {
    let Some(calldef) = graph.decl(ctor).as_calldef() else {
        return false;
    };
    let Some(first) = calldef.arguments.first() else {
        return false;
    };
    if calldef.arguments[1..]
        .iter()
        .any(|arg| arg.default_value.is_none())
    {
        return false;
    }
    is_reference(graph, first.ty)
        && class_declaration(graph, remove_reference(graph, first.ty)) == Some(class)
}

pub fn find_copy_constructor(graph: &DeclarationGraph, class: DeclId) -> Option<DeclId> {
    calldefs_of_kind(graph, class, CalldefKind::Constructor)
        .find(|ctor| is_copy_constructor(graph, class, *ctor))
}

/// Constructor callable without arguments.
pub fn find_trivial_constructor(graph: &DeclarationGraph, class: DeclId) -> Option<DeclId> {
    calldefs_of_kind(graph, class, CalldefKind::Constructor).find(|ctor| {
        graph
            .decl(*ctor)
            .as_calldef()
            .is_some_and(|c| c.required_args().is_empty())
    })
}

pub fn find_destructor(graph: &DeclarationGraph, class: DeclId) -> Option<DeclId> {
    calldefs_of_kind(graph, class, CalldefKind::Destructor).next()
}

/// A class without a declared destructor has a public implicit one.
pub fn has_public_destructor(graph: &DeclarationGraph, class: DeclId) -> bool {
    find_destructor(graph, class).map_or(true, |dtor| graph.decl(dtor).access == Access::Public)
}

/// Copy constructor is public, or implicit with copyable bases.
pub fn is_copy_constructible(graph: &DeclarationGraph, class: DeclId) -> bool {
    let mut visited = FxHashSet::default();
    is_copy_constructible_inner(graph, class, &mut visited)
}

fn is_copy_constructible_inner(
    graph: &DeclarationGraph,
    class: DeclId,
    visited: &mut FxHashSet<DeclId>,
) -> bool {
    if !visited.insert(class) {
        return true;
    }
    if let Some(ctor) = find_copy_constructor(graph, class) {
        return graph.decl(ctor).access == Access::Public;
    }
    let Some(info) = graph.decl(class).as_class() else {
        return false;
    };
    info.bases
        .iter()
        .all(|base| is_copy_constructible_inner(graph, base.related, visited))
}

/// A public member operator with `symbol`, or a free operator with
/// `symbol` taking `class` as an operand.
pub fn has_public_operator(graph: &DeclarationGraph, class: DeclId, symbol: &str) -> bool {
    let member = calldefs_of_kind(graph, class, CalldefKind::MemberOperator).any(|op| {
        let decl = graph.decl(op);
        decl.access == Access::Public && decl.operator_symbol() == Some(symbol)
    });
    if member {
        return true;
    }
    graph.iter().any(|(_, decl)| {
        decl.calldef_kind() == Some(CalldefKind::FreeOperator)
            && decl.operator_symbol() == Some(symbol)
            && decl.as_calldef().is_some_and(|c| {
                c.argument_types()
                    .any(|arg| class_declaration(graph, base_type(graph, arg)) == Some(class))
            })
    })
}

/// All direct and indirect bases, breadth first, each class once.
pub fn recursive_bases(graph: &DeclarationGraph, class: DeclId) -> Vec<HierarchyInfo> {
    let mut out: Vec<HierarchyInfo> = Vec::new();
    let mut seen = FxHashSet::default();
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(class);
    while let Some(current) = queue.pop_front() {
        let Some(info) = graph.decl(current).as_class() else {
            continue;
        };
        for base in &info.bases {
            if seen.insert(base.related) {
                out.push(*base);
                queue.push_back(base.related);
            }
        }
    }
    out
}

/// The outermost class enclosing `decl` (itself when it is a top-level
/// class). `None` when `decl` is not inside a class.
pub fn top_class(graph: &DeclarationGraph, decl: DeclId) -> Option<DeclId> {
    let mut answer = graph.decl(decl).is_class().then_some(decl);
    let mut current = graph.parent(decl);
    while let Some(parent) = current {
        if !graph.decl(parent).is_class() {
            break;
        }
        answer = Some(parent);
        current = graph.parent(parent);
    }
    answer
}
