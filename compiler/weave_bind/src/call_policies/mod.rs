//! Call policy inference.
//!
//! A call policy tells the binding library how to manage the lifetime of a
//! callable's result. [`resolve`] picks one from the declaration's return
//! type; callables it cannot decide for get `None` and are reported by the
//! factory so a user can annotate them.

use std::fmt;

use serde::{Deserialize, Serialize};
use weave_ir::{traits, CalldefKind, DeclId, DeclKind, DeclarationGraph, TypeId};

use crate::annotations::Annotations;

/// `return_value_policy` flavours.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnValueKind {
    CopyConstReference,
    CopyNonConstReference,
    ManageNewObject,
    ReferenceExisting,
    ReturnOpaquePointer,
    ReturnByValue,
}

impl ReturnValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnValueKind::CopyConstReference => "copy_const_reference",
            ReturnValueKind::CopyNonConstReference => "copy_non_const_reference",
            ReturnValueKind::ManageNewObject => "manage_new_object",
            ReturnValueKind::ReferenceExisting => "reference_existing_object",
            ReturnValueKind::ReturnOpaquePointer => "return_opaque_pointer",
            ReturnValueKind::ReturnByValue => "return_by_value",
        }
    }
}

/// A call policy attached to a callable creator.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CallPolicy {
    Default,
    ReturnSelf,
    ReturnInternalReference { custodian: u32 },
    WithCustodianAndWard { custodian: u32, ward: u32 },
    ReturnValue { value: ReturnValueKind },
}

impl CallPolicy {
    pub fn return_value(kind: ReturnValueKind) -> Self {
        CallPolicy::ReturnValue { value: kind }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, CallPolicy::Default)
    }

    pub fn is_return_opaque_pointer(&self) -> bool {
        matches!(
            self,
            CallPolicy::ReturnValue {
                value: ReturnValueKind::ReturnOpaquePointer
            }
        )
    }
}

impl fmt::Display for CallPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallPolicy::Default => f.write_str("default_call_policies"),
            CallPolicy::ReturnSelf => f.write_str("return_self<>"),
            CallPolicy::ReturnInternalReference { custodian } => {
                write!(f, "return_internal_reference<{custodian}>")
            }
            CallPolicy::WithCustodianAndWard { custodian, ward } => {
                write!(f, "with_custodian_and_ward<{custodian}, {ward}>")
            }
            CallPolicy::ReturnValue { value } => {
                write!(f, "return_value_policy<{}>", value.as_str())
            }
        }
    }
}

/// Which accessor of a member variable a policy is for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum AccessorHint {
    #[default]
    None,
    Get,
    Set,
}

/// Infer a call policy for `decl`. The first matching rule wins.
pub fn resolve(
    graph: &DeclarationGraph,
    annotations: &Annotations,
    decl: DeclId,
    hint: AccessorHint,
) -> Option<CallPolicy> {
    match &graph.decl(decl).kind {
        DeclKind::Calldef(calldef) => {
            let Some(ret) = calldef.return_type else {
                return Some(CallPolicy::Default);
            };
            if calldef.kind == CalldefKind::Constructor {
                return Some(CallPolicy::Default);
            }
            resolve_return(graph, annotations, decl, ret)
        }
        DeclKind::Variable(variable) => resolve_accessor(graph, variable.ty, hint),
        _ => None,
    }
}

fn resolve_return(
    graph: &DeclarationGraph,
    annotations: &Annotations,
    decl: DeclId,
    ret: TypeId,
) -> Option<CallPolicy> {
    if returns_by_value(graph, ret) || traits::is_const_char_pointer(graph, ret) {
        return Some(CallPolicy::Default);
    }
    if traits::is_void_pointer(graph, ret) {
        return Some(CallPolicy::return_value(ReturnValueKind::ReturnOpaquePointer));
    }
    if traits::is_reference(graph, ret) && traits::is_const(graph, traits::remove_reference(graph, ret)) {
        return Some(CallPolicy::return_value(ReturnValueKind::CopyConstReference));
    }
    if points_to_opaque_class(graph, annotations, ret) {
        return Some(CallPolicy::return_value(ReturnValueKind::ReturnOpaquePointer));
    }

    match graph.decl(decl).operator_symbol() {
        Some("[]") if traits::is_reference(graph, ret) => {
            let referent = traits::remove_reference(graph, ret);
            if traits::is_immutable(graph, referent) {
                Some(copy_reference(graph, referent))
            } else {
                Some(CallPolicy::ReturnInternalReference { custodian: 1 })
            }
        }
        Some("=") => Some(CallPolicy::ReturnSelf),
        _ => None,
    }
}

/// Fundamental, enumeration, class or string returned by value.
fn returns_by_value(graph: &DeclarationGraph, ret: TypeId) -> bool {
    let ty = traits::remove_cv(graph, ret);
    traits::is_fundamental(graph, ty)
        || traits::is_enum(graph, ty)
        || traits::is_class(graph, ty)
        || traits::is_std_string(graph, ty)
        || traits::is_std_wstring(graph, ty)
}

fn points_to_opaque_class(graph: &DeclarationGraph, annotations: &Annotations, ret: TypeId) -> bool {
    let pointee = if traits::is_pointer(graph, ret) {
        traits::remove_pointer(graph, ret)
    } else if traits::is_reference(graph, ret) {
        traits::remove_reference(graph, ret)
    } else {
        return false;
    };
    traits::class_or_forward(graph, pointee).is_some_and(|class| annotations.is_opaque(class))
}

fn copy_reference(graph: &DeclarationGraph, referent: TypeId) -> CallPolicy {
    if traits::is_const(graph, referent) {
        CallPolicy::return_value(ReturnValueKind::CopyConstReference)
    } else {
        CallPolicy::return_value(ReturnValueKind::CopyNonConstReference)
    }
}

/// Accessors of reference-typed member variables.
fn resolve_accessor(graph: &DeclarationGraph, ty: TypeId, hint: AccessorHint) -> Option<CallPolicy> {
    if hint == AccessorHint::None || !traits::is_reference(graph, ty) {
        return None;
    }
    let referent = traits::remove_reference(graph, ty);
    let copyable = traits::is_immutable(graph, referent)
        || traits::class_declaration(graph, referent).is_some_and(|class| {
            let abstract_class = graph
                .decl(class)
                .as_class()
                .is_some_and(|info| info.is_abstract);
            !abstract_class
                && traits::has_public_destructor(graph, class)
                && traits::is_copy_constructible(graph, class)
        });
    if !copyable {
        return None;
    }
    match hint {
        AccessorHint::Get => Some(copy_reference(graph, referent)),
        AccessorHint::Set => Some(CallPolicy::Default),
        AccessorHint::None => None,
    }
}
