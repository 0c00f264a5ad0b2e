//! Weave IR - the linked declaration graph.
//!
//! This crate contains the data model shared by every Weave stage:
//! - [`DeclId`] / [`TypeId`] arena indices
//! - [`Declaration`] and its closed set of kinds ([`DeclKind`])
//! - [`Type`], the C++ type model (fundamental, compound and declarated)
//! - [`DeclarationGraph`], the arena that owns both after linking
//! - [`traits`], structural queries over types and classes
//! - [`templates`], string helpers for template instantiation names
//!
//! # Design
//!
//! The introspection dump refers to everything by string id. The scanner
//! keeps those ids in raw tables; the linker then assigns every declaration
//! and type a dense arena index and rewrites each reference. Once a
//! [`DeclarationGraph`] exists, every type-valued field holds a [`TypeId`]
//! and every declaration reference a [`DeclId`], so an unresolved reference
//! cannot be represented. The original dump ids are kept on each
//! declaration purely for diagnostics.

mod decl;
mod flags;
mod format;
mod graph;
mod id;
pub mod templates;
#[cfg(test)]
mod test_support;
pub mod traits;
mod ty;

pub use decl::{
    operator_symbol, Access, Argument, Calldef, CalldefKind, Class, ClassKind, DeclKind,
    Declaration, EnumValue, Enumeration, HierarchyInfo, Location, Namespace, Variable, Virtuality,
};
pub use flags::DeclFlags;
pub use graph::DeclarationGraph;
pub use id::{DeclId, TypeId};
pub use ty::{FundamentalKind, Type};
