//! Binding generation stages for Weave.
//!
//! Given a linked [`DeclarationGraph`](weave_ir::DeclarationGraph) and the
//! user's [`Annotations`], this crate decides what to export and how:
//!
//! - [`exportable`]: which declarations the binding library can express
//! - [`call_policies`]: lifetime policies for callable results
//! - [`types_db`]: containers and smart pointers seen in exported signatures
//! - [`sort`]: registration order of classes and overloads
//! - [`dependencies`]: the report of used but unexposed declarations
//! - [`factory`]: the walk that builds the [`CreatorTree`]
//!
//! # Design
//!
//! Every stage reads the graph; none writes it. Per-run state (the types
//! database, the dependency manager, the diagnostic queue) lives in the
//! factory and is handed back in [`FactoryOutput`], so two runs never
//! share anything.

pub mod annotations;
pub mod call_policies;
pub mod containers;
pub mod creators;
pub mod dependencies;
pub mod exportable;
pub mod factory;
pub mod sort;
#[cfg(test)]
mod test_helpers;
pub mod types_db;

pub use annotations::{Annotations, DeclAnnotations};
pub use call_policies::{AccessorHint, CallPolicy, ReturnValueKind};
pub use containers::ContainerKind;
pub use creators::{
    CreatorId, CreatorKind, CreatorNode, CreatorTree, HeldType, MemberMaker, MemberWrapper,
    PolicySlot, WrapperReason,
};
pub use dependencies::{Dependency, DependencyManager, DependencyRole};
pub use exportable::{ExportReason, Exportability};
pub use factory::{generate, FactoryConfig, FactoryOutput};
pub use sort::{sort_classes, sort_declarations, sort_overloads, ClassOrder, SortCycle, SortedDecls};
pub use types_db::{Registrator, TypesDatabase};
