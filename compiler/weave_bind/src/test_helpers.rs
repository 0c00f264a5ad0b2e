//! Shared test utilities for the binding stages.
//!
//! Fixtures are JSON-lines dumps run through the full graph builder, so
//! every test sees a linked and patched graph. Only compiled in test builds.

#![allow(clippy::unwrap_used, reason = "tests can panic")]

use weave_ir::{DeclId, DeclarationGraph};

/// Build a graph from a JSON-lines fixture.
pub(crate) fn graph(text: &str) -> DeclarationGraph {
    weave_parse::build_graph(text).unwrap()
}

/// Look up a declaration by its dump id.
pub(crate) fn decl(graph: &DeclarationGraph, dump_id: &str) -> DeclId {
    graph.lookup(dump_id).unwrap()
}
