//! Building the declaration graph from an introspection dump.
//!
//! Three passes run in order:
//! 1. [`scanner::scan`] streams [`Record`]s into raw tables keyed by the
//!    dump's string ids.
//! 2. [`linker::link`] assigns arena ids and resolves every reference,
//!    producing a [`DeclarationGraph`](weave_ir::DeclarationGraph).
//! 3. [`patcher::patch`] repairs default-argument literals and
//!    casting-operator names that the dump spells ambiguously.
//!
//! [`build_graph`] runs all three.

mod error;
pub mod linker;
pub mod patcher;
mod record;
pub mod scanner;

pub use error::{LinkError, SchemaError};
pub use record::{parse_records, Record, RecordKind};

use weave_ir::DeclarationGraph;

/// Errors that abort graph construction.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Parse, scan, link and patch a JSON-lines dump.
pub fn build_graph(text: &str) -> Result<DeclarationGraph, ParseError> {
    let records = parse_records(text)?;
    let tables = scanner::scan(&records)?;
    let mut graph = linker::link(&tables)?;
    patcher::patch(&mut graph);
    Ok(graph)
}
