//! Fatal errors of the graph-building passes.

use thiserror::Error;

/// The dump does not follow the record schema.
///
/// `line` is the 1-based line of the offending record in the input.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SchemaError {
    #[error("line {line}: malformed record: {message}")]
    Malformed { line: usize, message: String },
    #[error("line {line}: `{kind}` record is missing required attribute `{attribute}`")]
    MissingAttribute {
        line: usize,
        kind: String,
        attribute: &'static str,
    },
    #[error("line {line}: `{kind}` record appears outside of any declaration")]
    OrphanRecord { line: usize, kind: String },
    #[error("line {line}: `{kind}` record cannot belong to `{container}`")]
    MisplacedRecord {
        line: usize,
        kind: String,
        container: String,
    },
    #[error("line {line}: `{kind}` attribute `{attribute}` has invalid value `{value}`")]
    InvalidAttribute {
        line: usize,
        kind: String,
        attribute: &'static str,
        value: String,
    },
    #[error("line {line}: id `{id}` is defined twice")]
    DuplicateId { line: usize, id: String },
}

/// A reference in the dump does not resolve.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum LinkError {
    #[error("declaration `{declaration}`: field `{field}` refers to unknown id `{id}`")]
    UnresolvedId {
        declaration: String,
        field: &'static str,
        id: String,
    },
    #[error("type `{ty}`: field `{field}` refers to unknown id `{id}`")]
    UnresolvedType {
        ty: String,
        field: &'static str,
        id: String,
    },
    #[error("`{referrer}`: field `{field}` expects a type but `{id}` is a {found}")]
    NotAType {
        referrer: String,
        field: &'static str,
        id: String,
        found: &'static str,
    },
    #[error("class `{declaration}`: base `{id}` is not a class")]
    NotAClass { declaration: String, id: String },
}
