//! Errors that abort a pipeline run.

use std::path::PathBuf;

use thiserror::Error;
use weave_diagnostic::{Diagnostic, DiagnosticCode};
use weave_parse::{LinkError, ParseError, SchemaError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid record stream: {0}")]
    Schema(#[from] SchemaError),
    #[error("unresolved reference: {0}")]
    Link(#[from] LinkError),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("annotation names unknown declaration `{0}`")]
    UnknownDeclaration(String),
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ParseError> for PipelineError {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Schema(error) => PipelineError::Schema(error),
            ParseError::Link(error) => PipelineError::Link(error),
        }
    }
}

impl PipelineError {
    /// The `E0xxx` code mirroring a graph-building failure.
    pub fn code(&self) -> Option<DiagnosticCode> {
        match self {
            PipelineError::Schema(_) => Some(DiagnosticCode::E0001),
            PipelineError::Link(_) => Some(DiagnosticCode::E0002),
            PipelineError::Config(_) | PipelineError::UnknownDeclaration(_) | PipelineError::Io { .. } => {
                None
            }
        }
    }

    /// Report a graph-building failure through the diagnostic channel.
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        self.code()
            .map(|code| Diagnostic::error(code).with_message(self.to_string()))
    }
}
