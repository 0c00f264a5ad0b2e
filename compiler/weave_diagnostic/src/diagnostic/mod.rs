//! The [`Diagnostic`] record and its builder methods.

use std::fmt;

use crate::DiagnosticCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A soft problem found while generating bindings.
///
/// `declaration` is the fully qualified name of the declaration the
/// diagnostic is about, when there is one.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub declaration: Option<String>,
    pub message: String,
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// A diagnostic with the code's default severity and an empty message.
    pub fn new(code: DiagnosticCode) -> Self {
        Diagnostic {
            code,
            severity: code.default_severity(),
            declaration: None,
            message: String::new(),
            notes: Vec::new(),
        }
    }

    pub fn warning(code: DiagnosticCode) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Self::new(code)
        }
    }

    pub fn error(code: DiagnosticCode) -> Self {
        Diagnostic {
            severity: Severity::Error,
            ..Self::new(code)
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = Some(declaration.into());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.code)?;
        if let Some(declaration) = &self.declaration {
            write!(f, " `{declaration}`")?;
        }
        write!(f, ": {}", self.message)?;
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}
