//! Diagnostic codes.

use std::fmt;

use crate::Severity;

/// Codes for every diagnostic the generator emits.
///
/// Format: W#### for warnings, E#### for errors. The first digit names the
/// stage (see the crate docs).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum DiagnosticCode {
    // Fatal mirrors (E0xxx)
    /// The introspection dump does not follow the record schema
    E0001,
    /// A referenced id does not resolve
    E0002,

    // Exportability (W1xxx)
    /// Name is reserved (starts with `__`)
    W1000,
    /// Declared at a compiler-internal location
    W1001,
    /// Compiler-generated declaration
    W1002,
    /// Unnamed class
    W1003,
    /// Function pointer in a signature or variable
    W1004,
    /// Signature refers to a non-public nested class
    W1005,
    /// Array in a callable signature
    W1006,
    /// Too many arguments
    W1007,
    /// Ellipsis argument
    W1008,
    /// Operator the binding library cannot express
    W1009,
    /// Free operator without a class operand
    W1010,
    /// Unnamed variable
    W1011,
    /// Static pointer member variable
    W1012,
    /// Pointer member to an immutable type
    W1013,
    /// Non-public member variable
    W1014,
    /// Non-public nested class
    W1015,
    /// Zero-length array member
    W1016,
    /// Private member function that cannot be overridden
    W1017,

    // Dependencies and aliases (W2xxx)
    /// Declaration is used by exported code but never exposed
    W2000,
    /// Two exported classes share one alias
    W2001,

    // Policies, holders, operators (W3xxx)
    /// Call policy could not be inferred
    W3000,
    /// Several smart pointers compete as a class holder
    W3001,
    /// Free operator target class is not exported
    W3002,

    // Sorting and containers (W4xxx)
    /// Class dependency cycle
    W4000,
    /// Container element type could not be determined
    W4001,
    /// Container element type lacks comparison operators
    W4002,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::E0001 => "E0001",
            DiagnosticCode::E0002 => "E0002",
            DiagnosticCode::W1000 => "W1000",
            DiagnosticCode::W1001 => "W1001",
            DiagnosticCode::W1002 => "W1002",
            DiagnosticCode::W1003 => "W1003",
            DiagnosticCode::W1004 => "W1004",
            DiagnosticCode::W1005 => "W1005",
            DiagnosticCode::W1006 => "W1006",
            DiagnosticCode::W1007 => "W1007",
            DiagnosticCode::W1008 => "W1008",
            DiagnosticCode::W1009 => "W1009",
            DiagnosticCode::W1010 => "W1010",
            DiagnosticCode::W1011 => "W1011",
            DiagnosticCode::W1012 => "W1012",
            DiagnosticCode::W1013 => "W1013",
            DiagnosticCode::W1014 => "W1014",
            DiagnosticCode::W1015 => "W1015",
            DiagnosticCode::W1016 => "W1016",
            DiagnosticCode::W1017 => "W1017",
            DiagnosticCode::W2000 => "W2000",
            DiagnosticCode::W2001 => "W2001",
            DiagnosticCode::W3000 => "W3000",
            DiagnosticCode::W3001 => "W3001",
            DiagnosticCode::W3002 => "W3002",
            DiagnosticCode::W4000 => "W4000",
            DiagnosticCode::W4001 => "W4001",
            DiagnosticCode::W4002 => "W4002",
        }
    }

    /// Severity a diagnostic with this code gets unless overridden.
    pub fn default_severity(&self) -> Severity {
        if self.is_error() {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DiagnosticCode::E0001 | DiagnosticCode::E0002)
    }

    /// Exportability codes explain why a declaration was left out.
    pub fn is_exportability(&self) -> bool {
        self.as_str().starts_with("W1")
    }

    /// One-line summary (the variant's doc comment).
    pub fn summary(&self) -> &'static str {
        match self {
            DiagnosticCode::E0001 => "the introspection dump does not follow the record schema",
            DiagnosticCode::E0002 => "a referenced id does not resolve",
            DiagnosticCode::W1000 => "name is reserved",
            DiagnosticCode::W1001 => "declared at a compiler-internal location",
            DiagnosticCode::W1002 => "compiler-generated declaration",
            DiagnosticCode::W1003 => "unnamed class",
            DiagnosticCode::W1004 => "function pointer",
            DiagnosticCode::W1005 => "signature refers to a non-public nested class",
            DiagnosticCode::W1006 => "array in a callable signature",
            DiagnosticCode::W1007 => "too many arguments",
            DiagnosticCode::W1008 => "ellipsis argument",
            DiagnosticCode::W1009 => "unsupported operator",
            DiagnosticCode::W1010 => "free operator without a class operand",
            DiagnosticCode::W1011 => "unnamed variable",
            DiagnosticCode::W1012 => "static pointer member variable",
            DiagnosticCode::W1013 => "pointer member to an immutable type",
            DiagnosticCode::W1014 => "non-public member variable",
            DiagnosticCode::W1015 => "non-public nested class",
            DiagnosticCode::W1016 => "zero-length array member",
            DiagnosticCode::W1017 => "private non-virtual member function",
            DiagnosticCode::W2000 => "declaration is used but never exposed",
            DiagnosticCode::W2001 => "alias collision",
            DiagnosticCode::W3000 => "call policy could not be inferred",
            DiagnosticCode::W3001 => "ambiguous holder type",
            DiagnosticCode::W3002 => "free operator target is not exported",
            DiagnosticCode::W4000 => "class dependency cycle",
            DiagnosticCode::W4001 => "container element type unknown",
            DiagnosticCode::W4002 => "container element type is not comparable",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
