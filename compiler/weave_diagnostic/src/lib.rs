//! Diagnostics for the Weave binding generator.
//!
//! Fatal problems (a malformed dump, an id that does not resolve) are
//! `Result` errors owned by the stage that detects them. Everything else is
//! a [`Diagnostic`]: a coded, severity-tagged message about one declaration
//! that does not stop generation.
//!
//! Codes are grouped by the stage that emits them:
//! - `W1xxx`: exportability
//! - `W2xxx`: dependencies and aliases
//! - `W3xxx`: call policies, holders and operators
//! - `W4xxx`: sorting and containers
//! - `E0xxx`: mirrors of the fatal errors, for drivers that report them
//!   through the same channel

mod code;
mod diagnostic;
pub mod queue;

pub use code::DiagnosticCode;
pub use diagnostic::{Diagnostic, Severity};
pub use queue::{DiagnosticConfig, DiagnosticQueue};
