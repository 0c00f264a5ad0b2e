//! Registration order of declarations.
//!
//! - [`sort_classes`]: classes after everything they depend on.
//! - [`sort_overloads`]: overloaded callables in an order where no overload
//!   hides another.
//! - [`sort_declarations`]: one scope's declarations, combining both.

mod classes;
mod overloads;

pub use classes::{class_dependencies, sort_classes, ClassOrder, SortCycle};
pub use overloads::{is_related, sort_overloads};

use weave_diagnostic::{Diagnostic, DiagnosticCode};
use weave_ir::{CalldefKind, DeclId, DeclKind, DeclarationGraph};

/// Result of ordering one scope.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct SortedDecls {
    pub order: Vec<DeclId>,
    pub cycles: Vec<SortCycle>,
}

/// Order the declarations of one scope for registration.
///
/// Enumerations come first (by name), then classes (topologically),
/// constructors (overload order), the remaining callables and typedefs (by
/// name, then overload order), and variables (by name).
pub fn sort_declarations(graph: &DeclarationGraph, decls: &[DeclId], include_vars: bool) -> SortedDecls {
    let mut enums = Vec::new();
    let mut class_like = Vec::new();
    let mut constructors = Vec::new();
    let mut others = Vec::new();
    let mut variables = Vec::new();
    for decl in decls {
        match &graph.decl(*decl).kind {
            DeclKind::Enumeration(_) => enums.push(*decl),
            DeclKind::Class(_) | DeclKind::ClassDeclaration => class_like.push(*decl),
            DeclKind::Variable(_) => variables.push(*decl),
            DeclKind::Calldef(calldef) if calldef.kind == CalldefKind::Constructor => {
                constructors.push(*decl);
            }
            _ => others.push(*decl),
        }
    }

    let by_name = |decl: &DeclId| graph.decl(*decl).name.clone();
    enums.sort_by_key(by_name);
    variables.sort_by_key(by_name);
    others.sort_by_key(by_name);

    let ClassOrder { classes, cycles } = sort_classes(graph, &class_like, include_vars);
    let mut order = Vec::with_capacity(decls.len());
    order.extend(enums);
    order.extend(classes.iter().copied());
    // Forward declarations carry no dependencies; they keep input order.
    order.extend(class_like.into_iter().filter(|decl| !classes.contains(decl)));
    order.extend(sort_overloads(graph, &constructors));
    order.extend(sort_overloads(graph, &others));
    order.extend(variables);

    SortedDecls { order, cycles }
}

impl SortCycle {
    pub fn to_diagnostic(self, graph: &DeclarationGraph) -> Diagnostic {
        Diagnostic::warning(DiagnosticCode::W4000)
            .with_declaration(graph.full_name(self.from))
            .with_message(format!(
                "dependency on `{}` closes a cycle; registration order may be wrong",
                graph.full_name(self.to)
            ))
    }
}
