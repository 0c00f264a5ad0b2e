//! Exportability verdicts.
//!
//! Decides, per declaration, whether the binding library can express it at
//! all. A declaration that cannot be exported comes with a reason, which the
//! factory reports as a `W1xxx` diagnostic.
//!
//! Verdicts are memoized: the factory asks about the same members several
//! times (wrapper analysis, member visiting, dependency reporting).

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use weave_diagnostic::{Diagnostic, DiagnosticCode};
use weave_ir::{
    traits, Access, Calldef, CalldefKind, DeclId, DeclKind, DeclarationGraph, Type, TypeId,
    Variable, Virtuality,
};

/// Default upper bound on callable arity.
pub const DEFAULT_MAX_ARITY: usize = 15;

/// Operators with a binding-library spelling.
const SUPPORTED_OPERATORS: &[&str] = &[
    // in place
    "+=", "-=", "*=", "/=", "%=", ">>=", "<<=", "&=", "^=", "|=",
    // comparison
    "==", "!=", "<", ">", "<=", ">=",
    // binary
    "+", "-", "*", "/", "%", "&", "^", "|", "<<", ">>",
    // unary
    "!", "~",
];

/// Operators only a member can provide.
const MEMBER_ONLY_OPERATORS: &[&str] = &["()", "[]", "="];

/// Why a declaration cannot be exported.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ExportReason {
    pub code: DiagnosticCode,
    pub detail: String,
}

impl ExportReason {
    fn new(code: DiagnosticCode, detail: impl Into<String>) -> Self {
        ExportReason {
            code,
            detail: detail.into(),
        }
    }

    pub fn to_diagnostic(&self, graph: &DeclarationGraph, decl: DeclId) -> Diagnostic {
        Diagnostic::warning(self.code)
            .with_declaration(graph.full_name(decl))
            .with_message(self.detail.clone())
    }
}

/// Memoizing exportability classifier over one graph.
pub struct Exportability<'g> {
    graph: &'g DeclarationGraph,
    max_arity: usize,
    cache: RefCell<FxHashMap<DeclId, Option<ExportReason>>>,
}

impl<'g> Exportability<'g> {
    pub fn new(graph: &'g DeclarationGraph, max_arity: usize) -> Self {
        Exportability {
            graph,
            max_arity,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn graph(&self) -> &'g DeclarationGraph {
        self.graph
    }

    pub fn is_exportable(&self, decl: DeclId) -> bool {
        self.reason(decl).is_none()
    }

    /// The reason `decl` cannot be exported, `None` when it can.
    pub fn reason(&self, decl: DeclId) -> Option<ExportReason> {
        if let Some(cached) = self.cache.borrow().get(&decl) {
            return cached.clone();
        }
        let verdict = self.compute(decl);
        self.cache.borrow_mut().insert(decl, verdict.clone());
        verdict
    }

    /// The `W1xxx` diagnostic for a declaration that cannot be exported.
    pub fn diagnostic(&self, decl: DeclId) -> Option<Diagnostic> {
        self.reason(decl)
            .map(|reason| reason.to_diagnostic(self.graph, decl))
    }

    fn compute(&self, id: DeclId) -> Option<ExportReason> {
        let decl = self.graph.decl(id);
        if decl.name.starts_with("__") || decl.name.contains('.') {
            return Some(ExportReason::new(
                DiagnosticCode::W1000,
                "names starting with `__` are reserved for the compiler",
            ));
        }
        if decl.location.as_ref().is_some_and(|loc| loc.is_internal()) {
            return Some(ExportReason::new(
                DiagnosticCode::W1001,
                "declared at a compiler-internal location",
            ));
        }
        if decl.is_artificial()
            && !matches!(decl.kind, DeclKind::Class(_) | DeclKind::Enumeration(_))
        {
            return Some(ExportReason::new(
                DiagnosticCode::W1002,
                "compiler-generated declarations are not exported",
            ));
        }

        match &decl.kind {
            DeclKind::Class(_) | DeclKind::Enumeration(_) => self.scope_member_reason(id),
            DeclKind::Variable(variable) => self.variable_reason(id, variable),
            DeclKind::Calldef(calldef) => self.calldef_reason(id, calldef),
            DeclKind::Namespace(_) | DeclKind::ClassDeclaration | DeclKind::Typedef { .. } => None,
        }
    }

    fn scope_member_reason(&self, id: DeclId) -> Option<ExportReason> {
        let decl = self.graph.decl(id);
        if decl.is_class() && decl.name.is_empty() {
            return Some(ExportReason::new(
                DiagnosticCode::W1003,
                "unnamed classes cannot be registered",
            ));
        }
        if self.graph.parent_class(id).is_some() && decl.access != Access::Public {
            return Some(ExportReason::new(
                DiagnosticCode::W1015,
                format!("nested {} is {}", decl.kind.describe(), decl.access),
            ));
        }
        None
    }

    fn variable_reason(&self, id: DeclId, variable: &Variable) -> Option<ExportReason> {
        let graph = self.graph;
        let decl = graph.decl(id);
        if decl.name.is_empty() {
            return Some(ExportReason::new(
                DiagnosticCode::W1011,
                "unnamed variables cannot be registered",
            ));
        }
        if is_function_pointer(graph, variable.ty) {
            return Some(ExportReason::new(
                DiagnosticCode::W1004,
                "variables of function pointer type are not supported",
            ));
        }
        if graph.parent_class(id).is_none() {
            return None;
        }

        if decl.access != Access::Public {
            return Some(ExportReason::new(
                DiagnosticCode::W1014,
                format!("member variable is {}", decl.access),
            ));
        }
        if traits::is_pointer(graph, variable.ty) {
            if decl.is_static() {
                return Some(ExportReason::new(
                    DiagnosticCode::W1012,
                    "static pointer member variables are not supported",
                ));
            }
            if traits::is_immutable(graph, traits::remove_pointer(graph, variable.ty)) {
                return Some(ExportReason::new(
                    DiagnosticCode::W1013,
                    format!(
                        "pointer to immutable type `{}` cannot be exposed",
                        graph.decl_string(traits::remove_pointer(graph, variable.ty))
                    ),
                ));
            }
        }
        if traits::is_array(graph, variable.ty) && traits::array_size(graph, variable.ty) == Some(0)
        {
            return Some(ExportReason::new(
                DiagnosticCode::W1016,
                "zero-length array members cannot be exposed",
            ));
        }
        None
    }

    fn calldef_reason(&self, id: DeclId, calldef: &Calldef) -> Option<ExportReason> {
        let graph = self.graph;
        let decl = graph.decl(id);

        if calldef.kind.is_member()
            && decl.access == Access::Private
            && decl.virtuality() == Virtuality::NotVirtual
        {
            return Some(ExportReason::new(
                DiagnosticCode::W1017,
                "private non-virtual member functions are not reachable",
            ));
        }
        if calldef.has_ellipsis {
            return Some(ExportReason::new(
                DiagnosticCode::W1008,
                "functions with an ellipsis argument are not supported",
            ));
        }
        if calldef.arguments.len() > self.max_arity {
            return Some(ExportReason::new(
                DiagnosticCode::W1007,
                format!(
                    "{} arguments exceed the maximum arity of {}",
                    calldef.arguments.len(),
                    self.max_arity
                ),
            ));
        }

        if let Some(symbol) = decl.operator_symbol() {
            let member_only = MEMBER_ONLY_OPERATORS.contains(&symbol);
            let supported = SUPPORTED_OPERATORS.contains(&symbol)
                || (member_only && calldef.kind == CalldefKind::MemberOperator);
            if !supported {
                return Some(ExportReason::new(
                    DiagnosticCode::W1009,
                    format!("operator{symbol} has no binding-library spelling"),
                ));
            }
            if calldef.kind == CalldefKind::FreeOperator
                && !calldef
                    .argument_types()
                    .any(|arg| traits::class_or_forward(graph, traits::base_type(graph, arg)).is_some())
            {
                return Some(ExportReason::new(
                    DiagnosticCode::W1010,
                    "free operator has no class operand",
                ));
            }
        }

        let signature = calldef.return_type.into_iter().chain(calldef.argument_types());
        for ty in signature {
            if is_function_pointer(graph, ty) {
                return Some(ExportReason::new(
                    DiagnosticCode::W1004,
                    format!("`{}` is a function pointer", graph.decl_string(ty)),
                ));
            }
            if traits::is_array(graph, ty) {
                return Some(ExportReason::new(
                    DiagnosticCode::W1006,
                    format!("`{}` is an array", graph.decl_string(ty)),
                ));
            }
            if let Some(class) = traits::class_or_forward(graph, traits::base_type(graph, ty)) {
                if graph.parent_class(class).is_some() && graph.decl(class).access != Access::Public
                {
                    return Some(ExportReason::new(
                        DiagnosticCode::W1005,
                        format!("`{}` is not public", graph.full_name(class)),
                    ));
                }
            }
        }
        None
    }
}

/// Pointers and references to functions, and pointers to members.
pub fn is_function_pointer(graph: &DeclarationGraph, ty: TypeId) -> bool {
    let ty = traits::remove_cv(graph, ty);
    match graph.ty(ty) {
        Type::Pointer(base) | Type::Reference(base) => {
            graph.ty(traits::remove_cv(graph, *base)).is_function()
        }
        Type::MemberFunction { .. } | Type::MemberVariable { .. } => true,
        _ => false,
    }
}
