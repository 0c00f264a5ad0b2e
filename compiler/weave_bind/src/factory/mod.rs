//! Code creator factory.
//!
//! Walks the exportable part of a [`DeclarationGraph`] in registration order
//! and builds the [`CreatorTree`] an external renderer turns into binding
//! code. The walk is a single pass:
//!
//! 1. **Prepare**: every declaration directly inside a namespace is checked
//!    for annotations and exportability; the survivors are sorted.
//! 2. **Visit**: each survivor, and recursively each member of a class,
//!    gets its creators. Free operators are set aside.
//! 3. **Finish**: free operators move under their target class, classes get
//!    holders and smart pointer registrators, used containers get suites,
//!    and the dependency report runs.
//!
//! Everything the factory cannot do on its own ends up as a diagnostic in
//! [`FactoryOutput::diagnostics`]; nothing here aborts.

mod wizard;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use weave_diagnostic::{Diagnostic, DiagnosticCode, DiagnosticConfig, DiagnosticQueue};
use weave_ir::{
    traits, Access, CalldefKind, DeclFlags, DeclId, DeclKind, DeclarationGraph, TypeId,
};

use crate::annotations::Annotations;
use crate::call_policies::{self, AccessorHint};
use crate::creators::{CreatorId, CreatorKind, CreatorTree, HeldType, PolicySlot, WrapperReason};
use crate::dependencies::DependencyManager;
use crate::exportable::{ExportReason, Exportability, DEFAULT_MAX_ARITY};
use crate::sort::{self, SortCycle};
use crate::types_db::{Registrator, TypesDatabase, DEFAULT_SMART_PTRS};
use wizard::MemberTraits;

/// Member operators registered through the member function path.
const FUNCTION_LIKE_OPERATORS: &[&str] = &["()", "[]", "="];

/// Settings of one factory run.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FactoryConfig {
    pub module_name: String,
    /// Smart pointer template names recognized in signatures.
    pub smart_ptrs: Vec<String>,
    pub max_arity: usize,
    /// Member variable types count as class dependencies when sorting.
    pub include_vars_in_sort: bool,
    /// Leave out callables without a call policy instead of emitting a
    /// creator that needs one.
    pub exclude_unresolved_policies: bool,
    pub enable_containers: bool,
    /// Maximum diagnostics kept (0 = unlimited).
    pub diagnostic_limit: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        FactoryConfig {
            module_name: "bindings".to_owned(),
            smart_ptrs: DEFAULT_SMART_PTRS.iter().map(|name| (*name).to_owned()).collect(),
            max_arity: DEFAULT_MAX_ARITY,
            include_vars_in_sort: false,
            exclude_unresolved_policies: false,
            enable_containers: true,
            diagnostic_limit: 0,
        }
    }
}

/// Everything one factory run produces.
#[derive(Debug)]
pub struct FactoryOutput {
    pub tree: CreatorTree,
    pub diagnostics: Vec<Diagnostic>,
    pub types_db: TypesDatabase,
    pub dependencies: DependencyManager,
}

/// Build the creator tree for `graph`.
#[tracing::instrument(level = "debug", skip_all, fields(module = %config.module_name))]
pub fn generate(
    graph: &DeclarationGraph,
    annotations: &Annotations,
    config: &FactoryConfig,
) -> FactoryOutput {
    let mut factory = Factory::new(graph, annotations, config);

    let roots = factory.prepare();
    let sorted = sort::sort_declarations(graph, &roots, config.include_vars_in_sort);
    factory.cycles.extend(sorted.cycles);
    let body = factory.tree.body();
    for decl in sorted.order {
        factory.visit(decl, body);
    }

    factory.adopt_free_operators();
    factory.treat_smart_pointers();
    if config.enable_containers {
        factory.add_container_suites();
    }
    factory.finish()
}

struct Factory<'a> {
    graph: &'a DeclarationGraph,
    annotations: &'a Annotations,
    config: &'a FactoryConfig,
    exportable: Exportability<'a>,
    tree: CreatorTree,
    types_db: TypesDatabase,
    dependencies: DependencyManager,
    diagnostics: DiagnosticQueue,
    /// Class creator per exported class.
    class_creators: FxHashMap<DeclId, CreatorId>,
    /// Class wrapper creator per class that needs one.
    wrappers: FxHashMap<DeclId, CreatorId>,
    free_operators: Vec<DeclId>,
    opaque_types: FxHashSet<String>,
    array_types: FxHashSet<String>,
    cycles: Vec<SortCycle>,
}

impl<'a> Factory<'a> {
    fn new(graph: &'a DeclarationGraph, annotations: &'a Annotations, config: &'a FactoryConfig) -> Self {
        Factory {
            graph,
            annotations,
            config,
            exportable: Exportability::new(graph, config.max_arity),
            tree: CreatorTree::new(config.module_name.clone()),
            types_db: TypesDatabase::new(config.smart_ptrs.clone()),
            dependencies: DependencyManager::new(config.smart_ptrs.clone()),
            diagnostics: DiagnosticQueue::with_config(DiagnosticConfig {
                limit: config.diagnostic_limit,
                deduplicate: true,
            }),
            class_creators: FxHashMap::default(),
            wrappers: FxHashMap::default(),
            free_operators: Vec::new(),
            opaque_types: FxHashSet::default(),
            array_types: FxHashSet::default(),
            cycles: Vec::new(),
        }
    }

    // ── Preparation ─────────────────────────────────────────────

    /// Namespace-level declarations that will be exported.
    fn prepare(&mut self) -> Vec<DeclId> {
        let graph = self.graph;
        let mut out = Vec::new();
        for decl in graph.flatten_all() {
            let declaration = graph.decl(decl);
            let in_namespace = declaration
                .parent
                .is_some_and(|parent| graph.decl(parent).is_namespace());
            if declaration.is_namespace() || !in_namespace {
                continue;
            }
            if self.accept(decl) {
                out.push(decl);
            }
        }
        tracing::debug!(declarations = out.len(), "prepared namespace-level declarations");
        out
    }

    /// Whether `decl` is exported, reporting why when it is not.
    fn accept(&mut self, decl: DeclId) -> bool {
        if self.is_ignored(decl) {
            tracing::trace!(decl = %self.graph.full_name(decl), "ignored by annotation");
            return false;
        }
        if let Some(reason) = self.exportable.reason(decl) {
            self.report_unexportable(decl, &reason);
            return false;
        }
        if self.annotations.is_already_exposed(decl) {
            tracing::debug!(decl = %self.graph.full_name(decl), "already exposed elsewhere");
            return false;
        }
        true
    }

    /// Ignored itself or inside an ignored namespace.
    fn is_ignored(&self, decl: DeclId) -> bool {
        std::iter::successors(Some(decl), |current| self.graph.parent(*current))
            .any(|scope| self.annotations.is_ignored(scope))
    }

    fn report_unexportable(&mut self, decl: DeclId, reason: &ExportReason) {
        // Compiler-generated members are everywhere; they are only traced.
        if reason.code == DiagnosticCode::W1002 {
            tracing::trace!(decl = %self.graph.full_name(decl), "{}", reason.detail);
            return;
        }
        self.diagnostics.add(reason.to_diagnostic(self.graph, decl));
    }

    /// Record an exported declaration with the dependency manager and the
    /// types database.
    fn export(&mut self, decl: DeclId) {
        self.dependencies.add_exported(decl);
        self.types_db.observe(self.graph, decl);
    }

    // ── Visiting ────────────────────────────────────────────────

    fn visit(&mut self, decl: DeclId, scope: CreatorId) {
        let graph = self.graph;
        match &graph.decl(decl).kind {
            DeclKind::Namespace(_) | DeclKind::ClassDeclaration | DeclKind::Typedef { .. } => {}
            DeclKind::Class(_) => self.visit_class(decl, scope),
            DeclKind::Enumeration(enumeration) => {
                let kind = if graph.decl(decl).name.is_empty() {
                    CreatorKind::UnnamedEnum {
                        values: enumeration.values.iter().map(|value| value.name.clone()).collect(),
                    }
                } else {
                    let alias = self.annotations.get(decl).alias.clone();
                    CreatorKind::Enum {
                        alias: alias.unwrap_or_else(|| graph.decl(decl).name.clone()),
                    }
                };
                self.tree.adopt(scope, kind, Some(decl));
                self.dependencies.add_exported(decl);
            }
            DeclKind::Variable(variable) => self.visit_variable(decl, variable.ty, variable.bits, scope),
            DeclKind::Calldef(calldef) => match calldef.kind {
                CalldefKind::FreeFunction => self.visit_free_function(decl, scope),
                CalldefKind::MemberFunction => self.visit_member_function(decl, scope),
                CalldefKind::MemberOperator => {
                    let symbol = graph.decl(decl).operator_symbol().unwrap_or_default();
                    if FUNCTION_LIKE_OPERATORS.contains(&symbol) {
                        self.visit_member_function(decl, scope);
                    } else {
                        self.visit_member_operator(decl, symbol.to_owned(), scope);
                    }
                }
                CalldefKind::Constructor => self.visit_constructor(decl, scope),
                CalldefKind::Destructor => {}
                CalldefKind::FreeOperator => self.free_operators.push(decl),
                CalldefKind::CastingOperator => self.visit_casting_operator(decl, scope),
            },
        }
    }

    fn visit_class(&mut self, class: DeclId, scope: CreatorId) {
        let graph = self.graph;
        if self.config.enable_containers && self.types_db.register_container(graph, class) {
            tracing::debug!(class = %graph.full_name(class), "exported as a container suite");
            self.dependencies.add_exported(class);
            return;
        }
        let is_abstract = graph.decl(class).as_class().is_some_and(|info| info.is_abstract);
        let noncopyable = self
            .annotations
            .get(class)
            .noncopyable
            .unwrap_or_else(|| is_abstract || !traits::is_copy_constructible(graph, class));

        let creator = self.tree.adopt(
            scope,
            CreatorKind::Class {
                alias: self.annotations.class_alias(graph, class),
                held_type: None,
                noncopyable,
                wrapper: None,
            },
            Some(class),
        );
        self.class_creators.insert(class, creator);
        self.dependencies.add_exported(class);

        let reasons = self.wrapper_reasons(class);
        if !reasons.is_empty() {
            tracing::debug!(class = %graph.full_name(class), reasons = reasons.len(), "class needs a wrapper");
            let declarations = self.tree.declarations();
            let wrapper = self
                .tree
                .adopt(declarations, CreatorKind::ClassWrapper { reasons }, Some(class));
            if let CreatorKind::Class { wrapper: slot, .. } = &mut self.tree.node_mut(creator).kind {
                *slot = Some(wrapper);
            }
            self.wrappers.insert(class, wrapper);

            let copy_ctor = traits::find_copy_constructor(graph, class);
            if !noncopyable && copy_ctor.map_or(true, |ctor| graph.decl(ctor).is_artificial()) {
                self.tree.adopt(wrapper, CreatorKind::CopyConstructorWrapper, copy_ctor);
            }
            if let Some(ctor) = traits::find_trivial_constructor(graph, class) {
                if graph.decl(ctor).is_artificial() {
                    self.tree
                        .adopt(wrapper, CreatorKind::NullConstructorWrapper, Some(ctor));
                }
            }
        }

        let mut members = Vec::new();
        for member in graph.members(class) {
            if self.accept(*member) {
                members.push(*member);
            }
        }
        let sorted = sort::sort_declarations(graph, &members, self.config.include_vars_in_sort);
        self.cycles.extend(sorted.cycles);
        for member in sorted.order {
            self.visit(member, creator);
        }

        let statics: Vec<CreatorId> = self
            .tree
            .children(creator)
            .iter()
            .copied()
            .filter(|child| matches!(self.tree.node(*child).kind, CreatorKind::StaticMethod { .. }))
            .collect();
        for child in statics {
            self.tree.move_to_end(child);
        }
    }

    /// Why `class` needs a wrapper class. Empty when it does not.
    fn wrapper_reasons(&self, class: DeclId) -> Vec<WrapperReason> {
        let graph = self.graph;
        let mut reasons = Vec::new();
        for member in graph.members(class) {
            if self.is_ignored(*member) || !self.exportable.is_exportable(*member) {
                continue;
            }
            let decl = graph.decl(*member);
            let name = decl.name.clone();
            match &decl.kind {
                DeclKind::Calldef(calldef) => {
                    if matches!(calldef.kind, CalldefKind::Constructor | CalldefKind::Destructor) {
                        continue;
                    }
                    if decl.access != Access::Public {
                        reasons.push(WrapperReason::NonPublicFunction(name.clone()));
                    }
                    if decl.flags.contains(DeclFlags::VIRTUAL) {
                        reasons.push(WrapperReason::VirtualFunction(name.clone()));
                    }
                    if self.annotations.has_transformations(*member) {
                        reasons.push(WrapperReason::TransformedFunction(name));
                    }
                }
                DeclKind::Variable(variable) => {
                    if variable.bits.is_some() {
                        reasons.push(WrapperReason::BitField(name));
                    } else if traits::is_array(graph, variable.ty) {
                        reasons.push(WrapperReason::ArrayMember(name));
                    } else if traits::is_pointer(graph, variable.ty) {
                        reasons.push(WrapperReason::PointerMember(name));
                    } else if traits::is_reference(graph, variable.ty) {
                        reasons.push(WrapperReason::ReferenceMember(name));
                    }
                }
                DeclKind::Class(_) => {
                    if !self.wrapper_reasons(*member).is_empty() {
                        reasons.push(WrapperReason::NestedClass(name));
                    }
                }
                _ => {}
            }
        }
        reasons
    }

    /// The wrapper creator member wrappers of `class` go into.
    fn wrapper_scope(&self, class: Option<DeclId>) -> CreatorId {
        class
            .and_then(|class| self.wrappers.get(&class).copied())
            .unwrap_or_else(|| self.tree.declarations())
    }

    /// Call policy slot of a callable; `None` excludes the callable.
    fn policy_slot(&mut self, decl: DeclId, hint: AccessorHint) -> Option<PolicySlot> {
        let entry = self.annotations.get(decl);
        let annotated = match hint {
            AccessorHint::None => &entry.call_policies,
            AccessorHint::Get => &entry.getter_call_policies,
            AccessorHint::Set => &entry.setter_call_policies,
        };
        if let Some(policy) = annotated {
            return Some(PolicySlot::Resolved(policy.clone()));
        }
        if let Some(policy) = call_policies::resolve(self.graph, self.annotations, decl, hint) {
            return Some(PolicySlot::Resolved(policy));
        }

        let full_name = self.graph.full_name(decl);
        let exclude = self.config.exclude_unresolved_policies;
        tracing::debug!(decl = %full_name, exclude, "no call policy");
        let message = if exclude {
            "no call policy could be inferred; the declaration is excluded"
        } else {
            "no call policy could be inferred; one must be supplied"
        };
        self.diagnostics.add(
            Diagnostic::warning(DiagnosticCode::W3000)
                .with_declaration(full_name)
                .with_message(message),
        );
        (!exclude).then_some(PolicySlot::NeedsManual)
    }

    /// Register the pointee class of an opaque pointer return once.
    fn register_opaque(&mut self, decl: DeclId, slot: &PolicySlot) {
        if !slot.policy().is_some_and(|policy| policy.is_return_opaque_pointer()) {
            return;
        }
        let graph = self.graph;
        let Some(ret) = graph.decl(decl).as_calldef().and_then(|calldef| calldef.return_type) else {
            return;
        };
        let pointee = if traits::is_pointer(graph, ret) {
            traits::remove_pointer(graph, ret)
        } else {
            traits::remove_reference(graph, ret)
        };
        let Some(class) = traits::class_or_forward(graph, traits::remove_cv(graph, pointee)) else {
            return;
        };
        let spelling = graph.full_name(class);
        if self.opaque_types.insert(spelling.clone()) {
            let body = self.tree.body();
            self.tree
                .adopt(body, CreatorKind::OpaqueTypeRegistrator { spelling }, Some(class));
        }
    }

    fn visit_free_function(&mut self, decl: DeclId, scope: CreatorId) {
        let Some(policy) = self.policy_slot(decl, AccessorHint::None) else {
            return;
        };
        let transformed = self.annotations.has_transformations(decl);
        if transformed {
            let declarations = self.tree.declarations();
            self.tree
                .adopt(declarations, CreatorKind::FreeFunctionWrapper, Some(decl));
        }
        self.register_opaque(decl, &policy);
        self.tree
            .adopt(scope, CreatorKind::FreeFunction { transformed, policy }, Some(decl));
        self.export(decl);
    }

    fn visit_member_function(&mut self, decl: DeclId, scope: CreatorId) {
        let graph = self.graph;
        let declaration = graph.decl(decl);
        let member = MemberTraits {
            access: declaration.access,
            virtuality: declaration.virtuality(),
            is_static: declaration.is_static(),
            transformed: self.annotations.has_transformations(decl),
            overridable: self.annotations.is_overridable(decl),
        };
        let (maker, wrapper) = wizard::classify(member);
        tracing::trace!(decl = %graph.full_name(decl), ?maker, ?wrapper, "classified member function");

        let policy = match maker {
            Some(_) => match self.policy_slot(decl, AccessorHint::None) {
                Some(policy) => Some(policy),
                None => return,
            },
            None => None,
        };
        if let Some(kind) = wrapper {
            let wrapper_scope = self.wrapper_scope(graph.parent_class(decl));
            self.tree
                .adopt(wrapper_scope, CreatorKind::MemberFunctionWrapper { kind }, Some(decl));
        }
        if let (Some(maker), Some(policy)) = (maker, policy) {
            self.register_opaque(decl, &policy);
            self.tree.adopt(
                scope,
                CreatorKind::MemberFunction {
                    maker,
                    wrapper,
                    policy,
                },
                Some(decl),
            );
            if member.is_static {
                self.tree.adopt(
                    scope,
                    CreatorKind::StaticMethod {
                        name: declaration.name.clone(),
                    },
                    Some(decl),
                );
            }
        }
        if maker.is_some() || wrapper.is_some() {
            self.export(decl);
        }
    }

    fn visit_member_operator(&mut self, decl: DeclId, symbol: String, scope: CreatorId) {
        let Some(policy) = self.policy_slot(decl, AccessorHint::None) else {
            return;
        };
        self.register_opaque(decl, &policy);
        self.tree
            .adopt(scope, CreatorKind::MemberOperator { symbol, policy }, Some(decl));
        self.export(decl);
    }

    fn visit_constructor(&mut self, decl: DeclId, scope: CreatorId) {
        let graph = self.graph;
        let Some(class) = graph.parent_class(decl) else {
            return;
        };
        let wrapper = self.wrappers.get(&class).copied();
        let is_abstract = graph.decl(class).as_class().is_some_and(|info| info.is_abstract);
        let declaration = graph.decl(decl);
        if wrapper.is_none() && (is_abstract || declaration.access != Access::Public) {
            tracing::trace!(decl = %graph.full_name(decl), "constructor not reachable without a wrapper");
            return;
        }
        let Some(policy) = self.policy_slot(decl, AccessorHint::None) else {
            return;
        };
        if let Some(wrapper) = wrapper {
            self.tree
                .adopt(wrapper, CreatorKind::ConstructorWrapper, Some(decl));
        }
        self.tree
            .adopt(scope, CreatorKind::Constructor { policy }, Some(decl));

        let single_argument = declaration
            .as_calldef()
            .is_some_and(|calldef| calldef.required_args().len() == 1);
        let converts = single_argument
            && !is_abstract
            && declaration.access == Access::Public
            && !declaration.flags.contains(DeclFlags::EXPLICIT)
            && !traits::is_copy_constructor(graph, class, decl);
        if converts {
            let body = self.tree.body();
            self.tree
                .adopt(body, CreatorKind::ImplicitConversion, Some(decl));
        }
        self.export(decl);
    }

    fn visit_casting_operator(&mut self, decl: DeclId, scope: CreatorId) {
        let graph = self.graph;
        let Some(policy) = self.policy_slot(decl, AccessorHint::None) else {
            return;
        };
        let is_abstract = graph
            .parent_class(decl)
            .and_then(|class| graph.decl(class).as_class())
            .is_some_and(|info| info.is_abstract);
        let returns_reference = graph
            .decl(decl)
            .as_calldef()
            .and_then(|calldef| calldef.return_type)
            .is_some_and(|ret| traits::is_reference(graph, ret));
        if !is_abstract && !returns_reference {
            let body = self.tree.body();
            self.tree.adopt(body, CreatorKind::CastingOperator, Some(decl));
        }
        self.register_opaque(decl, &policy);
        self.tree
            .adopt(scope, CreatorKind::MemberCastingOperator { policy }, Some(decl));
        self.export(decl);
    }

    fn visit_variable(&mut self, decl: DeclId, ty: TypeId, bits: Option<u32>, scope: CreatorId) {
        let graph = self.graph;
        let is_array = traits::is_array(graph, ty);
        if is_array {
            let spelling = graph.decl_string(ty);
            if self.array_types.insert(spelling.clone()) {
                let body = self.tree.body();
                self.tree
                    .adopt(body, CreatorKind::ArrayRegistrator { spelling }, Some(decl));
            }
        }

        let class = graph.parent_class(decl);
        let (maker, wrapper) = if class.is_none() {
            if is_array {
                (CreatorKind::ArrayGlobalVariable, Some(CreatorKind::ArrayGlobalVariableWrapper))
            } else {
                (CreatorKind::GlobalVariable, None)
            }
        } else if bits.is_some() {
            (CreatorKind::BitField, Some(CreatorKind::BitFieldWrapper))
        } else if is_array {
            (CreatorKind::ArrayMember, Some(CreatorKind::ArrayMemberWrapper))
        } else if traits::is_pointer(graph, ty) {
            (CreatorKind::PointerMember, Some(CreatorKind::PointerMemberWrapper))
        } else if traits::is_reference(graph, ty) {
            let getter = self.policy_slot(decl, AccessorHint::Get);
            let setter = self.policy_slot(decl, AccessorHint::Set);
            let (Some(getter), Some(setter)) = (getter, setter) else {
                return;
            };
            self.register_accessor_opaque(ty, &getter);
            (
                CreatorKind::ReferenceMember { getter, setter },
                Some(CreatorKind::ReferenceMemberWrapper),
            )
        } else {
            (CreatorKind::MemberVariable, None)
        };

        if let Some(wrapper) = wrapper {
            let wrapper_scope = self.wrapper_scope(class);
            self.tree.adopt(wrapper_scope, wrapper, Some(decl));
        }
        self.tree.adopt(scope, maker, Some(decl));
        self.export(decl);
    }

    /// Opaque registration for a reference member's getter.
    fn register_accessor_opaque(&mut self, ty: TypeId, getter: &PolicySlot) {
        if !getter.policy().is_some_and(|policy| policy.is_return_opaque_pointer()) {
            return;
        }
        let graph = self.graph;
        let referent = traits::remove_cv(graph, traits::remove_reference(graph, ty));
        if let Some(class) = traits::class_or_forward(graph, referent) {
            let spelling = graph.full_name(class);
            if self.opaque_types.insert(spelling.clone()) {
                let body = self.tree.body();
                self.tree
                    .adopt(body, CreatorKind::OpaqueTypeRegistrator { spelling }, Some(class));
            }
        }
    }

    // ── Finishing passes ────────────────────────────────────────

    /// Attach deferred free operators to their target class creators.
    fn adopt_free_operators(&mut self) {
        let graph = self.graph;
        for decl in std::mem::take(&mut self.free_operators) {
            let operands: SmallVec<[DeclId; 2]> = graph
                .decl(decl)
                .as_calldef()
                .into_iter()
                .flat_map(|calldef| calldef.argument_types())
                .filter(|ty| !traits::is_std_ostream(graph, traits::base_type(graph, *ty)))
                .filter_map(|ty| traits::class_or_forward(graph, traits::base_type(graph, ty)))
                .collect();
            let target = operands
                .iter()
                .find_map(|class| self.class_creators.get(class).copied());

            let Some(creator) = target else {
                self.diagnostics.add(
                    Diagnostic::warning(DiagnosticCode::W3002)
                        .with_declaration(graph.full_name(decl))
                        .with_message("none of the operand classes is exported; the operator is skipped"),
                );
                continue;
            };
            let Some(policy) = self.policy_slot(decl, AccessorHint::None) else {
                continue;
            };
            let symbol = graph.decl(decl).operator_symbol().unwrap_or_default().to_owned();
            self.tree
                .adopt(creator, CreatorKind::FreeOperator { symbol, policy }, Some(decl));
            self.export(decl);
        }
    }

    /// Holders and smart pointer registrators for every class creator.
    fn treat_smart_pointers(&mut self) {
        let graph = self.graph;
        let mut registered: FxHashSet<Registrator> = FxHashSet::default();
        for creator in self.tree.classes() {
            let Some(class) = self.tree.node(creator).decl else {
                continue;
            };
            let is_abstract = graph.decl(class).as_class().is_some_and(|info| info.is_abstract);
            let held = match &self.annotations.get(class).held_type {
                Some(smart_ptr) => Some(HeldType {
                    smart_ptr: smart_ptr.clone(),
                    class,
                }),
                None if !is_abstract => self.types_db.create_holder(graph, class),
                None => None,
            };

            for registrator in self.types_db.create_registrators(graph, class) {
                let kind = match &registrator {
                    Registrator::SmartPointer { smart_ptr, .. } => {
                        // The holder registers itself.
                        if held.as_ref().is_some_and(|holder| &holder.smart_ptr == smart_ptr) {
                            continue;
                        }
                        CreatorKind::SmartPointerRegistrator {
                            smart_ptr: smart_ptr.clone(),
                        }
                    }
                    Registrator::Converter {
                        smart_ptr,
                        source,
                        target,
                    } => CreatorKind::SmartPointerConverter {
                        smart_ptr: smart_ptr.clone(),
                        source: *source,
                        target: *target,
                    },
                };
                if registered.insert(registrator) {
                    self.tree.adopt(creator, kind, Some(class));
                }
            }

            if let CreatorKind::Class { held_type, .. } = &mut self.tree.node_mut(creator).kind {
                *held_type = held;
            }
        }
    }

    /// One suite per used container, plus value traits for element classes
    /// that cannot be compared.
    fn add_container_suites(&mut self) {
        let graph = self.graph;
        let containers: Vec<_> = self
            .types_db
            .used_containers()
            .map(|(spelling, container)| (spelling.to_owned(), container.clone()))
            .collect();
        let mut with_traits: FxHashSet<DeclId> = FxHashSet::default();
        let body = self.tree.body();
        for (spelling, container) in containers {
            self.tree.adopt(
                body,
                CreatorKind::ContainerSuite {
                    spelling: spelling.clone(),
                    kind: container.kind,
                },
                Some(container.class),
            );

            let Some(element) = container
                .element
                .and_then(|ty| traits::class_declaration(graph, ty))
            else {
                continue;
            };
            let missing: Vec<&str> = ["==", "<"]
                .into_iter()
                .filter(|symbol| !traits::has_public_operator(graph, element, symbol))
                .collect();
            if missing.is_empty() || !with_traits.insert(element) {
                continue;
            }
            let declarations = self.tree.declarations();
            self.tree
                .adopt(declarations, CreatorKind::ValueTraits { element }, Some(element));
            let mut diag = Diagnostic::warning(DiagnosticCode::W4002)
                .with_declaration(graph.full_name(element))
                .with_message(format!("element of `{spelling}` cannot be compared; value traits generated"));
            for symbol in missing {
                diag = diag.with_note(format!("no public operator{symbol}"));
            }
            self.diagnostics.add(diag);
        }
    }

    fn finish(mut self) -> FactoryOutput {
        let graph = self.graph;
        let report = self.dependencies.inform_user(graph, self.annotations);
        self.diagnostics.extend(report);
        self.diagnostics
            .extend(self.cycles.iter().map(|cycle| cycle.to_diagnostic(graph)));
        self.diagnostics.extend(self.types_db.take_diagnostics());
        if self.diagnostics.dropped() > 0 {
            tracing::warn!(dropped = self.diagnostics.dropped(), "diagnostic limit reached");
        }
        tracing::debug!(
            creators = self.tree.len(),
            diagnostics = self.diagnostics.len(),
            "creator tree built"
        );
        FactoryOutput {
            tree: self.tree,
            diagnostics: self.diagnostics.flush(),
            types_db: self.types_db,
            dependencies: self.dependencies,
        }
    }
}
