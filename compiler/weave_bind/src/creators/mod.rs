//! The code creator tree.
//!
//! Every node describes one piece of registration code; an external
//! renderer turns the tree into source text. Nodes live in an arena owned by
//! [`CreatorTree`] and refer to each other by [`CreatorId`]. The root is a
//! module node with two fixed children:
//! - the declaration section, holding wrappers and value traits that must
//!   be declared before the registration function;
//! - the body, holding the registrations themselves.

use std::fmt;

use weave_ir::{define_id, DeclId, DeclarationGraph};

use crate::call_policies::CallPolicy;
use crate::containers::ContainerKind;

define_id!(
    /// Index of a node in a [`CreatorTree`].
    CreatorId,
);

/// Call policy slot of a callable creator.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PolicySlot {
    Resolved(CallPolicy),
    /// No policy could be inferred; generated code will not compile until
    /// a user supplies one.
    NeedsManual,
}

impl PolicySlot {
    pub fn policy(&self) -> Option<&CallPolicy> {
        match self {
            PolicySlot::Resolved(policy) => Some(policy),
            PolicySlot::NeedsManual => None,
        }
    }
}

impl fmt::Display for PolicySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicySlot::Resolved(policy) => fmt::Display::fmt(policy, f),
            PolicySlot::NeedsManual => f.write_str("<needs call policy>"),
        }
    }
}

impl From<Option<CallPolicy>> for PolicySlot {
    fn from(policy: Option<CallPolicy>) -> Self {
        policy.map_or(PolicySlot::NeedsManual, PolicySlot::Resolved)
    }
}

/// Smart pointer a class is held by.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct HeldType {
    /// Template name (`boost::shared_ptr`).
    pub smart_ptr: String,
    pub class: DeclId,
}

impl HeldType {
    pub fn spelling(&self, graph: &DeclarationGraph) -> String {
        format!("{}< {} >", self.smart_ptr, graph.full_name(self.class))
    }
}

/// Why a class needs a wrapper class.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum WrapperReason {
    VirtualFunction(String),
    NonPublicFunction(String),
    BitField(String),
    PointerMember(String),
    ReferenceMember(String),
    ArrayMember(String),
    NestedClass(String),
    TransformedFunction(String),
}

impl fmt::Display for WrapperReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapperReason::VirtualFunction(name) => write!(f, "virtual member function `{name}`"),
            WrapperReason::NonPublicFunction(name) => {
                write!(f, "non-public member function `{name}`")
            }
            WrapperReason::BitField(name) => write!(f, "bit field `{name}`"),
            WrapperReason::PointerMember(name) => write!(f, "pointer member `{name}`"),
            WrapperReason::ReferenceMember(name) => write!(f, "reference member `{name}`"),
            WrapperReason::ArrayMember(name) => write!(f, "array member `{name}`"),
            WrapperReason::NestedClass(name) => write!(f, "nested class `{name}` has a wrapper"),
            WrapperReason::TransformedFunction(name) => {
                write!(f, "member function `{name}` has transformations")
            }
        }
    }
}

/// Registration of a member function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberMaker {
    Plain,
    Virtual,
    PureVirtual,
    Transformed,
    VirtualTransformed,
    Protected,
    ProtectedStatic,
    ProtectedVirtual,
    ProtectedPureVirtual,
}

/// Wrapper code a member function needs inside the class wrapper.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberWrapper {
    Virtual,
    PureVirtual,
    Transformed,
    VirtualTransformed,
    Protected,
    ProtectedStatic,
    ProtectedVirtual,
    ProtectedPureVirtual,
    PrivateVirtual,
    PrivatePureVirtual,
}

/// What a node generates.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CreatorKind {
    Module { name: String },
    DeclarationSection,
    ModuleBody,

    Class {
        alias: String,
        held_type: Option<HeldType>,
        noncopyable: bool,
        /// The wrapper class node, in the declaration section.
        wrapper: Option<CreatorId>,
    },
    ClassWrapper { reasons: Vec<WrapperReason> },
    CopyConstructorWrapper,
    NullConstructorWrapper,

    MemberFunction {
        maker: MemberMaker,
        wrapper: Option<MemberWrapper>,
        policy: PolicySlot,
    },
    /// Wrapper body of a member function, inside a class wrapper.
    MemberFunctionWrapper { kind: MemberWrapper },
    StaticMethod { name: String },
    FreeFunction {
        transformed: bool,
        policy: PolicySlot,
    },
    FreeFunctionWrapper,
    Constructor { policy: PolicySlot },
    ConstructorWrapper,
    /// Implicit conversion through a converting constructor.
    ImplicitConversion,
    MemberOperator { symbol: String, policy: PolicySlot },
    FreeOperator { symbol: String, policy: PolicySlot },
    /// `operator T()` registered as a free conversion.
    CastingOperator,
    MemberCastingOperator { policy: PolicySlot },

    Enum { alias: String },
    UnnamedEnum { values: Vec<String> },

    GlobalVariable,
    ArrayGlobalVariable,
    ArrayGlobalVariableWrapper,
    BitField,
    BitFieldWrapper,
    ArrayMember,
    ArrayMemberWrapper,
    PointerMember,
    PointerMemberWrapper,
    ReferenceMember {
        getter: PolicySlot,
        setter: PolicySlot,
    },
    ReferenceMemberWrapper,
    MemberVariable,
    ArrayRegistrator { spelling: String },

    OpaqueTypeRegistrator { spelling: String },
    SmartPointerRegistrator { smart_ptr: String },
    SmartPointerConverter {
        smart_ptr: String,
        source: DeclId,
        target: DeclId,
    },
    ContainerSuite {
        spelling: String,
        kind: ContainerKind,
    },
    ValueTraits { element: DeclId },
}

impl CreatorKind {
    /// Policy of a callable creator.
    pub fn policy(&self) -> Option<&PolicySlot> {
        match self {
            CreatorKind::MemberFunction { policy, .. }
            | CreatorKind::FreeFunction { policy, .. }
            | CreatorKind::Constructor { policy }
            | CreatorKind::MemberOperator { policy, .. }
            | CreatorKind::FreeOperator { policy, .. }
            | CreatorKind::MemberCastingOperator { policy } => Some(policy),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, CreatorKind::Class { .. })
    }

    /// Variant name, used when listing a tree.
    pub fn name(&self) -> &'static str {
        match self {
            CreatorKind::Module { .. } => "Module",
            CreatorKind::DeclarationSection => "DeclarationSection",
            CreatorKind::ModuleBody => "ModuleBody",
            CreatorKind::Class { .. } => "Class",
            CreatorKind::ClassWrapper { .. } => "ClassWrapper",
            CreatorKind::CopyConstructorWrapper => "CopyConstructorWrapper",
            CreatorKind::NullConstructorWrapper => "NullConstructorWrapper",
            CreatorKind::MemberFunction { .. } => "MemberFunction",
            CreatorKind::MemberFunctionWrapper { .. } => "MemberFunctionWrapper",
            CreatorKind::StaticMethod { .. } => "StaticMethod",
            CreatorKind::FreeFunction { .. } => "FreeFunction",
            CreatorKind::FreeFunctionWrapper => "FreeFunctionWrapper",
            CreatorKind::Constructor { .. } => "Constructor",
            CreatorKind::ConstructorWrapper => "ConstructorWrapper",
            CreatorKind::ImplicitConversion => "ImplicitConversion",
            CreatorKind::MemberOperator { .. } => "MemberOperator",
            CreatorKind::FreeOperator { .. } => "FreeOperator",
            CreatorKind::CastingOperator => "CastingOperator",
            CreatorKind::MemberCastingOperator { .. } => "MemberCastingOperator",
            CreatorKind::Enum { .. } => "Enum",
            CreatorKind::UnnamedEnum { .. } => "UnnamedEnum",
            CreatorKind::GlobalVariable => "GlobalVariable",
            CreatorKind::ArrayGlobalVariable => "ArrayGlobalVariable",
            CreatorKind::ArrayGlobalVariableWrapper => "ArrayGlobalVariableWrapper",
            CreatorKind::BitField => "BitField",
            CreatorKind::BitFieldWrapper => "BitFieldWrapper",
            CreatorKind::ArrayMember => "ArrayMember",
            CreatorKind::ArrayMemberWrapper => "ArrayMemberWrapper",
            CreatorKind::PointerMember => "PointerMember",
            CreatorKind::PointerMemberWrapper => "PointerMemberWrapper",
            CreatorKind::ReferenceMember { .. } => "ReferenceMember",
            CreatorKind::ReferenceMemberWrapper => "ReferenceMemberWrapper",
            CreatorKind::MemberVariable => "MemberVariable",
            CreatorKind::ArrayRegistrator { .. } => "ArrayRegistrator",
            CreatorKind::OpaqueTypeRegistrator { .. } => "OpaqueTypeRegistrator",
            CreatorKind::SmartPointerRegistrator { .. } => "SmartPointerRegistrator",
            CreatorKind::SmartPointerConverter { .. } => "SmartPointerConverter",
            CreatorKind::ContainerSuite { .. } => "ContainerSuite",
            CreatorKind::ValueTraits { .. } => "ValueTraits",
        }
    }
}

/// A node of the creator tree.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CreatorNode {
    pub kind: CreatorKind,
    /// The declaration the node was created for.
    pub decl: Option<DeclId>,
    pub parent: Option<CreatorId>,
    pub children: Vec<CreatorId>,
}

/// Arena of creator nodes rooted at a module node.
#[derive(Clone, Debug)]
pub struct CreatorTree {
    nodes: Vec<CreatorNode>,
    declarations: CreatorId,
    body: CreatorId,
}

impl CreatorTree {
    pub fn new(module_name: impl Into<String>) -> Self {
        let mut tree = CreatorTree {
            nodes: vec![CreatorNode {
                kind: CreatorKind::Module {
                    name: module_name.into(),
                },
                decl: None,
                parent: None,
                children: Vec::new(),
            }],
            declarations: CreatorId::new(0),
            body: CreatorId::new(0),
        };
        tree.declarations = tree.adopt(tree.root(), CreatorKind::DeclarationSection, None);
        tree.body = tree.adopt(tree.root(), CreatorKind::ModuleBody, None);
        tree
    }

    pub fn root(&self) -> CreatorId {
        CreatorId::new(0)
    }

    pub fn declarations(&self) -> CreatorId {
        self.declarations
    }

    pub fn body(&self) -> CreatorId {
        self.body
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: CreatorId) -> &CreatorNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: CreatorId) -> &mut CreatorNode {
        &mut self.nodes[id.index()]
    }

    pub fn children(&self, id: CreatorId) -> &[CreatorId] {
        &self.node(id).children
    }

    /// Append a new node as the last child of `parent`.
    pub fn adopt(&mut self, parent: CreatorId, kind: CreatorKind, decl: Option<DeclId>) -> CreatorId {
        let id = CreatorId::from_index(self.nodes.len());
        self.nodes.push(CreatorNode {
            kind,
            decl,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.node_mut(parent).children.push(id);
        id
    }

    /// Move `child` to the end of its parent's children.
    pub fn move_to_end(&mut self, child: CreatorId) {
        let Some(parent) = self.node(child).parent else {
            return;
        };
        let children = &mut self.node_mut(parent).children;
        if let Some(position) = children.iter().position(|id| *id == child) {
            children.remove(position);
            children.push(child);
        }
    }

    /// All nodes below `from`, in preorder, `from` included.
    pub fn walk(&self, from: CreatorId) -> Vec<CreatorId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// The first node (in preorder) created for `decl`.
    pub fn find_by_decl(&self, decl: DeclId) -> Option<CreatorId> {
        self.walk(self.root())
            .into_iter()
            .find(|id| self.node(*id).decl == Some(decl))
    }

    /// Class creators in preorder.
    pub fn classes(&self) -> Vec<CreatorId> {
        self.walk(self.root())
            .into_iter()
            .filter(|id| self.node(*id).kind.is_class())
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&CreatorKind) -> bool) -> usize {
        self.nodes.iter().filter(|node| matches(&node.kind)).count()
    }
}

#[cfg(test)]
mod tests;
