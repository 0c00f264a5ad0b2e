//! Declarations: the nodes of the declaration graph.

use std::fmt;

use smallvec::SmallVec;

use crate::{DeclFlags, DeclId, TypeId};

/// Member access level.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

impl Access {
    /// Parse the dump spelling (`public`, `protected`, `private`).
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "public" => Some(Access::Public),
            "protected" => Some(Access::Protected),
            "private" => Some(Access::Private),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class key used in the declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassKind {
    Class,
    Struct,
    Union,
}

impl ClassKind {
    /// Access applied to members and bases that carry no explicit access.
    pub fn default_access(self) -> Access {
        match self {
            ClassKind::Class => Access::Private,
            ClassKind::Struct | ClassKind::Union => Access::Public,
        }
    }
}

/// Source location of a declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    /// Locations the compiler invents for builtin declarations.
    pub fn is_internal(&self) -> bool {
        matches!(self.file.as_str(), "<internal>" | "<builtin>" | "<built-in>")
    }
}

/// One step of a base/derived relationship.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct HierarchyInfo {
    /// The class on the other end of the edge.
    pub related: DeclId,
    pub access: Access,
    pub is_virtual: bool,
}

/// Namespace payload.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Namespace {
    pub members: Vec<DeclId>,
}

/// Class payload.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Class {
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub size: Option<u64>,
    pub align: Option<u64>,
    /// Direct bases in declaration order.
    pub bases: SmallVec<[HierarchyInfo; 2]>,
    /// Classes deriving directly from this one. Informational only.
    pub derived: Vec<HierarchyInfo>,
    pub members: Vec<DeclId>,
    /// Typedefs that name this class.
    pub aliases: Vec<DeclId>,
}

impl Class {
    pub fn new(kind: ClassKind) -> Self {
        Class {
            kind,
            is_abstract: false,
            size: None,
            align: None,
            bases: SmallVec::new(),
            derived: Vec::new(),
            members: Vec::new(),
            aliases: Vec::new(),
        }
    }
}

/// A single enumerator.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumValue {
    pub name: String,
    /// Wide enough for both `i64` and `u64` underlying types.
    pub value: i128,
}

/// Enumeration payload.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Enumeration {
    pub values: Vec<EnumValue>,
}

impl Enumeration {
    pub fn has_value_name(&self, name: &str) -> bool {
        self.values.iter().any(|v| v.name == name)
    }
}

/// Variable payload (namespace-level variables and data members).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Variable {
    pub ty: TypeId,
    /// Bit-field width.
    pub bits: Option<u32>,
    /// Initializer text, if the dump carries one.
    pub value: Option<String>,
}

/// Callable flavour.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CalldefKind {
    FreeFunction,
    MemberFunction,
    Constructor,
    Destructor,
    MemberOperator,
    FreeOperator,
    CastingOperator,
}

impl CalldefKind {
    pub fn is_member(self) -> bool {
        !matches!(self, CalldefKind::FreeFunction | CalldefKind::FreeOperator)
    }

    pub fn is_operator(self) -> bool {
        matches!(
            self,
            CalldefKind::MemberOperator | CalldefKind::FreeOperator | CalldefKind::CastingOperator
        )
    }
}

/// A callable argument.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Argument {
    pub name: String,
    pub ty: TypeId,
    pub default_value: Option<String>,
}

/// Callable payload.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Calldef {
    pub kind: CalldefKind,
    /// `None` for constructors and destructors.
    pub return_type: Option<TypeId>,
    pub arguments: Vec<Argument>,
    pub has_ellipsis: bool,
    /// Types listed in the exception specification.
    pub exceptions: Vec<TypeId>,
}

impl Calldef {
    /// Arguments up to (not including) the first one with a default value.
    pub fn required_args(&self) -> &[Argument] {
        let count = self
            .arguments
            .iter()
            .position(|arg| arg.default_value.is_some())
            .unwrap_or(self.arguments.len());
        &self.arguments[..count]
    }

    pub fn argument_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.arguments.iter().map(|arg| arg.ty)
    }
}

/// Virtuality of a member function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Virtuality {
    NotVirtual,
    Virtual,
    PureVirtual,
}

/// The closed set of declaration kinds.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DeclKind {
    Namespace(Namespace),
    Class(Class),
    /// A class that is only forward declared in the translation unit.
    ClassDeclaration,
    Enumeration(Enumeration),
    Typedef {
        ty: TypeId,
    },
    Variable(Variable),
    Calldef(Calldef),
}

impl DeclKind {
    /// Short lowercase description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::Namespace(_) => "namespace",
            DeclKind::Class(_) => "class",
            DeclKind::ClassDeclaration => "class declaration",
            DeclKind::Enumeration(_) => "enumeration",
            DeclKind::Typedef { .. } => "typedef",
            DeclKind::Variable(_) => "variable",
            DeclKind::Calldef(c) => match c.kind {
                CalldefKind::FreeFunction => "free function",
                CalldefKind::MemberFunction => "member function",
                CalldefKind::Constructor => "constructor",
                CalldefKind::Destructor => "destructor",
                CalldefKind::MemberOperator => "member operator",
                CalldefKind::FreeOperator => "free operator",
                CalldefKind::CastingOperator => "casting operator",
            },
        }
    }
}

/// A linked declaration.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Declaration {
    /// Possibly empty for anonymous entities.
    pub name: String,
    /// The id the introspection dump used for this declaration.
    pub dump_id: String,
    /// Owning scope. `None` only for the global namespace.
    pub parent: Option<DeclId>,
    pub location: Option<Location>,
    pub access: Access,
    pub flags: DeclFlags,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn as_class(&self) -> Option<&Class> {
        match &self.kind {
            DeclKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_calldef(&self) -> Option<&Calldef> {
        match &self.kind {
            DeclKind::Calldef(calldef) => Some(calldef),
            _ => None,
        }
    }

    pub fn as_enumeration(&self) -> Option<&Enumeration> {
        match &self.kind {
            DeclKind::Enumeration(enumeration) => Some(enumeration),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.kind {
            DeclKind::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, DeclKind::Class(_))
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, DeclKind::Namespace(_))
    }

    pub fn calldef_kind(&self) -> Option<CalldefKind> {
        self.as_calldef().map(|c| c.kind)
    }

    pub fn is_artificial(&self) -> bool {
        self.flags.contains(DeclFlags::ARTIFICIAL)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(DeclFlags::STATIC)
    }

    pub fn virtuality(&self) -> Virtuality {
        if self.flags.contains(DeclFlags::PURE_VIRTUAL) {
            Virtuality::PureVirtual
        } else if self.flags.contains(DeclFlags::VIRTUAL) {
            Virtuality::Virtual
        } else {
            Virtuality::NotVirtual
        }
    }

    /// Operator symbol for operator declarations (`+`, `[]`, `==`).
    pub fn operator_symbol(&self) -> Option<&str> {
        match self.calldef_kind() {
            Some(CalldefKind::MemberOperator | CalldefKind::FreeOperator) => {
                operator_symbol(&self.name)
            }
            _ => None,
        }
    }
}

/// Extract the symbol from an operator name (`operator[]` → `[]`).
pub fn operator_symbol(name: &str) -> Option<&str> {
    let rest = name.strip_prefix("operator")?;
    let symbol = rest.trim();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_parse() {
        assert_eq!(Access::parse("protected"), Some(Access::Protected));
        assert_eq!(Access::parse("friend"), None);
    }

    #[test]
    fn test_operator_symbol() {
        assert_eq!(operator_symbol("operator[]"), Some("[]"));
        assert_eq!(operator_symbol("operator new"), Some("new"));
        assert_eq!(operator_symbol("operator"), None);
        assert_eq!(operator_symbol("compute"), None);
    }

    #[test]
    fn test_required_args_stop_at_first_default() {
        let calldef = Calldef {
            kind: CalldefKind::FreeFunction,
            return_type: None,
            arguments: vec![
                Argument {
                    name: "a".into(),
                    ty: TypeId::new(0),
                    default_value: None,
                },
                Argument {
                    name: "b".into(),
                    ty: TypeId::new(0),
                    default_value: Some("1".into()),
                },
            ],
            has_ellipsis: false,
            exceptions: Vec::new(),
        };
        assert_eq!(calldef.required_args().len(), 1);
    }
}
