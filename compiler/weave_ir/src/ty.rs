//! The C++ type model.

use crate::{DeclId, TypeId};

/// Classification of fundamental type spellings.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FundamentalKind {
    Void,
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    WChar,
    Char16,
    Char32,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Int128,
    UnsignedInt128,
    Float,
    Double,
    LongDouble,
    /// `complex float` and other spellings the model does not classify.
    Other,
}

impl FundamentalKind {
    /// Classify a fundamental type name as the introspection tool spells it.
    pub fn from_name(name: &str) -> Self {
        match name {
            "void" => FundamentalKind::Void,
            "bool" => FundamentalKind::Bool,
            "char" => FundamentalKind::Char,
            "signed char" => FundamentalKind::SignedChar,
            "unsigned char" => FundamentalKind::UnsignedChar,
            "wchar_t" => FundamentalKind::WChar,
            "char16_t" => FundamentalKind::Char16,
            "char32_t" => FundamentalKind::Char32,
            "short int" | "short" | "signed short" | "short signed int" => FundamentalKind::Short,
            "short unsigned int" | "unsigned short" | "unsigned short int" => {
                FundamentalKind::UnsignedShort
            }
            "int" | "signed int" | "signed" => FundamentalKind::Int,
            "unsigned int" | "unsigned" => FundamentalKind::UnsignedInt,
            "long int" | "long" | "signed long" | "long signed int" => FundamentalKind::Long,
            "long unsigned int" | "unsigned long" | "unsigned long int" => {
                FundamentalKind::UnsignedLong
            }
            "long long int" | "long long" | "long long signed int" => FundamentalKind::LongLong,
            "long long unsigned int" | "unsigned long long" | "unsigned long long int" => {
                FundamentalKind::UnsignedLongLong
            }
            "__int128_t" | "__int128" => FundamentalKind::Int128,
            "__uint128_t" | "unsigned __int128" => FundamentalKind::UnsignedInt128,
            "float" => FundamentalKind::Float,
            "double" => FundamentalKind::Double,
            "long double" => FundamentalKind::LongDouble,
            _ => FundamentalKind::Other,
        }
    }

    /// Integral types, `bool` and the character types included.
    pub fn is_integral(self) -> bool {
        !matches!(
            self,
            FundamentalKind::Void
                | FundamentalKind::Float
                | FundamentalKind::Double
                | FundamentalKind::LongDouble
                | FundamentalKind::Other
        )
    }

    pub fn is_floating_point(self) -> bool {
        matches!(
            self,
            FundamentalKind::Float | FundamentalKind::Double | FundamentalKind::LongDouble
        )
    }
}

/// A type node. Compound types refer to their base by [`TypeId`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Fundamental {
        name: String,
        kind: FundamentalKind,
    },
    Pointer(TypeId),
    Reference(TypeId),
    Cv {
        base: TypeId,
        is_const: bool,
        is_volatile: bool,
        is_restrict: bool,
    },
    Array {
        base: TypeId,
        /// `None` when the extent is unknown (`T[]`).
        size: Option<u64>,
    },
    FreeFunction {
        return_type: TypeId,
        arguments: Vec<TypeId>,
        has_ellipsis: bool,
    },
    MemberFunction {
        class: TypeId,
        return_type: TypeId,
        arguments: Vec<TypeId>,
        is_const: bool,
    },
    MemberVariable {
        class: TypeId,
        variable: TypeId,
    },
    Ellipsis,
    Unknown,
    /// A type naming a declaration (class, enumeration, typedef).
    Declarated(DeclId),
}

impl Type {
    pub fn fundamental(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = FundamentalKind::from_name(&name);
        Type::Fundamental { name, kind }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::FreeFunction { .. } | Type::MemberFunction { .. })
    }
}
