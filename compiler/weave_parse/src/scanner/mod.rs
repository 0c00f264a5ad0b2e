//! Raw table scanner.
//!
//! Streams records into five tables keyed by the dump's string ids:
//! declarations, types, files, access and membership. Nothing is resolved
//! here; references stay as strings until the linker runs.
//!
//! Records such as `Argument`, `Ellipsis` and `EnumValue` carry no id of
//! their own. They belong to the most recent "deep" record (a callable, an
//! enumeration, a function type), tracked on an explicit container stack.
//! Any other record closes the open containers.

use rustc_hash::FxHashMap;
use weave_ir::{Access, CalldefKind, ClassKind, DeclFlags, EnumValue};

use crate::{Record, RecordKind, SchemaError};

/// Raw declaration tables produced by [`scan`].
#[derive(Clone, Debug, Default)]
pub struct RawTables {
    /// Declarations in input order.
    pub decls: Vec<RawDecl>,
    pub decl_index: FxHashMap<String, usize>,
    /// Types in input order.
    pub types: Vec<RawType>,
    pub type_index: FxHashMap<String, usize>,
    /// File id to file name.
    pub files: FxHashMap<String, String>,
    /// Explicit access per declaration id.
    pub access: FxHashMap<String, Access>,
    /// Ordered member ids per scope id.
    pub members: FxHashMap<String, Vec<String>>,
}

impl RawTables {
    pub fn decl(&self, id: &str) -> Option<&RawDecl> {
        self.decl_index.get(id).map(|index| &self.decls[*index])
    }

    pub fn ty(&self, id: &str) -> Option<&RawType> {
        self.type_index.get(id).map(|index| &self.types[*index])
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawDecl {
    pub id: String,
    pub name: String,
    pub context: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub flags: DeclFlags,
    pub kind: RawDeclKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawDeclKind {
    Namespace,
    Class {
        kind: ClassKind,
        incomplete: bool,
        is_abstract: bool,
        size: Option<u64>,
        align: Option<u64>,
        bases: Vec<RawBase>,
    },
    Enumeration {
        values: Vec<EnumValue>,
    },
    Typedef {
        ty: String,
    },
    Variable {
        ty: String,
        bits: Option<u32>,
        value: Option<String>,
    },
    Calldef {
        kind: CalldefKind,
        returns: Option<String>,
        arguments: Vec<RawArgument>,
        has_ellipsis: bool,
        throws: Vec<String>,
    },
}

impl RawDeclKind {
    /// Whether a type reference may name a declaration of this kind.
    pub fn is_type_like(&self) -> bool {
        matches!(
            self,
            RawDeclKind::Class { .. } | RawDeclKind::Enumeration { .. } | RawDeclKind::Typedef { .. }
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            RawDeclKind::Namespace => "namespace",
            RawDeclKind::Class { .. } => "class",
            RawDeclKind::Enumeration { .. } => "enumeration",
            RawDeclKind::Typedef { .. } => "typedef",
            RawDeclKind::Variable { .. } => "variable",
            RawDeclKind::Calldef { .. } => "callable",
        }
    }
}

/// One entry of a class's `bases` attribute.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawBase {
    pub id: String,
    pub access: Access,
    pub is_virtual: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawArgument {
    pub name: String,
    pub ty: String,
    pub default: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawType {
    pub id: String,
    pub kind: RawTypeKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawTypeKind {
    Fundamental {
        name: String,
    },
    Pointer {
        ty: String,
    },
    Reference {
        ty: String,
    },
    Cv {
        ty: String,
        is_const: bool,
        is_volatile: bool,
        is_restrict: bool,
    },
    Array {
        ty: String,
        size: Option<u64>,
    },
    Function {
        returns: String,
        arguments: Vec<String>,
        has_ellipsis: bool,
    },
    Method {
        class: String,
        returns: String,
        arguments: Vec<String>,
        is_const: bool,
    },
    Offset {
        class: String,
        ty: String,
    },
}

/// An open container for attribute-only records.
#[derive(Copy, Clone, Debug)]
enum Container {
    Decl(usize),
    Type(usize),
    File,
}

/// Scan records into raw tables.
#[tracing::instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn scan(records: &[Record]) -> Result<RawTables, SchemaError> {
    let mut scanner = Scanner::default();
    for record in records {
        scanner.record(record)?;
    }
    let tables = scanner.finish();
    tracing::debug!(
        decls = tables.decls.len(),
        types = tables.types.len(),
        files = tables.files.len(),
        "scanned raw tables"
    );
    Ok(tables)
}

#[derive(Default)]
struct Scanner {
    tables: RawTables,
    stack: Vec<Container>,
    explicit_members: FxHashMap<String, Vec<String>>,
    context_members: FxHashMap<String, Vec<String>>,
}

impl Scanner {
    fn record(&mut self, record: &Record) -> Result<(), SchemaError> {
        if !record.kind.is_attribute_only() {
            self.stack.clear();
        }

        match record.kind {
            RecordKind::Argument | RecordKind::Ellipsis | RecordKind::EnumValue => {
                self.attach(record)?;
            }
            RecordKind::Namespace => {
                record.require("name")?;
                self.decl(record, RawDeclKind::Namespace)?;
            }
            RecordKind::Class | RecordKind::Struct | RecordKind::Union => {
                let kind = match record.kind {
                    RecordKind::Struct => ClassKind::Struct,
                    RecordKind::Union => ClassKind::Union,
                    _ => ClassKind::Class,
                };
                let bases = parse_bases(record, kind)?;
                self.decl(
                    record,
                    RawDeclKind::Class {
                        kind,
                        incomplete: record.flag("incomplete")?,
                        is_abstract: record.flag("abstract")?,
                        size: record.number("size")?,
                        align: record.number("align")?,
                        bases,
                    },
                )?;
            }
            RecordKind::Field | RecordKind::Variable => {
                record.require("name")?;
                record.require("context")?;
                let kind = RawDeclKind::Variable {
                    ty: record.require("type")?.to_owned(),
                    bits: record.number("bits")?,
                    value: record.attr("init").map(str::to_owned),
                };
                self.decl(record, kind)?;
            }
            RecordKind::Constructor
            | RecordKind::Destructor
            | RecordKind::Method
            | RecordKind::Function
            | RecordKind::OperatorMethod
            | RecordKind::OperatorFunction
            | RecordKind::Converter => {
                let index = self.calldef(record)?;
                self.stack.push(Container::Decl(index));
            }
            RecordKind::Enumeration => {
                let index = self.decl(record, RawDeclKind::Enumeration { values: Vec::new() })?;
                self.stack.push(Container::Decl(index));
            }
            RecordKind::Typedef => {
                record.require("name")?;
                let ty = record.require("type")?.to_owned();
                self.decl(record, RawDeclKind::Typedef { ty })?;
            }
            RecordKind::FundamentalType => {
                let name = record.require("name")?.to_owned();
                self.ty(record, RawTypeKind::Fundamental { name })?;
            }
            RecordKind::PointerType => {
                let ty = record.require("type")?.to_owned();
                self.ty(record, RawTypeKind::Pointer { ty })?;
            }
            RecordKind::ReferenceType => {
                let ty = record.require("type")?.to_owned();
                self.ty(record, RawTypeKind::Reference { ty })?;
            }
            RecordKind::CvQualifiedType => {
                let kind = RawTypeKind::Cv {
                    ty: record.require("type")?.to_owned(),
                    is_const: record.flag("const")?,
                    is_volatile: record.flag("volatile")?,
                    is_restrict: record.flag("restrict")?,
                };
                self.ty(record, kind)?;
            }
            RecordKind::ArrayType => {
                let kind = RawTypeKind::Array {
                    ty: record.require("type")?.to_owned(),
                    size: array_size(record)?,
                };
                self.ty(record, kind)?;
            }
            RecordKind::FunctionType => {
                let kind = RawTypeKind::Function {
                    returns: record.require("returns")?.to_owned(),
                    arguments: Vec::new(),
                    has_ellipsis: false,
                };
                let index = self.ty(record, kind)?;
                self.stack.push(Container::Type(index));
            }
            RecordKind::MethodType => {
                let kind = RawTypeKind::Method {
                    class: record.require("basetype")?.to_owned(),
                    returns: record.require("returns")?.to_owned(),
                    arguments: Vec::new(),
                    is_const: record.flag("const")?,
                };
                let index = self.ty(record, kind)?;
                self.stack.push(Container::Type(index));
            }
            RecordKind::OffsetType => {
                let kind = RawTypeKind::Offset {
                    class: record.require("basetype")?.to_owned(),
                    ty: record.require("type")?.to_owned(),
                };
                self.ty(record, kind)?;
            }
            RecordKind::File => {
                let id = record.require("id")?.to_owned();
                let name = record.require("name")?.to_owned();
                self.tables.files.insert(id, name);
                self.stack.push(Container::File);
            }
            RecordKind::Unknown => {
                tracing::trace!(kind = %record.kind_name, line = record.line, "skipping record");
            }
        }
        Ok(())
    }

    fn calldef(&mut self, record: &Record) -> Result<usize, SchemaError> {
        let kind = match record.kind {
            RecordKind::Constructor => CalldefKind::Constructor,
            RecordKind::Destructor => CalldefKind::Destructor,
            RecordKind::Method => CalldefKind::MemberFunction,
            RecordKind::OperatorMethod => CalldefKind::MemberOperator,
            RecordKind::OperatorFunction => CalldefKind::FreeOperator,
            RecordKind::Converter => CalldefKind::CastingOperator,
            _ => CalldefKind::FreeFunction,
        };
        if kind != CalldefKind::CastingOperator {
            record.require("name")?;
        }
        record.require("context")?;
        let returns = match kind {
            CalldefKind::Constructor | CalldefKind::Destructor => None,
            _ => Some(record.require("returns")?.to_owned()),
        };
        let throws = record
            .attr("throw")
            .map(|list| list.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();

        let index = self.decl(
            record,
            RawDeclKind::Calldef {
                kind,
                returns,
                arguments: Vec::new(),
                has_ellipsis: false,
                throws,
            },
        )?;

        let decl = &mut self.tables.decls[index];
        match kind {
            CalldefKind::MemberOperator | CalldefKind::FreeOperator => {
                decl.name = format!("operator{}", decl.name);
            }
            CalldefKind::CastingOperator if decl.name.is_empty() => {
                decl.name = "operator".to_owned();
            }
            _ => {}
        }
        if record.has("throw") {
            decl.flags |= DeclFlags::THROWS;
        }
        Ok(index)
    }

    fn decl(&mut self, record: &Record, kind: RawDeclKind) -> Result<usize, SchemaError> {
        let id = record.require("id")?.to_owned();
        self.check_unique(record, &id)?;

        if let Some(text) = record.attr("access") {
            let access = Access::parse(text).ok_or_else(|| record.invalid("access", text))?;
            self.tables.access.insert(id.clone(), access);
        }
        if let Some(members) = record.attr("members") {
            self.explicit_members.insert(
                id.clone(),
                members.split_whitespace().map(str::to_owned).collect(),
            );
        }
        let context = record.attr("context").map(str::to_owned);
        if let Some(parent) = &context {
            self.context_members
                .entry(parent.clone())
                .or_default()
                .push(id.clone());
        }

        let index = self.tables.decls.len();
        self.tables.decl_index.insert(id.clone(), index);
        self.tables.decls.push(RawDecl {
            id,
            name: record.attr("name").unwrap_or_default().to_owned(),
            context,
            file: record.attr("file").map(str::to_owned),
            line: record.number("line")?,
            flags: flags(record)?,
            kind,
        });
        Ok(index)
    }

    fn ty(&mut self, record: &Record, kind: RawTypeKind) -> Result<usize, SchemaError> {
        let id = record.require("id")?.to_owned();
        self.check_unique(record, &id)?;
        let index = self.tables.types.len();
        self.tables.type_index.insert(id.clone(), index);
        self.tables.types.push(RawType { id, kind });
        Ok(index)
    }

    fn check_unique(&self, record: &Record, id: &str) -> Result<(), SchemaError> {
        if self.tables.decl_index.contains_key(id) || self.tables.type_index.contains_key(id) {
            return Err(SchemaError::DuplicateId {
                line: record.line,
                id: id.to_owned(),
            });
        }
        Ok(())
    }

    /// Merge an attribute-only record into the open container.
    fn attach(&mut self, record: &Record) -> Result<(), SchemaError> {
        let Some(container) = self.stack.last().copied() else {
            return Err(SchemaError::OrphanRecord {
                line: record.line,
                kind: record.kind_name.clone(),
            });
        };

        match (record.kind, container) {
            (RecordKind::Argument, Container::Decl(index)) => {
                let argument = RawArgument {
                    name: record.attr("name").unwrap_or_default().to_owned(),
                    ty: record.require("type")?.to_owned(),
                    default: record.attr("default").map(str::to_owned),
                };
                if let RawDeclKind::Calldef { arguments, .. } = &mut self.tables.decls[index].kind
                {
                    arguments.push(argument);
                    return Ok(());
                }
            }
            (RecordKind::Argument, Container::Type(index)) => {
                let ty = record.require("type")?.to_owned();
                match &mut self.tables.types[index].kind {
                    RawTypeKind::Function { arguments, .. }
                    | RawTypeKind::Method { arguments, .. } => {
                        arguments.push(ty);
                        return Ok(());
                    }
                    _ => {}
                }
            }
            (RecordKind::Ellipsis, Container::Decl(index)) => {
                if let RawDeclKind::Calldef { has_ellipsis, .. } =
                    &mut self.tables.decls[index].kind
                {
                    *has_ellipsis = true;
                    return Ok(());
                }
            }
            (RecordKind::Ellipsis, Container::Type(index)) => {
                if let RawTypeKind::Function { has_ellipsis, .. } =
                    &mut self.tables.types[index].kind
                {
                    *has_ellipsis = true;
                    return Ok(());
                }
            }
            (RecordKind::EnumValue, Container::Decl(index)) => {
                let name = record.require("name")?.to_owned();
                let init = record.require("init")?;
                let value = parse_enum_value(init).ok_or_else(|| record.invalid("init", init))?;
                if let RawDeclKind::Enumeration { values } = &mut self.tables.decls[index].kind {
                    values.push(EnumValue { name, value });
                    return Ok(());
                }
            }
            _ => {}
        }

        Err(SchemaError::MisplacedRecord {
            line: record.line,
            kind: record.kind_name.clone(),
            container: self.describe(container).to_owned(),
        })
    }

    fn describe(&self, container: Container) -> &'static str {
        match container {
            Container::Decl(index) => self.tables.decls[index].kind.describe(),
            Container::Type(_) => "type",
            Container::File => "file",
        }
    }

    fn finish(mut self) -> RawTables {
        let mut members = self.context_members;
        for (scope, explicit) in self.explicit_members {
            members.insert(scope, explicit);
        }
        self.tables.members = members;
        self.tables
    }
}

fn flags(record: &Record) -> Result<DeclFlags, SchemaError> {
    const NAMES: [(&str, DeclFlags); 9] = [
        ("virtual", DeclFlags::VIRTUAL),
        ("pure_virtual", DeclFlags::PURE_VIRTUAL),
        ("static", DeclFlags::STATIC),
        ("const", DeclFlags::CONST),
        ("explicit", DeclFlags::EXPLICIT),
        ("artificial", DeclFlags::ARTIFICIAL),
        ("inline", DeclFlags::INLINE),
        ("extern", DeclFlags::EXTERN),
        ("mutable", DeclFlags::MUTABLE),
    ];
    let mut flags = DeclFlags::empty();
    for (name, flag) in NAMES {
        if record.flag(name)? {
            flags |= flag;
        }
    }
    if flags.contains(DeclFlags::PURE_VIRTUAL) {
        flags |= DeclFlags::VIRTUAL;
    }
    Ok(flags)
}

/// Parse `bases="_3 private:_4 virtual:public:_5"`.
fn parse_bases(record: &Record, kind: ClassKind) -> Result<Vec<RawBase>, SchemaError> {
    let Some(list) = record.attr("bases") else {
        return Ok(Vec::new());
    };
    list.split_whitespace()
        .map(|entry| {
            let mut rest = entry;
            let mut is_virtual = false;
            let mut access = kind.default_access();
            while let Some((prefix, tail)) = rest.split_once(':') {
                if prefix == "virtual" {
                    is_virtual = true;
                } else {
                    access = Access::parse(prefix).ok_or_else(|| record.invalid("bases", entry))?;
                }
                rest = tail;
            }
            if rest.is_empty() {
                return Err(record.invalid("bases", entry));
            }
            Ok(RawBase {
                id: rest.to_owned(),
                access,
                is_virtual,
            })
        })
        .collect()
}

/// `max` is the last valid index; `-1` marks a zero-length array and an
/// empty value an array of unknown extent.
fn array_size(record: &Record) -> Result<Option<u64>, SchemaError> {
    match record.attr("max").map(str::trim) {
        None | Some("") => Ok(None),
        Some("-1") => Ok(Some(0)),
        Some(text) => {
            let max = text
                .strip_suffix(['u', 'U'])
                .unwrap_or(text)
                .parse::<u64>()
                .map_err(|_| record.invalid("max", text))?;
            Ok(max.checked_add(1))
        }
    }
}

/// Enumerator values are decimal, possibly negative, or hexadecimal, and
/// span the range of any 64-bit underlying type.
fn parse_enum_value(text: &str) -> Option<i128> {
    let text = text.trim();
    let value = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => text.parse().ok()?,
    };
    (i128::from(i64::MIN)..=i128::from(u64::MAX))
        .contains(&value)
        .then_some(value)
}
