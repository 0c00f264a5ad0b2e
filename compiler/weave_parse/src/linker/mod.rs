//! Linker: raw tables to a [`DeclarationGraph`].
//!
//! Pass one fixes the arena layout: raw declaration `i` becomes `DeclId(i)`,
//! raw type `i` becomes `TypeId(i)`, and one declarated type per class,
//! enumeration and typedef is appended after the raw types. Because every
//! id is known up front, pass two converts each record independently by
//! looking its references up in those tables.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use weave_ir::{
    Access, Argument, Calldef, CalldefKind, Class, DeclId, DeclKind, Declaration,
    DeclarationGraph, Enumeration, HierarchyInfo, Location, Namespace, Type, TypeId, Variable,
};

use crate::scanner::{RawDecl, RawDeclKind, RawTables, RawTypeKind};
use crate::LinkError;

/// Resolve every reference in `tables` and build the graph.
#[tracing::instrument(level = "debug", skip_all)]
pub fn link(tables: &RawTables) -> Result<DeclarationGraph, LinkError> {
    let linker = Linker::new(tables);
    let types = linker.link_types()?;
    let mut decls = tables
        .decls
        .iter()
        .map(|raw| linker.link_decl(raw))
        .collect::<Result<Vec<_>, _>>()?;

    attach_derived(tables, &mut decls)?;
    rename_constructors(&mut decls);
    collect_class_aliases(&mut decls, &types);

    tracing::debug!(decls = decls.len(), types = types.len(), "linked graph");
    Ok(DeclarationGraph::from_parts(decls, types))
}

/// Who holds a reference, for error reporting.
#[derive(Copy, Clone)]
enum Referrer<'a> {
    Decl(&'a str),
    Type(&'a str),
}

impl Referrer<'_> {
    fn unresolved(self, field: &'static str, id: &str) -> LinkError {
        match self {
            Referrer::Decl(declaration) => LinkError::UnresolvedId {
                declaration: declaration.to_owned(),
                field,
                id: id.to_owned(),
            },
            Referrer::Type(ty) => LinkError::UnresolvedType {
                ty: ty.to_owned(),
                field,
                id: id.to_owned(),
            },
        }
    }

    fn id(self) -> String {
        match self {
            Referrer::Decl(id) | Referrer::Type(id) => id.to_owned(),
        }
    }
}

struct Linker<'a> {
    tables: &'a RawTables,
    /// Declarated type for each type-like raw declaration index.
    declarated: FxHashMap<usize, TypeId>,
}

impl<'a> Linker<'a> {
    fn new(tables: &'a RawTables) -> Self {
        let mut declarated = FxHashMap::default();
        let mut next = tables.types.len();
        for (index, decl) in tables.decls.iter().enumerate() {
            if decl.kind.is_type_like() {
                declarated.insert(index, TypeId::from_index(next));
                next += 1;
            }
        }
        Linker { tables, declarated }
    }

    fn resolve_type(
        &self,
        referrer: Referrer<'_>,
        field: &'static str,
        id: &str,
    ) -> Result<TypeId, LinkError> {
        if let Some(index) = self.tables.type_index.get(id) {
            return Ok(TypeId::from_index(*index));
        }
        let Some(index) = self.tables.decl_index.get(id) else {
            return Err(referrer.unresolved(field, id));
        };
        self.declarated.get(index).copied().ok_or_else(|| LinkError::NotAType {
            referrer: referrer.id(),
            field,
            id: id.to_owned(),
            found: self.tables.decls[*index].kind.describe(),
        })
    }

    fn resolve_decl(
        &self,
        owner: &str,
        field: &'static str,
        id: &str,
    ) -> Result<DeclId, LinkError> {
        self.tables
            .decl_index
            .get(id)
            .map(|index| DeclId::from_index(*index))
            .ok_or_else(|| Referrer::Decl(owner).unresolved(field, id))
    }

    fn link_types(&self) -> Result<Vec<Type>, LinkError> {
        let mut types = Vec::with_capacity(self.tables.types.len() + self.declarated.len());
        for raw in &self.tables.types {
            let from = Referrer::Type(&raw.id);
            let ty = match &raw.kind {
                RawTypeKind::Fundamental { name } => Type::fundamental(name.clone()),
                RawTypeKind::Pointer { ty } => Type::Pointer(self.resolve_type(from, "type", ty)?),
                RawTypeKind::Reference { ty } => {
                    Type::Reference(self.resolve_type(from, "type", ty)?)
                }
                RawTypeKind::Cv {
                    ty,
                    is_const,
                    is_volatile,
                    is_restrict,
                } => Type::Cv {
                    base: self.resolve_type(from, "type", ty)?,
                    is_const: *is_const,
                    is_volatile: *is_volatile,
                    is_restrict: *is_restrict,
                },
                RawTypeKind::Array { ty, size } => Type::Array {
                    base: self.resolve_type(from, "type", ty)?,
                    size: *size,
                },
                RawTypeKind::Function {
                    returns,
                    arguments,
                    has_ellipsis,
                } => Type::FreeFunction {
                    return_type: self.resolve_type(from, "returns", returns)?,
                    arguments: self.resolve_types(from, arguments)?,
                    has_ellipsis: *has_ellipsis,
                },
                RawTypeKind::Method {
                    class,
                    returns,
                    arguments,
                    is_const,
                } => Type::MemberFunction {
                    class: self.resolve_type(from, "basetype", class)?,
                    return_type: self.resolve_type(from, "returns", returns)?,
                    arguments: self.resolve_types(from, arguments)?,
                    is_const: *is_const,
                },
                RawTypeKind::Offset { class, ty } => Type::MemberVariable {
                    class: self.resolve_type(from, "basetype", class)?,
                    variable: self.resolve_type(from, "type", ty)?,
                },
            };
            types.push(ty);
        }

        let mut declarated: Vec<_> = self.declarated.iter().collect();
        declarated.sort_by_key(|(_, ty)| **ty);
        for (index, _) in declarated {
            types.push(Type::Declarated(DeclId::from_index(*index)));
        }
        Ok(types)
    }

    fn resolve_types(&self, from: Referrer<'_>, ids: &[String]) -> Result<Vec<TypeId>, LinkError> {
        ids.iter()
            .map(|id| self.resolve_type(from, "arguments", id))
            .collect()
    }

    fn link_decl(&self, raw: &RawDecl) -> Result<Declaration, LinkError> {
        let from = Referrer::Decl(&raw.id);
        let parent = raw
            .context
            .as_deref()
            .map(|context| self.resolve_decl(&raw.id, "context", context))
            .transpose()?;
        let location = match &raw.file {
            Some(file_id) => {
                let file = self
                    .tables
                    .files
                    .get(file_id)
                    .ok_or_else(|| from.unresolved("file", file_id))?;
                Some(Location {
                    file: file.clone(),
                    line: raw.line.unwrap_or(0),
                })
            }
            None => None,
        };

        let kind = match &raw.kind {
            RawDeclKind::Namespace => DeclKind::Namespace(Namespace {
                members: self.members(&raw.id)?,
            }),
            RawDeclKind::Class { incomplete: true, .. } => DeclKind::ClassDeclaration,
            RawDeclKind::Class {
                kind,
                is_abstract,
                size,
                align,
                bases,
                ..
            } => {
                let mut class = Class::new(*kind);
                class.is_abstract = *is_abstract;
                class.size = *size;
                class.align = *align;
                class.bases = bases
                    .iter()
                    .map(|base| {
                        Ok(HierarchyInfo {
                            related: self.resolve_decl(&raw.id, "bases", &base.id)?,
                            access: base.access,
                            is_virtual: base.is_virtual,
                        })
                    })
                    .collect::<Result<SmallVec<_>, LinkError>>()?;
                class.members = self.members(&raw.id)?;
                DeclKind::Class(class)
            }
            RawDeclKind::Enumeration { values } => DeclKind::Enumeration(Enumeration {
                values: values.clone(),
            }),
            RawDeclKind::Typedef { ty } => DeclKind::Typedef {
                ty: self.resolve_type(from, "type", ty)?,
            },
            RawDeclKind::Variable { ty, bits, value } => DeclKind::Variable(Variable {
                ty: self.resolve_type(from, "type", ty)?,
                bits: *bits,
                value: value.clone(),
            }),
            RawDeclKind::Calldef {
                kind,
                returns,
                arguments,
                has_ellipsis,
                throws,
            } => DeclKind::Calldef(Calldef {
                kind: *kind,
                return_type: returns
                    .as_deref()
                    .map(|id| self.resolve_type(from, "returns", id))
                    .transpose()?,
                arguments: arguments
                    .iter()
                    .map(|arg| {
                        Ok(Argument {
                            name: arg.name.clone(),
                            ty: self.resolve_type(from, "arguments", &arg.ty)?,
                            default_value: arg.default.clone(),
                        })
                    })
                    .collect::<Result<_, LinkError>>()?,
                has_ellipsis: *has_ellipsis,
                exceptions: throws
                    .iter()
                    .map(|id| self.resolve_type(from, "throw", id))
                    .collect::<Result<_, _>>()?,
            }),
        };

        Ok(Declaration {
            name: raw.name.clone(),
            dump_id: raw.id.clone(),
            parent,
            location,
            access: self.access(raw),
            flags: raw.flags,
            kind,
        })
    }

    fn members(&self, scope: &str) -> Result<Vec<DeclId>, LinkError> {
        self.tables
            .members
            .get(scope)
            .map(|ids| {
                ids.iter()
                    .map(|id| self.resolve_decl(scope, "members", id))
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Explicit access, else the default of the owning class key.
    fn access(&self, raw: &RawDecl) -> Access {
        if let Some(access) = self.tables.access.get(&raw.id) {
            return *access;
        }
        match raw
            .context
            .as_deref()
            .and_then(|context| self.tables.decl(context))
            .map(|parent| &parent.kind)
        {
            Some(RawDeclKind::Class { kind, .. }) => kind.default_access(),
            _ => Access::Public,
        }
    }
}

/// Append the reciprocal derived edge of every base edge.
fn attach_derived(tables: &RawTables, decls: &mut [Declaration]) -> Result<(), LinkError> {
    let mut edges = Vec::new();
    for (index, decl) in decls.iter().enumerate() {
        let Some(class) = decl.as_class() else {
            continue;
        };
        for base in &class.bases {
            match &decls[base.related.index()].kind {
                DeclKind::Class(_) => edges.push((
                    base.related,
                    HierarchyInfo {
                        related: DeclId::from_index(index),
                        access: base.access,
                        is_virtual: base.is_virtual,
                    },
                )),
                DeclKind::ClassDeclaration => {}
                _ => {
                    return Err(LinkError::NotAClass {
                        declaration: tables.decls[index].id.clone(),
                        id: decls[base.related.index()].dump_id.clone(),
                    })
                }
            }
        }
    }
    for (base, edge) in edges {
        if let DeclKind::Class(class) = &mut decls[base.index()].kind {
            class.derived.push(edge);
        }
    }
    Ok(())
}

/// Constructors are named after their class; the dump sometimes spells them
/// with template arguments or a typedef name.
fn rename_constructors(decls: &mut [Declaration]) {
    for index in 0..decls.len() {
        if decls[index].calldef_kind() != Some(CalldefKind::Constructor) {
            continue;
        }
        let Some(parent) = decls[index].parent else {
            continue;
        };
        let class_name = &decls[parent.index()].name;
        if decls[parent.index()].is_class() && decls[index].name != *class_name {
            let class_name = class_name.clone();
            tracing::trace!(from = %decls[index].name, to = %class_name, "renaming constructor");
            decls[index].name = class_name;
        }
    }
}

/// Record typedefs that name a class directly.
fn collect_class_aliases(decls: &mut [Declaration], types: &[Type]) {
    let mut aliases = Vec::new();
    for (index, decl) in decls.iter().enumerate() {
        if let DeclKind::Typedef { ty } = decl.kind {
            if let Type::Declarated(target) = types[ty.index()] {
                if decls[target.index()].is_class() {
                    aliases.push((target, DeclId::from_index(index)));
                }
            }
        }
    }
    for (class, alias) in aliases {
        if let DeclKind::Class(info) = &mut decls[class.index()].kind {
            info.aliases.push(alias);
        }
    }
}

#[cfg(test)]
mod tests;
