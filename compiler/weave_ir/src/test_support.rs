//! Programmatic graph construction for unit tests.

use rustc_hash::FxHashMap;

use crate::{
    Access, Argument, Calldef, CalldefKind, Class, ClassKind, DeclFlags, DeclId, DeclKind,
    Declaration, EnumValue, Enumeration, DeclarationGraph, HierarchyInfo, Location, Namespace,
    Type, TypeId, Variable,
};

pub(crate) struct GraphBuilder {
    decls: Vec<Declaration>,
    types: Vec<Type>,
    declarated: FxHashMap<DeclId, TypeId>,
}

impl GraphBuilder {
    pub(crate) fn new() -> Self {
        let global = Declaration {
            name: "::".into(),
            dump_id: "_1".into(),
            parent: None,
            location: None,
            access: Access::Public,
            flags: DeclFlags::empty(),
            kind: DeclKind::Namespace(Namespace::default()),
        };
        GraphBuilder {
            decls: vec![global],
            types: Vec::new(),
            declarated: FxHashMap::default(),
        }
    }

    pub(crate) fn global(&self) -> DeclId {
        DeclId::new(0)
    }

    pub(crate) fn decl(&mut self, parent: DeclId, name: &str, kind: DeclKind) -> DeclId {
        let id = DeclId::from_index(self.decls.len());
        self.decls.push(Declaration {
            name: name.into(),
            dump_id: format!("_{}", id.raw() + 1),
            parent: Some(parent),
            location: Some(Location {
                file: "test.hpp".into(),
                line: id.raw() + 1,
            }),
            access: Access::Public,
            flags: DeclFlags::empty(),
            kind,
        });
        match &mut self.decls[parent.index()].kind {
            DeclKind::Namespace(ns) => ns.members.push(id),
            DeclKind::Class(class) => class.members.push(id),
            _ => {}
        }
        id
    }

    pub(crate) fn decl_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    pub(crate) fn namespace(&mut self, parent: DeclId, name: &str) -> DeclId {
        self.decl(parent, name, DeclKind::Namespace(Namespace::default()))
    }

    pub(crate) fn class(&mut self, parent: DeclId, name: &str) -> DeclId {
        self.decl(parent, name, DeclKind::Class(Class::new(ClassKind::Class)))
    }

    pub(crate) fn add_base(&mut self, derived: DeclId, base: DeclId) {
        if let DeclKind::Class(class) = &mut self.decls[derived.index()].kind {
            class.bases.push(HierarchyInfo {
                related: base,
                access: Access::Public,
                is_virtual: false,
            });
        }
    }

    pub(crate) fn enumeration(&mut self, parent: DeclId, name: &str, values: &[&str]) -> DeclId {
        let values = values
            .iter()
            .zip(0..)
            .map(|(name, value)| EnumValue {
                name: (*name).into(),
                value,
            })
            .collect();
        self.decl(parent, name, DeclKind::Enumeration(Enumeration { values }))
    }

    pub(crate) fn typedef(&mut self, parent: DeclId, name: &str, ty: TypeId) -> DeclId {
        self.decl(parent, name, DeclKind::Typedef { ty })
    }

    pub(crate) fn variable(&mut self, parent: DeclId, name: &str, ty: TypeId) -> DeclId {
        self.decl(
            parent,
            name,
            DeclKind::Variable(Variable {
                ty,
                bits: None,
                value: None,
            }),
        )
    }

    pub(crate) fn calldef(
        &mut self,
        parent: DeclId,
        name: &str,
        kind: CalldefKind,
        return_type: Option<TypeId>,
        arguments: &[(TypeId, Option<&str>)],
    ) -> DeclId {
        let arguments = arguments
            .iter()
            .enumerate()
            .map(|(index, (ty, default))| Argument {
                name: format!("a{index}"),
                ty: *ty,
                default_value: default.map(str::to_owned),
            })
            .collect();
        self.decl(
            parent,
            name,
            DeclKind::Calldef(Calldef {
                kind,
                return_type,
                arguments,
                has_ellipsis: false,
                exceptions: Vec::new(),
            }),
        )
    }

    pub(crate) fn add_type(&mut self, ty: Type) -> TypeId {
        let id = TypeId::from_index(self.types.len());
        self.types.push(ty);
        id
    }

    pub(crate) fn fundamental(&mut self, name: &str) -> TypeId {
        self.add_type(Type::fundamental(name))
    }

    pub(crate) fn pointer(&mut self, base: TypeId) -> TypeId {
        self.add_type(Type::Pointer(base))
    }

    pub(crate) fn reference(&mut self, base: TypeId) -> TypeId {
        self.add_type(Type::Reference(base))
    }

    pub(crate) fn constant(&mut self, base: TypeId) -> TypeId {
        self.add_type(Type::Cv {
            base,
            is_const: true,
            is_volatile: false,
            is_restrict: false,
        })
    }

    pub(crate) fn declarated(&mut self, decl: DeclId) -> TypeId {
        if let Some(ty) = self.declarated.get(&decl) {
            return *ty;
        }
        let ty = self.add_type(Type::Declarated(decl));
        self.declarated.insert(decl, ty);
        ty
    }

    pub(crate) fn build(self) -> DeclarationGraph {
        DeclarationGraph::from_parts(self.decls, self.types)
    }
}
