//! The linked declaration graph.

use rustc_hash::FxHashMap;

use crate::{DeclId, DeclKind, Declaration, Type, TypeId};

/// Arena owning every declaration and type of one translation unit.
///
/// Built once by the linker through [`DeclarationGraph::from_parts`]. After
/// that only the patcher mutates declarations (default values and operator
/// names); the set of declarations and types never changes.
#[derive(Clone, Debug, Default)]
pub struct DeclarationGraph {
    decls: Vec<Declaration>,
    types: Vec<Type>,
    /// Interned declarated type per declaration.
    declarated: FxHashMap<DeclId, TypeId>,
    by_dump_id: FxHashMap<String, DeclId>,
    roots: Vec<DeclId>,
    patched: bool,
}

impl DeclarationGraph {
    /// Assemble a graph from linked arenas.
    ///
    /// `decls[i]` becomes `DeclId(i)` and `types[i]` becomes `TypeId(i)`.
    /// Every id stored in either arena must be in range; the linker
    /// guarantees this.
    pub fn from_parts(decls: Vec<Declaration>, types: Vec<Type>) -> Self {
        let mut declarated = FxHashMap::default();
        for (index, ty) in types.iter().enumerate() {
            if let Type::Declarated(decl) = ty {
                declarated.entry(*decl).or_insert(TypeId::from_index(index));
            }
        }

        let mut by_dump_id = FxHashMap::default();
        let mut roots = Vec::new();
        for (index, decl) in decls.iter().enumerate() {
            let id = DeclId::from_index(index);
            if !decl.dump_id.is_empty() {
                by_dump_id.insert(decl.dump_id.clone(), id);
            }
            if decl.parent.is_none() {
                roots.push(id);
            }
        }

        DeclarationGraph {
            decls,
            types,
            declarated,
            by_dump_id,
            roots,
            patched: false,
        }
    }

    #[inline]
    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn decl_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    #[inline]
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// All declarations in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> + '_ {
        self.decls
            .iter()
            .enumerate()
            .map(|(index, decl)| (DeclId::from_index(index), decl))
    }

    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> {
        (0..self.decls.len()).map(DeclId::from_index)
    }

    /// Declarations without an owning scope (normally just `::`).
    pub fn roots(&self) -> &[DeclId] {
        &self.roots
    }

    /// The declarated type naming `decl`, if any type refers to it.
    pub fn declarated_type(&self, decl: DeclId) -> Option<TypeId> {
        self.declarated.get(&decl).copied()
    }

    /// Find a declaration by the id the dump assigned to it.
    pub fn lookup(&self, dump_id: &str) -> Option<DeclId> {
        self.by_dump_id.get(dump_id).copied()
    }

    /// Direct members of a namespace or class. Empty for other kinds.
    pub fn members(&self, id: DeclId) -> &[DeclId] {
        match &self.decl(id).kind {
            DeclKind::Namespace(ns) => &ns.members,
            DeclKind::Class(class) => &class.members,
            _ => &[],
        }
    }

    pub fn parent(&self, id: DeclId) -> Option<DeclId> {
        self.decl(id).parent
    }

    /// The class directly owning `id`, if its parent is a class.
    pub fn parent_class(&self, id: DeclId) -> Option<DeclId> {
        self.parent(id).filter(|parent| self.decl(*parent).is_class())
    }

    /// Names from the outermost named scope down to `id`.
    ///
    /// The global namespace and unnamed scopes contribute nothing.
    pub fn declaration_path(&self, id: DeclId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(decl_id) = current {
            let decl = self.decl(decl_id);
            if !decl.name.is_empty() && decl.name != "::" {
                path.push(decl.name.as_str());
            }
            current = decl.parent;
        }
        path.reverse();
        path
    }

    /// Fully qualified name (`::ns::Class::member`). The global namespace
    /// is `::`.
    pub fn full_name(&self, id: DeclId) -> String {
        let path = self.declaration_path(id);
        if path.is_empty() {
            return "::".to_owned();
        }
        let mut name = String::new();
        for part in path {
            name.push_str("::");
            name.push_str(part);
        }
        name
    }

    /// `id` and everything nested inside it, in preorder.
    pub fn flatten(&self, id: DeclId) -> Vec<DeclId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            for member in self.members(next).iter().rev() {
                stack.push(*member);
            }
        }
        out
    }

    /// Every declaration reachable from the roots, in preorder.
    pub fn flatten_all(&self) -> Vec<DeclId> {
        self.roots
            .iter()
            .flat_map(|root| self.flatten(*root))
            .collect()
    }

    /// Find a declaration by its fully qualified name.
    pub fn find_by_full_name(&self, full_name: &str) -> Option<DeclId> {
        self.decl_ids().find(|id| self.full_name(*id) == full_name)
    }

    /// Enumerations declared directly in `scope`.
    pub fn enumerations_in(&self, scope: DeclId) -> impl Iterator<Item = DeclId> + '_ {
        self.members(scope)
            .iter()
            .copied()
            .filter(|member| matches!(self.decl(*member).kind, DeclKind::Enumeration(_)))
    }

    pub fn is_patched(&self) -> bool {
        self.patched
    }

    pub fn mark_patched(&mut self) {
        self.patched = true;
    }
}
