//! Standard container recognition.
//!
//! A class instantiated from one of the standard containers is not exported
//! as a class; the factory registers it as a container suite instead. The
//! element type comes from the container's own `value_type` (or
//! `mapped_type` for associative maps) typedef, the way the standard library
//! spells it.

use weave_ir::{templates, DeclId, DeclKind, DeclarationGraph, TypeId};

/// Container families with an indexing suite.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ContainerKind {
    Vector,
    List,
    Deque,
    Set,
    MultiSet,
    Map,
    MultiMap,
    HashSet,
    HashMap,
}

impl ContainerKind {
    fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "vector" => ContainerKind::Vector,
            "list" => ContainerKind::List,
            "deque" => ContainerKind::Deque,
            "set" => ContainerKind::Set,
            "multiset" => ContainerKind::MultiSet,
            "map" => ContainerKind::Map,
            "multimap" => ContainerKind::MultiMap,
            "hash_set" | "unordered_set" => ContainerKind::HashSet,
            "hash_map" | "unordered_map" => ContainerKind::HashMap,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_mapping(self) -> bool {
        matches!(
            self,
            ContainerKind::Map | ContainerKind::MultiMap | ContainerKind::HashMap
        )
    }

    pub fn suite(self) -> &'static str {
        match self {
            ContainerKind::Vector => "vector_indexing_suite",
            ContainerKind::List => "list_indexing_suite",
            ContainerKind::Deque => "deque_indexing_suite",
            ContainerKind::Set | ContainerKind::MultiSet => "set_indexing_suite",
            ContainerKind::Map | ContainerKind::MultiMap => "map_indexing_suite",
            ContainerKind::HashSet => "hash_set_indexing_suite",
            ContainerKind::HashMap => "hash_map_indexing_suite",
        }
    }
}

/// The container family of a class declared in `std`, if any.
pub fn container_kind(graph: &DeclarationGraph, class: DeclId) -> Option<ContainerKind> {
    let decl = graph.decl(class);
    if !matches!(decl.kind, DeclKind::Class(_) | DeclKind::ClassDeclaration)
        || !templates::is_instantiation(&decl.name)
    {
        return None;
    }
    let full_name = templates::normalize(&graph.full_name(class));
    let rest = full_name
        .strip_prefix("std::")
        .map(|rest| rest.strip_prefix("__cxx11::").unwrap_or(rest))?;
    let rest = rest.strip_prefix("tr1::").unwrap_or(rest);
    ContainerKind::from_name(templates::name(rest))
}

/// The element type stored by a container class.
pub fn element_type(graph: &DeclarationGraph, class: DeclId, kind: ContainerKind) -> Option<TypeId> {
    let wanted = if kind.is_mapping() {
        "mapped_type"
    } else {
        "value_type"
    };
    graph.members(class).iter().find_map(|member| {
        let decl = graph.decl(*member);
        match decl.kind {
            DeclKind::Typedef { ty } if decl.name == wanted => Some(ty),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "tests can panic")]

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_helpers::graph;

    const VECTOR: &str = r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "Namespace", "id": "_2", "name": "std", "context": "_1"}
{"kind": "FundamentalType", "id": "_3", "name": "int"}
{"kind": "Class", "id": "_4", "name": "vector<int, std::allocator<int> >", "context": "_2"}
{"kind": "Typedef", "id": "_5", "name": "value_type", "type": "_3", "context": "_4", "access": "public"}
{"kind": "Class", "id": "_6", "name": "map<int, int>", "context": "_2"}
{"kind": "Class", "id": "_7", "name": "vector<int>", "context": "_1"}
"#;

    #[test]
    fn test_container_kind() {
        let graph = graph(VECTOR);
        let vector = graph.lookup("_4").unwrap();
        assert_eq!(container_kind(&graph, vector), Some(ContainerKind::Vector));
        assert_eq!(
            container_kind(&graph, graph.lookup("_6").unwrap()),
            Some(ContainerKind::Map)
        );
        // Outside `std` the name alone does not make a container.
        assert_eq!(container_kind(&graph, graph.lookup("_7").unwrap()), None);
    }

    #[test]
    fn test_element_type() {
        let graph = graph(VECTOR);
        let vector = graph.lookup("_4").unwrap();
        let element = element_type(&graph, vector, ContainerKind::Vector).unwrap();
        assert_eq!(graph.decl_string(element), "int");
        let map = graph.lookup("_6").unwrap();
        assert_eq!(element_type(&graph, map, ContainerKind::Map), None);
    }

    #[test]
    fn test_suite_names() {
        assert_eq!(ContainerKind::Vector.suite(), "vector_indexing_suite");
        assert!(ContainerKind::MultiMap.is_mapping());
        assert!(!ContainerKind::Set.is_mapping());
    }
}
