#![allow(clippy::unwrap_used, reason = "tests can panic")]

use pretty_assertions::assert_eq;
use weave_ir::traits;

use super::*;
use crate::{parse_records, scanner};

fn link_text(text: &str) -> Result<DeclarationGraph, LinkError> {
    let records = parse_records(text).unwrap();
    let tables = scanner::scan(&records).unwrap();
    link(&tables)
}

const HIERARCHY: &str = r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "File", "id": "f1", "name": "shapes.hpp"}
{"kind": "Class", "id": "_3", "name": "Base", "context": "_1", "file": "f1", "line": 3}
{"kind": "Class", "id": "_4", "name": "Derived", "context": "_1", "bases": "_3", "file": "f1", "line": 9}
{"kind": "Constructor", "id": "_5", "name": "Derived<int>", "context": "_4", "access": "public"}
{"kind": "Argument", "name": "other", "type": "_8"}
{"kind": "Method", "id": "_6", "name": "area", "returns": "_7", "context": "_4"}
{"kind": "FundamentalType", "id": "_7", "name": "double"}
{"kind": "ReferenceType", "id": "_8", "type": "_9"}
{"kind": "CvQualifiedType", "id": "_9", "type": "_4", "const": "1"}
{"kind": "Typedef", "id": "_10", "name": "derived_t", "type": "_4", "context": "_1"}
"#;

// ── Resolution ──────────────────────────────────────────────────

#[test]
fn test_link_hierarchy() {
    let graph = link_text(HIERARCHY).unwrap();
    let base = graph.lookup("_3").unwrap();
    let derived = graph.lookup("_4").unwrap();

    let derived_class = graph.decl(derived).as_class().unwrap();
    assert_eq!(derived_class.bases[0].related, base);
    assert_eq!(derived_class.bases[0].access, Access::Private);
    let base_class = graph.decl(base).as_class().unwrap();
    assert_eq!(base_class.derived[0].related, derived);

    let location = graph.decl(derived).location.clone().unwrap();
    assert_eq!(location.file, "shapes.hpp");
    assert_eq!(location.line, 9);
}

#[test]
fn test_members_follow_context_order() {
    let graph = link_text(HIERARCHY).unwrap();
    let derived = graph.lookup("_4").unwrap();
    let names: Vec<_> = graph
        .members(derived)
        .iter()
        .map(|member| graph.decl(*member).name.as_str())
        .collect();
    assert_eq!(names, vec!["Derived", "area"]);
}

#[test]
fn test_default_access_by_class_key() {
    let graph = link_text(HIERARCHY).unwrap();
    let ctor = graph.lookup("_5").unwrap();
    let method = graph.lookup("_6").unwrap();
    assert_eq!(graph.decl(ctor).access, Access::Public);
    assert_eq!(graph.decl(method).access, Access::Private);
}

#[test]
fn test_constructor_renamed_to_class() {
    let graph = link_text(HIERARCHY).unwrap();
    let ctor = graph.lookup("_5").unwrap();
    assert_eq!(graph.decl(ctor).name, "Derived");
}

#[test]
fn test_declarated_types_resolve_to_declarations() {
    let graph = link_text(HIERARCHY).unwrap();
    let derived = graph.lookup("_4").unwrap();
    let ctor = graph.lookup("_5").unwrap();
    let arg = graph.decl(ctor).as_calldef().unwrap().arguments[0].ty;

    assert!(traits::is_reference(&graph, arg));
    assert_eq!(
        traits::class_declaration(&graph, traits::remove_reference(&graph, arg)),
        Some(derived)
    );
    assert_eq!(graph.decl_string(arg), "::Derived const &");
}

#[test]
fn test_class_aliases() {
    let graph = link_text(HIERARCHY).unwrap();
    let derived = graph.lookup("_4").unwrap();
    let alias = graph.lookup("_10").unwrap();
    assert_eq!(graph.decl(derived).as_class().unwrap().aliases, vec![alias]);
}

#[test]
fn test_incomplete_class_is_declaration() {
    let graph = link_text(
        r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "Class", "id": "_2", "name": "Opaque", "context": "_1", "incomplete": "1"}
"#,
    )
    .unwrap();
    assert_eq!(graph.decl(graph.lookup("_2").unwrap()).kind, DeclKind::ClassDeclaration);
}

// ── Failures ────────────────────────────────────────────────────

#[test]
fn test_unresolved_declaration_reference() {
    let result = link_text(
        r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "Variable", "id": "_2", "name": "x", "type": "_99", "context": "_1"}
"#,
    );
    assert_eq!(
        result.map(|_| ()),
        Err(LinkError::UnresolvedId {
            declaration: "_2".into(),
            field: "type",
            id: "_99".into(),
        })
    );
}

#[test]
fn test_unresolved_type_reference() {
    let result = link_text(r#"{"kind": "PointerType", "id": "_3", "type": "_42"}"#);
    assert_eq!(
        result.map(|_| ()),
        Err(LinkError::UnresolvedType {
            ty: "_3".into(),
            field: "type",
            id: "_42".into(),
        })
    );
}

#[test]
fn test_namespace_is_not_a_type() {
    let result = link_text(
        r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "PointerType", "id": "_3", "type": "_1"}
"#,
    );
    assert!(matches!(result, Err(LinkError::NotAType { found: "namespace", .. })));
}
