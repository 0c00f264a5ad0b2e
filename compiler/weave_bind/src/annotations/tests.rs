#![allow(clippy::unwrap_used, reason = "tests can panic")]

use pretty_assertions::assert_eq;

use super::*;
use crate::call_policies::ReturnValueKind;
use crate::test_helpers::{decl, graph};

const ALIASES: &str = r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "Namespace", "id": "_2", "name": "std", "context": "_1"}
{"kind": "FundamentalType", "id": "_3", "name": "int"}
{"kind": "Class", "id": "_4", "name": "vector<int, std::allocator<int> >", "context": "_2"}
{"kind": "Typedef", "id": "_5", "name": "IntVector", "type": "_4", "context": "_1"}
{"kind": "Class", "id": "_6", "name": "map<int, int>", "context": "_2"}
{"kind": "Typedef", "id": "_7", "name": "first_map", "type": "_6", "context": "_1"}
{"kind": "Typedef", "id": "_8", "name": "second_map", "type": "_6", "context": "_1"}
{"kind": "Class", "id": "_9", "name": "Plain", "context": "_1"}
"#;

#[test]
fn test_defaults() {
    let annotations = Annotations::new();
    let entry = annotations.get(DeclId::new(3));
    assert!(!entry.ignore);
    assert!(entry.overridable);
    assert_eq!(entry.call_policies, None);
    assert!(annotations.is_empty());
}

#[test]
fn test_annotate_creates_entry() {
    let mut annotations = Annotations::new();
    let id = DeclId::new(7);
    annotations.annotate(id).ignore = true;
    annotations.annotate(id).transformations.push("output(0)".into());
    assert!(annotations.is_ignored(id));
    assert!(annotations.has_transformations(id));
    assert!(!annotations.is_opaque(id));
    assert_eq!(annotations.len(), 1);
}

#[test]
fn test_class_alias() {
    let graph = graph(ALIASES);
    let mut annotations = Annotations::new();
    let vector = decl(&graph, "_4");
    let map = decl(&graph, "_6");
    let plain = decl(&graph, "_9");

    // A single typedef names the class.
    assert_eq!(annotations.class_alias(&graph, vector), "IntVector");
    // Two typedefs are ambiguous; the name is mangled instead.
    assert_eq!(
        annotations.class_alias(&graph, map),
        "map_less_int_comma__int_greater_"
    );
    assert_eq!(annotations.class_alias(&graph, plain), "Plain");

    annotations.annotate(plain).alias = Some("Renamed".into());
    assert_eq!(annotations.class_alias(&graph, plain), "Renamed");
}

#[test]
fn test_valid_identifier() {
    assert_eq!(valid_identifier("vector< int >"), "vector_less__int__greater_");
    assert_eq!(valid_identifier("ns::Item*"), "ns_scope_Item_ptr_");
    assert_eq!(valid_identifier("2d"), "_2d");
}

#[test]
fn test_json_annotations() {
    let entry: DeclAnnotations = serde_json::from_str(
        r#"{"alias": "Py", "call_policies": {"kind": "return_value", "value": "reference_existing"}}"#,
    )
    .unwrap();
    assert_eq!(entry.alias.as_deref(), Some("Py"));
    assert_eq!(
        entry.call_policies,
        Some(CallPolicy::return_value(ReturnValueKind::ReferenceExisting))
    );
    assert!(entry.overridable);

    let unknown = serde_json::from_str::<DeclAnnotations>(r#"{"exclude": true}"#);
    assert!(unknown.is_err());
}
