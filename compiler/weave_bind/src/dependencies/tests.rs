#![allow(clippy::unwrap_used, reason = "tests can panic")]

use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{decl, graph};

const USERS: &str = r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "Namespace", "id": "_2", "name": "std", "context": "_1"}
{"kind": "Namespace", "id": "_3", "name": "boost", "context": "_1"}
{"kind": "Namespace", "id": "_4", "name": "geo", "context": "_1"}
{"kind": "FundamentalType", "id": "_5", "name": "void"}
{"kind": "Class", "id": "_6", "name": "Hidden", "context": "_1"}
{"kind": "Class", "id": "_7", "name": "Derived", "context": "_1", "bases": "public:_6"}
{"kind": "Class", "id": "_8", "name": "Secret", "context": "_1"}
{"kind": "Class", "id": "_9", "name": "Private", "context": "_1", "bases": "private:_8"}
{"kind": "Class", "id": "_10", "name": "shared_ptr<Hidden>", "context": "_3"}
{"kind": "Class", "id": "_11", "name": "pair<int, int>", "context": "_2"}
{"kind": "Class", "id": "_12", "name": "string", "context": "_2"}
{"kind": "Function", "id": "_13", "name": "share", "returns": "_10", "context": "_1"}
{"kind": "Function", "id": "_14", "name": "span", "returns": "_11", "context": "_1"}
{"kind": "Argument", "name": "s", "type": "_12"}
{"kind": "Class", "id": "_15", "name": "Point", "context": "_1"}
{"kind": "Class", "id": "_16", "name": "Point", "context": "_4"}
"#;

fn exporting(graph: &DeclarationGraph, dump_ids: &[&str]) -> DependencyManager {
    let mut manager = DependencyManager::default();
    for id in dump_ids {
        manager.add_exported(decl(graph, id));
    }
    manager
}

// ── Direct dependencies ─────────────────────────────────────────

#[test]
fn test_base_class_dependency() {
    let graph = graph(USERS);
    let manager = DependencyManager::default();
    let annotations = Annotations::new();

    let deps = manager.dependencies(&graph, &annotations, decl(&graph, "_7"));
    assert_eq!(
        deps,
        vec![Dependency {
            dependent: decl(&graph, "_7"),
            depends_on: decl(&graph, "_6"),
            role: DependencyRole::BaseClass,
        }]
    );
    // Private bases are an implementation detail.
    assert!(manager
        .dependencies(&graph, &annotations, decl(&graph, "_9"))
        .is_empty());
}

#[test]
fn test_smart_pointer_is_seen_through() {
    let graph = graph(USERS);
    let manager = DependencyManager::default();
    let deps = manager.dependencies(&graph, &Annotations::new(), decl(&graph, "_13"));
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].depends_on, decl(&graph, "_6"));
    assert_eq!(deps[0].role, DependencyRole::ReturnType);
}

#[test]
fn test_type_index_is_built_on_demand() {
    let graph = graph(USERS);
    let manager = DependencyManager::default();
    let index = TypeIndex::new(&graph);

    // Plain bases never need a name lookup.
    manager.dependencies_with(&index, &Annotations::new(), decl(&graph, "_7"));
    assert!(!index.is_built());

    manager.dependencies_with(&index, &Annotations::new(), decl(&graph, "_13"));
    assert!(index.is_built());
    assert_eq!(index.lookup("Hidden"), Some(decl(&graph, "_6")));
    assert_eq!(index.lookup("geo::Point"), Some(decl(&graph, "_16")));
    assert_eq!(index.lookup("share"), None);
}

#[test]
fn test_standard_library_is_ignored_except_pair() {
    let graph = graph(USERS);
    let manager = DependencyManager::default();
    let deps = manager.dependencies(&graph, &Annotations::new(), decl(&graph, "_14"));
    let targets: Vec<DeclId> = deps.iter().map(|dep| dep.depends_on).collect();
    assert_eq!(targets, vec![decl(&graph, "_11")]);
}

#[test]
fn test_exported_keeps_first_registration() {
    let graph = graph(USERS);
    let manager = exporting(&graph, &["_7", "_13", "_7"]);
    assert_eq!(manager.exported(), &[decl(&graph, "_7"), decl(&graph, "_13")]);
    assert!(manager.is_exported(decl(&graph, "_13")));
    assert!(!manager.is_exported(decl(&graph, "_6")));
}

// ── Reporting ───────────────────────────────────────────────────

#[test]
fn test_unexposed_dependency_reported_once() {
    let graph = graph(USERS);
    let manager = exporting(&graph, &["_7", "_13"]);
    let diagnostics = manager.inform_user(&graph, &Annotations::new());

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code, DiagnosticCode::W2000);
    assert_eq!(diagnostic.declaration.as_deref(), Some("::Hidden"));
    assert_eq!(
        diagnostic.notes,
        vec![
            "base class of `::Derived`".to_owned(),
            "return type of `::share`".to_owned(),
        ]
    );
}

#[test]
fn test_many_smart_pointer_users_share_one_report() {
    let mut text = USERS.to_owned();
    let mut users = vec!["_7".to_owned()];
    for index in 0..50 {
        let id = format!("_{}", 100 + index);
        text.push_str(&format!(
            r#"{{"kind": "Function", "id": "{id}", "name": "share{index}", "returns": "_10", "context": "_1"}}"#
        ));
        text.push('\n');
        users.push(id);
    }
    let graph = graph(&text);
    let users: Vec<&str> = users.iter().map(String::as_str).collect();
    let manager = exporting(&graph, &users);
    let diagnostics = manager.inform_user(&graph, &Annotations::new());

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].declaration.as_deref(), Some("::Hidden"));
    assert_eq!(diagnostics[0].notes.len(), 51);
    assert_eq!(diagnostics[0].notes[50], "return type of `::share49`");
}

#[test]
fn test_exposed_or_annotated_dependencies_are_quiet() {
    let graph = graph(USERS);
    let hidden = decl(&graph, "_6");

    let manager = exporting(&graph, &["_6", "_7"]);
    assert!(manager.inform_user(&graph, &Annotations::new()).is_empty());

    let manager = exporting(&graph, &["_7"]);
    let mut annotations = Annotations::new();
    annotations.annotate(hidden).already_exposed = true;
    assert!(manager.inform_user(&graph, &annotations).is_empty());
}

#[test]
fn test_alias_collision() {
    let graph = graph(USERS);
    let manager = exporting(&graph, &["_15", "_16"]);
    let diagnostics = manager.inform_user(&graph, &Annotations::new());

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::W2001);
    assert_eq!(diagnostics[0].message, "2 classes are registered as `Point`");
    assert_eq!(
        diagnostics[0].notes,
        vec!["`::Point`".to_owned(), "`::geo::Point`".to_owned()]
    );

    let mut annotations = Annotations::new();
    annotations.annotate(decl(&graph, "_16")).alias = Some("GeoPoint".into());
    assert!(manager.inform_user(&graph, &annotations).is_empty());
}

#[test]
fn test_role_names() {
    assert_eq!(DependencyRole::Argument.as_str(), "argument type");
    assert_eq!(DependencyRole::Exception.as_str(), "exception type");
}
