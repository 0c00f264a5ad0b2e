#![allow(clippy::unwrap_used, reason = "tests can panic")]

use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{decl, graph};

fn class(alias: &str) -> CreatorKind {
    CreatorKind::Class {
        alias: alias.to_owned(),
        held_type: None,
        noncopyable: false,
        wrapper: None,
    }
}

fn kinds(tree: &CreatorTree, ids: &[CreatorId]) -> Vec<CreatorKind> {
    ids.iter().map(|id| tree.node(*id).kind.clone()).collect()
}

// ── Tree shape ──────────────────────────────────────────────────

#[test]
fn test_new_tree_has_fixed_sections() {
    let tree = CreatorTree::new("shapes");
    assert_eq!(tree.len(), 3);
    assert_eq!(
        tree.node(tree.root()).kind,
        CreatorKind::Module {
            name: "shapes".to_owned()
        }
    );
    assert_eq!(
        tree.children(tree.root()),
        &[tree.declarations(), tree.body()]
    );
    assert_eq!(tree.node(tree.declarations()).kind, CreatorKind::DeclarationSection);
    assert_eq!(tree.node(tree.body()).parent, Some(tree.root()));
}

#[test]
fn test_walk_is_preorder() {
    let mut tree = CreatorTree::new("m");
    let body = tree.body();
    let base = tree.adopt(body, class("Base"), None);
    let ctor = tree.adopt(
        base,
        CreatorKind::Constructor {
            policy: PolicySlot::Resolved(CallPolicy::Default),
        },
        None,
    );
    let derived = tree.adopt(body, class("Derived"), None);

    let walked = tree.walk(body);
    assert_eq!(walked, vec![body, base, ctor, derived]);
    assert_eq!(tree.classes(), vec![base, derived]);
    assert_eq!(tree.count(CreatorKind::is_class), 2);
}

#[test]
fn test_move_to_end() {
    let mut tree = CreatorTree::new("m");
    let body = tree.body();
    let first = tree.adopt(
        body,
        CreatorKind::StaticMethod {
            name: "create".to_owned(),
        },
        None,
    );
    let second = tree.adopt(body, CreatorKind::GlobalVariable, None);
    let third = tree.adopt(body, CreatorKind::MemberVariable, None);

    tree.move_to_end(first);
    assert_eq!(tree.children(body), &[second, third, first]);
    // The root has no parent; moving it is a no-op.
    tree.move_to_end(tree.root());
    assert_eq!(tree.len(), 6);
}

#[test]
fn test_find_by_decl() {
    let mut tree = CreatorTree::new("m");
    let body = tree.body();
    let id = DeclId::new(4);
    let other = DeclId::new(9);
    let first = tree.adopt(body, class("Widget"), Some(id));
    tree.adopt(first, CreatorKind::MemberVariable, Some(id));
    assert_eq!(tree.find_by_decl(id), Some(first));
    assert_eq!(tree.find_by_decl(other), None);
    assert_eq!(
        kinds(&tree, &tree.walk(first)),
        vec![class("Widget"), CreatorKind::MemberVariable]
    );
}

// ── Node payloads ───────────────────────────────────────────────

#[test]
fn test_policy_slot() {
    assert_eq!(PolicySlot::from(None), PolicySlot::NeedsManual);
    let slot = PolicySlot::from(Some(CallPolicy::ReturnSelf));
    assert_eq!(slot.policy(), Some(&CallPolicy::ReturnSelf));
    assert_eq!(PolicySlot::NeedsManual.policy(), None);

    let kind = CreatorKind::FreeOperator {
        symbol: "+".to_owned(),
        policy: slot.clone(),
    };
    assert_eq!(kind.policy(), Some(&slot));
    assert_eq!(CreatorKind::MemberVariable.policy(), None);
}

#[test]
fn test_held_type_spelling() {
    let graph = graph(
        r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "Namespace", "id": "_2", "name": "geo", "context": "_1"}
{"kind": "Class", "id": "_3", "name": "Point", "context": "_2"}
"#,
    );
    let held = HeldType {
        smart_ptr: "boost::shared_ptr".to_owned(),
        class: decl(&graph, "_3"),
    };
    assert_eq!(held.spelling(&graph), "boost::shared_ptr< ::geo::Point >");
}

#[test]
fn test_wrapper_reason_display() {
    assert_eq!(
        WrapperReason::VirtualFunction("draw".into()).to_string(),
        "virtual member function `draw`"
    );
    assert_eq!(
        WrapperReason::TransformedFunction("read".into()).to_string(),
        "member function `read` has transformations"
    );
    assert_eq!(WrapperReason::BitField("flags".into()).to_string(), "bit field `flags`");
}

#[test]
fn test_kind_names_and_policy_display() {
    assert_eq!(class("Widget").name(), "Class");
    assert_eq!(CreatorKind::ArrayMemberWrapper.name(), "ArrayMemberWrapper");
    assert_eq!(
        PolicySlot::Resolved(CallPolicy::ReturnInternalReference { custodian: 1 }).to_string(),
        "return_internal_reference<1>"
    );
    assert_eq!(PolicySlot::NeedsManual.to_string(), "<needs call policy>");
}
