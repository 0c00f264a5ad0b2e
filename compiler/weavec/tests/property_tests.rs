//! Property tests: generation does not depend on the order of the dump.

#![allow(clippy::unwrap_used, reason = "tests can panic")]

use proptest::prelude::*;
use weave_bind::CreatorKind;
use weavec::{Pipeline, PipelineOutput};

const HEADER: &str = r#"{"kind": "Namespace", "id": "_1", "name": "::"}"#;

const CLASSES: &[&str] = &[
    r#"{"kind": "Class", "id": "_2", "name": "Derived", "context": "_1", "bases": "public:_3"}"#,
    r#"{"kind": "Class", "id": "_3", "name": "Base", "context": "_1"}"#,
    r#"{"kind": "Class", "id": "_4", "name": "Aardvark", "context": "_1", "bases": "public:_2"}"#,
    r#"{"kind": "Class", "id": "_5", "name": "Loner", "context": "_1"}"#,
    r#"{"kind": "Struct", "id": "_6", "name": "Mixin", "context": "_1"}"#,
    r#"{"kind": "Class", "id": "_7", "name": "Both", "context": "_1", "bases": "public:_3 public:_6"}"#,
];

fn class_names(output: &PipelineOutput) -> Vec<String> {
    output
        .tree
        .classes()
        .into_iter()
        .filter_map(|id| output.tree.node(id).decl)
        .map(|decl| output.graph.full_name(decl))
        .collect()
}

fn dump(lines: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for line in lines {
        text.push('\n');
        text.push_str(line);
    }
    text
}

proptest! {
    #[test]
    fn prop_class_order_ignores_record_order(lines in Just(CLASSES.to_vec()).prop_shuffle()) {
        let pipeline = Pipeline::default();
        let expected = class_names(&pipeline.run(&dump(CLASSES)).unwrap());
        let shuffled = pipeline.run(&dump(&lines)).unwrap();
        prop_assert_eq!(class_names(&shuffled), expected);
    }

    #[test]
    fn prop_bases_precede_derived(lines in Just(CLASSES.to_vec()).prop_shuffle()) {
        let output = Pipeline::default().run(&dump(&lines)).unwrap();
        let names = class_names(&output);
        let position = |name: &str| names.iter().position(|n| n == name).unwrap();
        prop_assert!(position("::Base") < position("::Derived"));
        prop_assert!(position("::Derived") < position("::Aardvark"));
        prop_assert!(position("::Mixin") < position("::Both"));
        prop_assert_eq!(
            output.tree.count(|kind| matches!(kind, CreatorKind::Class { .. })),
            CLASSES.len()
        );
    }
}
