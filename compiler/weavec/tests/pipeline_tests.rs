#![allow(clippy::unwrap_used, clippy::expect_used, reason = "tests can panic")]
//! End-to-end runs of the driver over small dumps.

use std::path::Path;

use pretty_assertions::assert_eq;
use weave_bind::{CallPolicy, CreatorKind, DeclAnnotations, PolicySlot, ReturnValueKind};
use weave_diagnostic::DiagnosticCode;
use weave_ir::{traits, DeclId};
use weave_parse::patcher;
use weavec::{report, GeneratorConfig, Pipeline, PipelineError, PipelineOutput};

const SHAPES: &str = r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "FundamentalType", "id": "_2", "name": "void"}
{"kind": "FundamentalType", "id": "_3", "name": "int"}
{"kind": "Class", "id": "_4", "name": "Derived", "context": "_1", "bases": "public:_5"}
{"kind": "Method", "id": "_6", "name": "area", "returns": "_3", "context": "_4", "access": "public", "virtual": "1"}
{"kind": "Class", "id": "_5", "name": "Base", "context": "_1"}
{"kind": "Method", "id": "_7", "name": "area", "returns": "_3", "context": "_5", "access": "public", "virtual": "1"}
{"kind": "Method", "id": "_8", "name": "reset", "returns": "_2", "context": "_5", "access": "public"}
{"kind": "ReferenceType", "id": "_10", "type": "_5"}
{"kind": "Function", "id": "_9", "name": "foo", "returns": "_2", "context": "_1"}
{"kind": "Argument", "name": "b", "type": "_10"}
"#;

const RETURNS: &str = r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "FundamentalType", "id": "_2", "name": "void"}
{"kind": "Struct", "id": "_3", "name": "Widget", "context": "_1"}
{"kind": "PointerType", "id": "_4", "type": "_3"}
{"kind": "CvQualifiedType", "id": "_5", "type": "_3", "const": "1"}
{"kind": "ReferenceType", "id": "_6", "type": "_5"}
{"kind": "PointerType", "id": "_7", "type": "_2"}
{"kind": "Function", "id": "_8", "name": "f", "returns": "_2", "context": "_1"}
{"kind": "Argument", "name": "w", "type": "_4"}
{"kind": "Function", "id": "_9", "name": "f", "returns": "_2", "context": "_1"}
{"kind": "Argument", "name": "w", "type": "_3"}
{"kind": "Function", "id": "_10", "name": "current", "returns": "_6", "context": "_1"}
{"kind": "Function", "id": "_11", "name": "raw", "returns": "_7", "context": "_1"}
"#;

const PAINT: &str = r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "Namespace", "id": "_2", "name": "ui", "context": "_1"}
{"kind": "Enumeration", "id": "_3", "name": "Color", "context": "_2"}
{"kind": "EnumValue", "name": "red", "init": "0"}
{"kind": "FundamentalType", "id": "_4", "name": "void"}
{"kind": "Function", "id": "_5", "name": "paint", "returns": "_4", "context": "_2"}
{"kind": "Argument", "name": "color", "type": "_3", "default": "red"}
"#;

fn run(text: &str) -> PipelineOutput {
    Pipeline::default().run(text).unwrap()
}

fn decl(output: &PipelineOutput, dump_id: &str) -> DeclId {
    output.graph.lookup(dump_id).unwrap()
}

fn body_decls(output: &PipelineOutput) -> Vec<Option<DeclId>> {
    output
        .tree
        .children(output.tree.body())
        .iter()
        .map(|id| output.tree.node(*id).decl)
        .collect()
}

fn policy_of(output: &PipelineOutput, dump_id: &str) -> Option<PolicySlot> {
    let creator = output.tree.find_by_decl(decl(output, dump_id))?;
    output.tree.node(creator).kind.policy().cloned()
}

fn codes(output: &PipelineOutput) -> Vec<DiagnosticCode> {
    output.diagnostics.iter().map(|diag| diag.code).collect()
}

// ── End to end ──────────────────────────────────────────────────

#[test]
fn test_base_registered_before_derived() {
    let output = run(SHAPES);
    assert_eq!(
        body_decls(&output),
        vec![
            Some(decl(&output, "_5")),
            Some(decl(&output, "_4")),
            Some(decl(&output, "_9")),
        ]
    );
    assert!(output.diagnostics.is_empty());
    assert!(!output.has_errors());

    let listing = report::render_tree(&output.graph, &output.tree);
    assert!(listing.starts_with("Module [bindings]\n  DeclarationSection\n"));
    assert!(listing.contains(
        "    Class ::Base [alias Base]\n      MemberFunction ::Base::area [default_call_policies]\n"
    ));
    assert!(listing.contains("    FreeFunction ::foo [default_call_policies]\n"));
}

#[test]
fn test_hierarchy_links_and_sorts() {
    let text = r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "FundamentalType", "id": "_2", "name": "void"}
{"kind": "Class", "id": "_3", "name": "Derived", "context": "_1", "bases": "public:_4"}
{"kind": "Class", "id": "_4", "name": "Base", "context": "_1"}
{"kind": "PointerType", "id": "_5", "type": "_4"}
{"kind": "Function", "id": "_6", "name": "foo", "returns": "_2", "context": "_1"}
{"kind": "Argument", "name": "b", "type": "_5"}
"#;
    let output = run(text);
    let graph = &output.graph;
    let base = decl(&output, "_4");
    let derived = decl(&output, "_3");

    let derived_class = graph.decl(derived).as_class().unwrap();
    assert_eq!(derived_class.bases.len(), 1);
    assert_eq!(derived_class.bases[0].related, base);
    let base_class = graph.decl(base).as_class().unwrap();
    assert_eq!(base_class.derived.len(), 1);
    assert_eq!(base_class.derived[0].related, derived);

    let foo = graph.decl(decl(&output, "_6")).as_calldef().unwrap();
    assert_eq!(foo.arguments.len(), 1);
    let argument = foo.arguments[0].ty;
    assert!(traits::is_pointer(graph, argument));
    assert_eq!(
        traits::class_declaration(graph, traits::remove_pointer(graph, argument)),
        Some(base)
    );

    assert_eq!(output.tree.classes().len(), 2);
    let classes: Vec<Option<DeclId>> = output
        .tree
        .classes()
        .into_iter()
        .map(|id| output.tree.node(id).decl)
        .collect();
    assert_eq!(classes, vec![Some(base), Some(derived)]);
}

#[test]
fn test_runs_are_independent() {
    let pipeline = Pipeline::new(GeneratorConfig::default().with_module_name("shapes"));
    let first = pipeline.run(SHAPES).unwrap();
    let second = pipeline.run(SHAPES).unwrap();
    assert_eq!(
        report::render_tree(&first.graph, &first.tree),
        report::render_tree(&second.graph, &second.tree)
    );
    assert_eq!(
        first.tree.node(first.tree.root()).kind,
        CreatorKind::Module {
            name: "shapes".to_owned()
        }
    );
}

#[test]
fn test_ignored_base_reported_once() {
    let text = r#"
{"kind": "Namespace", "id": "_1", "name": "::"}
{"kind": "Class", "id": "_2", "name": "Hidden", "context": "_1"}
{"kind": "Class", "id": "_3", "name": "Derived", "context": "_1", "bases": "public:_2"}
"#;
    let config = GeneratorConfig::default().annotate(
        "::Hidden",
        DeclAnnotations {
            ignore: true,
            ..DeclAnnotations::default()
        },
    );
    let output = Pipeline::new(config).run(text).unwrap();

    assert_eq!(codes(&output), vec![DiagnosticCode::W2000]);
    assert_eq!(output.diagnostics[0].declaration.as_deref(), Some("::Hidden"));
    assert_eq!(
        output.diagnostics[0].notes,
        vec!["base class of `::Derived`".to_owned()]
    );
    assert_eq!(body_decls(&output), vec![Some(decl(&output, "_3"))]);
}

// ── Overloads and policies ──────────────────────────────────────

#[test]
fn test_value_overload_before_pointer_overload() {
    let output = run(RETURNS);
    let body = body_decls(&output);
    let by_value = body.iter().position(|id| *id == Some(decl(&output, "_9")));
    let by_pointer = body.iter().position(|id| *id == Some(decl(&output, "_8")));
    assert!(by_value.unwrap() < by_pointer.unwrap());
    assert_eq!(body[0], Some(decl(&output, "_3")));
}

#[test]
fn test_return_policies() {
    let output = run(RETURNS);
    assert_eq!(
        policy_of(&output, "_10"),
        Some(PolicySlot::Resolved(CallPolicy::return_value(
            ReturnValueKind::CopyConstReference
        )))
    );
    assert_eq!(
        policy_of(&output, "_11"),
        Some(PolicySlot::Resolved(CallPolicy::return_value(
            ReturnValueKind::ReturnOpaquePointer
        )))
    );
    assert_eq!(
        policy_of(&output, "_9"),
        Some(PolicySlot::Resolved(CallPolicy::Default))
    );
}

#[test]
fn test_configured_policy_applies_to_every_overload() {
    let manage = CallPolicy::return_value(ReturnValueKind::ManageNewObject);
    let config = GeneratorConfig::from_json(
        r#"{"annotations": {"::f": {"call_policies": {"kind": "return_value", "value": "manage_new_object"}}}}"#,
    )
    .unwrap();
    let output = Pipeline::new(config).run(RETURNS).unwrap();
    assert_eq!(policy_of(&output, "_8"), Some(PolicySlot::Resolved(manage.clone())));
    assert_eq!(policy_of(&output, "_9"), Some(PolicySlot::Resolved(manage)));
}

// ── Patching ────────────────────────────────────────────────────

#[test]
fn test_graph_is_patched_once() {
    let pipeline = Pipeline::default();
    let (mut graph, report) = pipeline.build_graph(PAINT).unwrap();
    assert_eq!(report.defaults_rewritten, 1);
    assert!(graph.is_patched());

    let paint = graph.lookup("_5").unwrap();
    let before = graph.decl(paint).as_calldef().unwrap().arguments.clone();
    assert_eq!(before[0].default_value.as_deref(), Some("::ui::red"));

    assert_eq!(patcher::patch(&mut graph), patcher::PatchReport::default());
    assert_eq!(graph.decl(paint).as_calldef().unwrap().arguments, before);
}

// ── Failures ────────────────────────────────────────────────────

#[test]
fn test_schema_error_maps_to_e0001() {
    let error = Pipeline::default().run("{not json").unwrap_err();
    assert!(matches!(error, PipelineError::Schema(_)));
    let diagnostic = error.to_diagnostic().unwrap();
    assert_eq!(diagnostic.code, DiagnosticCode::E0001);
    assert!(diagnostic.is_error());
    assert!(diagnostic.message.starts_with("invalid record stream: line 1"));
}

#[test]
fn test_unresolved_reference_maps_to_e0002() {
    let error = Pipeline::default()
        .run(r#"{"kind": "Class", "id": "_2", "name": "Lost", "context": "_9"}"#)
        .unwrap_err();
    assert!(matches!(error, PipelineError::Link(_)));
    assert_eq!(error.code(), Some(DiagnosticCode::E0002));
}

#[test]
fn test_unknown_annotated_declaration() {
    let config = GeneratorConfig::default().annotate("::Missing", DeclAnnotations::default());
    let error = Pipeline::new(config).run(SHAPES).unwrap_err();
    assert_eq!(
        error.to_string(),
        "annotation names unknown declaration `::Missing`"
    );
    assert_eq!(error.to_diagnostic(), None);
}

#[test]
fn test_missing_dump_file() {
    let error = Pipeline::default()
        .run_file(Path::new("/nonexistent/weave/dump.jsonl"))
        .unwrap_err();
    assert!(matches!(error, PipelineError::Io { .. }));
    assert!(error.to_string().starts_with("cannot read `/nonexistent/weave/dump.jsonl`"));
}
