//! Plain-text listing of a creator tree.

use std::fmt::Write;

use weave_bind::{CreatorId, CreatorKind, CreatorTree};
use weave_ir::DeclarationGraph;

/// One line per node, indented by depth.
///
/// ```text
/// Module [shapes]
///   DeclarationSection
///   ModuleBody
///     Class ::Base [alias Base]
///       MemberFunction ::Base::area [default_call_policies]
/// ```
pub fn render_tree(graph: &DeclarationGraph, tree: &CreatorTree) -> String {
    let mut out = String::new();
    render_node(graph, tree, tree.root(), 0, &mut out);
    out
}

fn render_node(
    graph: &DeclarationGraph,
    tree: &CreatorTree,
    id: CreatorId,
    depth: usize,
    out: &mut String,
) {
    let node = tree.node(id);
    let _ = write!(out, "{:indent$}{}", "", node.kind.name(), indent = depth * 2);
    if let Some(decl) = node.decl {
        let _ = write!(out, " {}", graph.full_name(decl));
    }
    if let Some(detail) = detail(graph, &node.kind) {
        let _ = write!(out, " [{detail}]");
    }
    out.push('\n');
    for child in tree.children(id) {
        render_node(graph, tree, *child, depth + 1, out);
    }
}

fn detail(graph: &DeclarationGraph, kind: &CreatorKind) -> Option<String> {
    match kind {
        CreatorKind::Module { name } => Some(name.clone()),
        CreatorKind::Class {
            alias,
            held_type,
            noncopyable,
            ..
        } => {
            let mut text = format!("alias {alias}");
            if let Some(held) = held_type {
                let _ = write!(text, ", held by {}", held.spelling(graph));
            }
            if *noncopyable {
                text.push_str(", noncopyable");
            }
            Some(text)
        }
        CreatorKind::ClassWrapper { reasons } => Some(
            reasons
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        CreatorKind::Enum { alias } => Some(format!("alias {alias}")),
        CreatorKind::UnnamedEnum { values } => Some(values.join(", ")),
        CreatorKind::ReferenceMember { getter, setter } => {
            Some(format!("get {getter}, set {setter}"))
        }
        CreatorKind::StaticMethod { name } => Some(name.clone()),
        CreatorKind::ArrayRegistrator { spelling } | CreatorKind::OpaqueTypeRegistrator { spelling } => {
            Some(spelling.clone())
        }
        CreatorKind::SmartPointerRegistrator { smart_ptr } => Some(smart_ptr.clone()),
        CreatorKind::SmartPointerConverter {
            smart_ptr,
            source,
            target,
        } => Some(format!(
            "{smart_ptr}: {} -> {}",
            graph.full_name(*source),
            graph.full_name(*target)
        )),
        CreatorKind::ContainerSuite { spelling, kind } => {
            Some(format!("{} {spelling}", kind.suite()))
        }
        CreatorKind::ValueTraits { element } => Some(graph.full_name(*element)),
        other => other.policy().map(ToString::to_string),
    }
}
