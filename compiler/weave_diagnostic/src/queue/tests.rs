use pretty_assertions::assert_eq;

use super::*;
use crate::DiagnosticCode;

fn unexposed(name: &str) -> Diagnostic {
    Diagnostic::warning(DiagnosticCode::W2000)
        .with_declaration(name)
        .with_message("not exposed")
}

#[test]
fn test_deduplicates_by_default() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(unexposed("::A")));
    assert!(!queue.add(unexposed("::A")));
    assert!(queue.add(unexposed("::B")));
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_unlimited_keeps_duplicates() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(unexposed("::A"));
    queue.add(unexposed("::A"));
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        limit: 1,
        deduplicate: true,
    });
    assert!(queue.add(unexposed("::A")));
    assert!(!queue.add(unexposed("::B")));
    assert!(queue.limit_reached());
    assert_eq!(queue.dropped(), 1);
}

#[test]
fn test_flush_preserves_order_and_resets() {
    let mut queue = DiagnosticQueue::new();
    queue.extend([unexposed("::B"), unexposed("::A")]);
    let flushed = queue.flush();

    let names: Vec<_> = flushed
        .iter()
        .map(|d| d.declaration.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["::B".to_owned(), "::A".to_owned()]);
    assert!(queue.is_empty());
    assert!(queue.add(unexposed("::A")));
}
